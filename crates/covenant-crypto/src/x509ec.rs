// Path: crates/covenant-crypto/src/x509ec.rs
//! X.509 EC identities: a DER-encoded `SubjectPublicKeyInfo` verified against
//! an ASN.1 `(r, s)` ECDSA signature over a SHA-384 pre-hash of the message.
//!
//! Signing under this variant is intentionally left unimplemented, mirroring
//! the behavior of the system this crate descends from: verification must be
//! complete, but nothing in this workspace needs to *produce* X.509 EC
//! signatures today.

use crate::error::CryptoError;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature as P256Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use sha2::{Digest, Sha384};

/// A P-256 public key carried as a DER `SubjectPublicKeyInfo` blob, the same
/// wire shape produced by `x509.MarshalPKIXPublicKey` in the systems this
/// identity variant interoperates with.
#[derive(Clone, PartialEq, Eq)]
pub struct X509EcPublicKey {
    der: Vec<u8>,
}

impl X509EcPublicKey {
    /// Wraps a raw DER `SubjectPublicKeyInfo` blob without parsing it yet;
    /// parsing is deferred to `verify` so that a malformed key only errors
    /// when it is actually used, matching the lazy-validation posture the
    /// rest of the identity layer takes toward expression syntax.
    pub fn from_der(der: &[u8]) -> Self {
        Self { der: der.to_vec() }
    }

    /// The raw DER bytes, used as the canonical string payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.der.clone()
    }

    /// Verifies an ASN.1 DER-encoded `(r, s)` ECDSA signature over the
    /// SHA-384 pre-hash of `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let key = VerifyingKey::from_public_key_der(&self.der)
            .map_err(|e| CryptoError::InvalidKey(format!("failed to parse SPKI DER: {e}")))?;
        let sig = P256Signature::from_der(signature)
            .map_err(|e| CryptoError::InvalidSignature(format!("invalid ASN.1 signature: {e}")))?;

        let mut hasher = Sha384::new();
        hasher.update(message);
        let digest = hasher.finalize();

        key.verify_prehash(&digest, &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

/// X.509 EC signing is not implemented; verification-only, per the
/// specification's carve-out for this identity variant.
pub fn sign(_message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Err(CryptoError::Unsupported(
        "X.509 EC signing is not implemented".to_string(),
    ))
}

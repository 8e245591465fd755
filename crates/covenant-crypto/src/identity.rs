// Path: crates/covenant-crypto/src/identity.rs
//! Tagged identities and their matching signing capabilities.
//!
//! The system this crate descends from represents this as a struct with
//! three nullable fields and an implicit "-1 means none are set" sentinel.
//! We use an explicit sum type instead: exactly one variant is ever
//! populated, `match` is exhaustive, and there is no invalid "-1" state to
//! guard against.

use crate::eddsa::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use crate::error::CryptoError;
use crate::x509ec::X509EcPublicKey;

/// The string tag used in an identity's canonical `"<tag>:<payload>"` form.
pub mod tag {
    /// Tag for a curve-A (Schnorr/Ed25519) public key.
    pub const ED25519: &str = "ed25519";
    /// Tag for an X.509-encoded EC public key.
    pub const X509EC: &str = "x509ec";
    /// Tag for a reference to another policy object (delegation).
    pub const DARC: &str = "darc";
}

/// A cryptographic identity: either a raw public key, or a reference to
/// another policy object (delegation). Equality is tag-and-payload equality;
/// two identities of different variants are never equal.
#[derive(Clone, PartialEq, Eq)]
pub enum Identity {
    /// A curve-A (Ed25519/Schnorr) public key.
    Ed25519(Ed25519PublicKey),
    /// A DER-encoded X.509 EC `SubjectPublicKeyInfo`.
    X509Ec(X509EcPublicKey),
    /// A reference to another policy object by its content id.
    Delegated(Vec<u8>),
}

impl Identity {
    /// The canonical `"<tag>:<hex>"` string form. Identity equality in rule
    /// expressions is string equality against this form, so any
    /// inconsistency here (casing, point encoding) silently denies
    /// authorization elsewhere in the system.
    pub fn to_string_id(&self) -> String {
        match self {
            Identity::Ed25519(pk) => format!("{}:{}", tag::ED25519, hex::encode(pk.to_bytes())),
            Identity::X509Ec(pk) => format!("{}:{}", tag::X509EC, hex::encode(pk.to_bytes())),
            Identity::Delegated(id) => format!("{}:{}", tag::DARC, hex::encode(id)),
        }
    }

    /// Returns the string tag for this identity's variant.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Identity::Ed25519(_) => tag::ED25519,
            Identity::X509Ec(_) => tag::X509EC,
            Identity::Delegated(_) => tag::DARC,
        }
    }

    /// True if this identity is a delegation to another policy object.
    pub fn is_delegated(&self) -> bool {
        matches!(self, Identity::Delegated(_))
    }

    /// If this is a delegated identity, the referenced policy id bytes.
    pub fn delegated_id(&self) -> Option<&[u8]> {
        match self {
            Identity::Delegated(id) => Some(id),
            _ => None,
        }
    }

    /// Verifies `signature` over `message` under this identity.
    ///
    /// A delegated identity can never verify a raw signature: delegation is
    /// resolved at the expression-evaluation layer, not here.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        match (self, signature) {
            (Identity::Ed25519(pk), Signature::Ed25519(sig)) => pk.verify(message, sig),
            (Identity::X509Ec(pk), Signature::Raw(bytes)) => pk.verify(message, bytes),
            (Identity::Delegated(_), _) => Err(CryptoError::NotAKey(
                "cannot verify a delegated identity".to_string(),
            )),
            _ => Err(CryptoError::InvalidSignature(
                "signature variant does not match identity variant".to_string(),
            )),
        }
    }
}

/// A signature in whichever shape its producing identity variant uses.
#[derive(Clone, PartialEq, Eq)]
pub enum Signature {
    /// An Ed25519 (Schnorr) signature.
    Ed25519(Ed25519Signature),
    /// A raw byte blob, used for the ASN.1-DER-encoded X.509 EC signature.
    Raw(Vec<u8>),
}

impl Signature {
    /// The raw bytes of this signature, regardless of variant.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Signature::Ed25519(sig) => sig.to_bytes(),
            Signature::Raw(bytes) => bytes.clone(),
        }
    }
}

/// The private counterpart of an [`Identity`]. Cannot exist for the
/// `Delegated` variant: signing with a policy reference is forbidden.
#[derive(Clone)]
pub enum Signer {
    /// An Ed25519 (Schnorr) key pair.
    Ed25519(Ed25519KeyPair),
    /// An X.509 EC public key with no available private counterpart.
    /// Signing with this variant always fails; it exists so that an X.509
    /// EC identity can still be *named* as a signer in test fixtures and
    /// tooling even though this crate cannot produce its signatures.
    X509EcUnavailable(X509EcPublicKey),
}

impl Signer {
    /// Signs `message`, producing a [`Signature`] in the shape this signer's
    /// variant produces.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, CryptoError> {
        if message.is_empty() {
            return Err(CryptoError::EmptyMessage);
        }
        match self {
            Signer::Ed25519(keypair) => keypair.sign(message).map(Signature::Ed25519),
            Signer::X509EcUnavailable(_) => crate::x509ec::sign(message).map(Signature::Raw),
        }
    }

    /// The public [`Identity`] this signer corresponds to.
    pub fn identity(&self) -> Identity {
        match self {
            Signer::Ed25519(keypair) => Identity::Ed25519(keypair.public_key()),
            Signer::X509EcUnavailable(pk) => Identity::X509Ec(pk.clone()),
        }
    }
}

/// Parses an identity's canonical `"<tag>:<hex>"` string form.
///
/// Round-trips exactly with [`Identity::to_string_id`] for `ed25519` and
/// `x509ec`; a `darc` identity round-trips via its id bytes.
pub fn parse_identity(s: &str) -> Result<Identity, CryptoError> {
    let (tag, payload) = s
        .split_once(':')
        .ok_or_else(|| CryptoError::InvalidKey(format!("malformed identity string '{s}'")))?;
    let bytes = hex::decode(payload)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid hex payload in '{s}': {e}")))?;
    match tag {
        tag::ED25519 => Ed25519PublicKey::from_bytes(&bytes).map(Identity::Ed25519),
        tag::X509EC => Ok(Identity::X509Ec(X509EcPublicKey::from_der(&bytes))),
        tag::DARC => Ok(Identity::Delegated(bytes)),
        other => Err(CryptoError::Unsupported(format!(
            "unknown identity tag '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eddsa::Ed25519KeyPair;

    #[test]
    fn ed25519_identity_round_trips_through_string() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        let id = Identity::Ed25519(keypair.public_key());
        let s = id.to_string_id();
        let parsed = parse_identity(&s).unwrap();
        assert!(id == parsed);
        assert_eq!(s, parsed.to_string_id());
    }

    #[test]
    fn delegated_identity_round_trips_via_id_bytes() {
        let id = Identity::Delegated(vec![1, 2, 3, 4]);
        let s = id.to_string_id();
        assert_eq!(s, "darc:01020304");
        let parsed = parse_identity(&s).unwrap();
        assert!(id == parsed);
    }

    #[test]
    fn delegated_identity_cannot_be_verified() {
        let id = Identity::Delegated(vec![9, 9, 9]);
        let keypair = Ed25519KeyPair::generate().unwrap();
        let sig = Signature::Ed25519(keypair.sign(b"msg").unwrap());
        assert!(matches!(id.verify(b"msg", &sig), Err(CryptoError::NotAKey(_))));
    }

    #[test]
    fn signer_cannot_be_constructed_for_delegated_identities() {
        // There is no `Signer::Delegated` variant at all: the type system
        // enforces the "cannot sign with a darc" rule at compile time
        // instead of at runtime. This test documents that invariant.
        fn assert_no_delegated_variant(s: &Signer) {
            match s {
                Signer::Ed25519(_) => {}
                Signer::X509EcUnavailable(_) => {}
            }
        }
        let keypair = Ed25519KeyPair::generate().unwrap();
        assert_no_delegated_variant(&Signer::Ed25519(keypair));
    }
}

// Path: crates/covenant-crypto/src/eddsa.rs
//! Schnorr signatures over the twisted Edwards curve (Ed25519/EdDSA), via
//! `dcrypt`. EdDSA *is* a Schnorr signature scheme instantiated over a
//! twisted Edwards curve with a deterministic nonce, and this module backs
//! the default, non-delegated, non-X.509 identity variant.

use crate::error::CryptoError;
use dcrypt::algorithms::hash::sha2::Sha256 as DcryptSha256;
use dcrypt::algorithms::hash::HashFunction as DcryptHashFunction;
use dcrypt::algorithms::ByteSerializable;
use dcrypt::sign::eddsa;
use rand::rngs::OsRng;
use zeroize::Zeroize;

/// An Ed25519 key pair: a Schnorr-over-Edwards-curve secret and its public point.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    public_key: eddsa::Ed25519PublicKey,
    secret_key: eddsa::Ed25519SecretKey,
}

/// An Ed25519 (Schnorr) signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519Signature(eddsa::Ed25519Signature);

/// An Ed25519 public key: the "curve-A" identity payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey(eddsa::Ed25519PublicKey);

/// An Ed25519 private key.
#[derive(Clone)]
pub struct Ed25519PrivateKey(eddsa::Ed25519SecretKey);

impl Ed25519KeyPair {
    /// Generates a fresh key pair from the OS CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = OsRng;
        let (public_key, secret_key) = eddsa::Ed25519::keypair(&mut rng)
            .map_err(|e| CryptoError::OperationFailed(format!("keypair generation failed: {e}")))?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    /// Reconstructs a key pair from an existing private key, deriving the
    /// matching public point.
    pub fn from_private_key(private_key: &Ed25519PrivateKey) -> Result<Self, CryptoError> {
        let secret_key = private_key.0.clone();
        let public_key = secret_key
            .public_key()
            .map_err(|e| CryptoError::InvalidKey(format!("could not derive public key: {e}")))?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.public_key.clone())
    }

    /// The private half of this key pair.
    pub fn private_key(&self) -> Ed25519PrivateKey {
        Ed25519PrivateKey(self.secret_key.clone())
    }

    /// Signs `message` with this key pair's secret key.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature, CryptoError> {
        if message.is_empty() {
            return Err(CryptoError::EmptyMessage);
        }
        let signature = eddsa::Ed25519::sign(message, &self.secret_key)
            .map_err(|e| CryptoError::OperationFailed(format!("signing failed: {e}")))?;
        Ok(Ed25519Signature(signature))
    }
}

impl Ed25519PublicKey {
    /// Verifies `signature` over `message` under this public key.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        eddsa::Ed25519::verify(message, &signature.0, &self.0)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    /// The raw 32-byte compressed point, used as the canonical string payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    /// Parses a 32-byte compressed Edwards point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        eddsa::Ed25519PublicKey::from_bytes(bytes)
            .map(Ed25519PublicKey)
            .map_err(|e| CryptoError::InvalidKey(format!("failed to parse public key: {e}")))
    }
}

impl Ed25519PrivateKey {
    /// Signs `message` directly with this private key, without requiring the
    /// caller to reconstruct a full key pair.
    pub fn sign(&self, message: &[u8]) -> Result<Ed25519Signature, CryptoError> {
        if message.is_empty() {
            return Err(CryptoError::EmptyMessage);
        }
        let signature = eddsa::Ed25519::sign(message, &self.0)
            .map_err(|e| CryptoError::OperationFailed(format!("signing failed: {e}")))?;
        Ok(Ed25519Signature(signature))
    }

    /// Exports just the 32-byte seed; the scalar itself is never serialized.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.seed().to_vec()
    }

    /// Reconstructs a private key from its 32-byte seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(
                "invalid private key length: expected 32 bytes".to_string(),
            ));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let key = eddsa::Ed25519SecretKey::from_seed(&seed)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid seed: {e}")))?;
        seed.zeroize();
        Ok(Ed25519PrivateKey(key))
    }
}

impl Ed25519Signature {
    /// The raw signature bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    /// Parses a raw Ed25519 signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        eddsa::Ed25519Signature::from_bytes(bytes)
            .map(Ed25519Signature)
            .map_err(|e| CryptoError::InvalidSignature(format!("{e}")))
    }
}

/// SHA-256, used by the policy-object core for content addressing; exposed
/// here so callers don't need a second hashing dependency for that purpose.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = DcryptSha256::digest(data).expect("sha256 digest never fails on in-memory input");
    let bytes = digest.to_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trips() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        let message = b"hello covenant";
        let signature = keypair.sign(message).unwrap();
        assert!(keypair.public_key().verify(message, &signature).is_ok());
    }

    #[test]
    fn verification_fails_under_wrong_key() {
        let a = Ed25519KeyPair::generate().unwrap();
        let b = Ed25519KeyPair::generate().unwrap();
        let signature = a.sign(b"payload").unwrap();
        assert!(b.public_key().verify(b"payload", &signature).is_err());
    }

    #[test]
    fn key_bytes_round_trip() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        let pub_bytes = keypair.public_key().to_bytes();
        let priv_bytes = keypair.private_key().to_bytes();
        assert_eq!(pub_bytes.len(), 32);
        assert_eq!(priv_bytes.len(), 32);

        let restored_priv = Ed25519PrivateKey::from_bytes(&priv_bytes).unwrap();
        let restored = Ed25519KeyPair::from_private_key(&restored_priv).unwrap();
        assert_eq!(restored.public_key().to_bytes(), pub_bytes);
    }

    #[test]
    fn empty_message_cannot_be_signed() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        assert!(matches!(keypair.sign(b""), Err(CryptoError::EmptyMessage)));
    }
}

// Path: crates/covenant-crypto/src/lib.rs
//! # Covenant Crypto Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]
//! # Covenant Crypto
//!
//! Identity and signer primitives for the covenant access-control engine:
//! curve-A (Schnorr/Ed25519) keys, X.509 EC keys, and the tagged `Identity` /
//! `Signer` sum types that bind them (and a third, key-less "delegated to
//! another policy object" variant) into one interface the policy-object core
//! can treat uniformly.

pub mod eddsa;
pub mod error;
pub mod identity;
pub mod x509ec;

pub use eddsa::{Ed25519KeyPair, Ed25519PrivateKey, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use identity::{parse_identity, Identity, Signature, Signer};
pub use x509ec::X509EcPublicKey;

#[cfg(test)]
mod tests {
    // Simple canary test to verify test discovery is working.
    #[test]
    fn test_crypto_canary() {}
}

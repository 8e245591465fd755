// Path: crates/covenant-crypto/src/error.rs
//! Local error types for the `covenant-crypto` crate.

// Re-export the canonical error type from the types crate so downstream
// code can match on `covenant_crypto::error::CryptoError` without reaching
// into `covenant-types` directly.
pub use covenant_types::CryptoError;

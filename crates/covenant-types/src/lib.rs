// Path: crates/covenant-types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! Core error types and small shared primitives for the covenant
//! access-control engine.
//!
//! This crate has minimal dependencies and sits underneath every other crate
//! in the workspace, the same way a foundational `types` crate does in a
//! layered kernel: nothing in here should ever need to depend back up into
//! `covenant-crypto`, `covenant-expr`, or `covenant-darc`.

/// Error types shared across the workspace.
pub mod error;

pub use error::{CryptoError, ErrorCode, ExprError, PolicyError, Result};

/// An opaque, content-addressed identifier for a policy object.
///
/// Equality and ordering are byte-wise; the value itself carries no meaning
/// beyond "the SHA-256 digest of some policy's canonical encoding".
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct PolicyId(
    /// The raw digest bytes.
    pub Vec<u8>,
);

impl PolicyId {
    /// Returns true if this id has never been assigned (e.g. the base id of
    /// a not-yet-hashed genesis policy).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the id as a lowercase hex string, e.g. for logging.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for PolicyId {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl AsRef<[u8]> for PolicyId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

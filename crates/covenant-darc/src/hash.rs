// Path: crates/covenant-darc/src/hash.rs
//! Content-addressing helpers: every digest the policy-object core computes
//! (a policy's own id, a path digest, a request digest) is SHA-256 over a
//! concatenation of byte strings, computed through this one choke point so
//! the encoding never drifts between call sites.

use covenant_crypto::eddsa::sha256;

use crate::policy::Policy;

/// Hashes the concatenation of `parts` as a single SHA-256 digest.
pub(crate) fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut buf = Vec::with_capacity(total);
    for part in parts {
        buf.extend_from_slice(part);
    }
    sha256(&buf)
}

/// Hashes a path of ancestor policies into the single digest embedded
/// alongside each evolution signature. An empty path hashes to the SHA-256
/// of the empty byte string, same as any other zero-element concatenation.
pub(crate) fn path_digest(path: &[Policy]) -> [u8; 32] {
    let ids: Vec<Vec<u8>> = path.iter().map(|p| p.id().0).collect();
    let refs: Vec<&[u8]> = ids.iter().map(|id| id.as_slice()).collect();
    sha256_concat(&refs)
}

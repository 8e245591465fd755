// Path: crates/covenant-darc/src/policy.rs
//! The policy object itself: a versioned, content-addressed bundle of rules,
//! plus the evolution signatures and ancestor path that justify its version.

use std::collections::BTreeMap;

use covenant_crypto::identity::{Identity, Signature, Signer};
use covenant_types::{PolicyError, PolicyId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::hash::{path_digest, sha256_concat};
use crate::rules::RuleSet;

/// One signature attached to a non-genesis policy, attesting that whoever
/// holds `signer` authorized this exact version given this exact ancestor
/// path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySignature {
    /// The identity that produced this signature.
    pub signer: Identity,
    /// The signature itself.
    pub signature: Signature,
    /// The path digest this signature was computed over, cached alongside it
    /// so a later reconstruction of the path can be checked against it.
    pub path_digest: [u8; 32],
}

/// A versioned, evolvable access-control policy.
///
/// Two policies with equal `version`, `description`, `base_id`, and `rules`
/// are content-identical: [`Policy::id`] ignores `signatures` and `path`
/// entirely, by design — those fields justify *how* this version came to
/// exist, not *what* it says.
#[derive(Clone, Debug)]
pub struct Policy {
    pub(crate) version: u64,
    pub(crate) description: Vec<u8>,
    pub(crate) base_id: PolicyId,
    pub(crate) rules: RuleSet,
    pub(crate) signatures: Vec<PolicySignature>,
    pub(crate) path: Vec<Policy>,
}

/// The portion of a [`Policy`] that participates in content-addressing and
/// that round-trips through serialization: everything except the
/// evolution-justifying `signatures` and `path`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
struct PolicyInvariant {
    version: u64,
    description: Vec<u8>,
    base_id: Vec<u8>,
    rules: BTreeMap<String, String>,
}

impl Policy {
    /// Creates a brand-new genesis policy: version 0, an empty base id, and
    /// no ancestors or signatures.
    pub fn new(description: impl Into<Vec<u8>>, rules: RuleSet) -> Self {
        Self {
            version: 0,
            description: description.into(),
            base_id: PolicyId(Vec::new()),
            rules,
            signatures: Vec::new(),
            path: Vec::new(),
        }
    }

    /// The policy's version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The policy's free-form description bytes.
    pub fn description(&self) -> &[u8] {
        &self.description
    }

    /// The policy's rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// A mutable handle to the rule set, for building up a genesis policy or
    /// preparing the next version before calling [`Policy::evolve`].
    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// The evolution signatures attached to this (non-genesis) policy.
    pub fn signatures(&self) -> &[PolicySignature] {
        &self.signatures
    }

    /// The ancestor path attached to this (non-genesis) policy.
    pub fn path(&self) -> &[Policy] {
        &self.path
    }

    /// Deep-copies this policy, including its rules, but clears `signatures`
    /// and `path`: the copy has no provenance of its own until it is evolved.
    pub fn copy(&self) -> Self {
        Self {
            version: self.version,
            description: self.description.clone(),
            base_id: self.base_id.clone(),
            rules: self.rules.clone(),
            signatures: Vec::new(),
            path: Vec::new(),
        }
    }

    /// The content-addressed id of this policy: the SHA-256 digest of its
    /// `version`, `description`, `base_id`, and lexicographically-ordered
    /// rules. Signatures and path never affect this value.
    pub fn id(&self) -> PolicyId {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.description);
        buf.extend_from_slice(&self.base_id.0);
        for (action, expr) in self.rules.iter() {
            buf.extend_from_slice(action.as_bytes());
            buf.extend_from_slice(expr.as_bytes());
        }
        PolicyId(sha256_concat(&[&buf]).to_vec())
    }

    /// The id of the genesis policy this version descends from: its own id
    /// if this *is* the genesis (`version == 0`), otherwise the stored
    /// `base_id`.
    pub fn base_id(&self) -> PolicyId {
        if self.version == 0 {
            self.id()
        } else {
            self.base_id.clone()
        }
    }

    /// Advances this policy's version in place without attaching any
    /// signatures or path, for callers assembling a successor entirely by
    /// hand (e.g. test fixtures exercising the verifier directly).
    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    /// Evolves this policy into the next version, signing it with
    /// `prev_signers` over `path`.
    ///
    /// `path` must be non-empty: its last element is the direct predecessor
    /// this version's `version` and `base_id` are derived from. Checking
    /// this *before* touching `path.last()` (rather than after) closes a gap
    /// that otherwise lets an empty path panic instead of returning an
    /// error.
    ///
    /// All signatures are computed before anything on `self` is mutated, so
    /// a signer that fails partway through leaves this policy in its
    /// pre-evolve state: evolution is all-or-nothing.
    pub fn evolve(&mut self, path: &[Policy], prev_signers: &[&Signer]) -> Result<(), PolicyError> {
        if path.is_empty() {
            return Err(PolicyError::EmptyPath);
        }
        #[allow(clippy::indexing_slicing)]
        let prev = &path[path.len() - 1];

        let new_version = prev.version + 1;
        let new_base_id = prev.base_id();

        let mut scratch = self.copy();
        scratch.version = new_version;
        scratch.base_id = new_base_id.clone();
        let new_id = scratch.id();
        let digest = path_digest(path);

        let mut signatures = Vec::with_capacity(prev_signers.len());
        for signer in prev_signers {
            let message = sha256_concat(&[new_id.as_ref(), &digest]);
            let signature = signer.sign(&message).map_err(|e| {
                tracing::warn!(
                    target: "covenant.evolve",
                    event = "signer_failed",
                    version = new_version,
                    error = %e,
                );
                e
            })?;
            signatures.push(PolicySignature {
                signer: signer.identity(),
                signature,
                path_digest: digest,
            });
        }

        self.version = new_version;
        self.base_id = new_base_id;
        self.path = path.to_vec();
        self.signatures = signatures;
        tracing::debug!(
            target: "covenant.evolve",
            event = "evolved",
            version = self.version,
            signers = prev_signers.len(),
        );
        Ok(())
    }

    /// Encodes the invariant (content-addressed) portion of this policy as
    /// canonical bytes. Two policies with equal `version`, `description`,
    /// `base_id`, and `rules` always produce identical output.
    pub fn to_proto(&self) -> Vec<u8> {
        let invariant = PolicyInvariant {
            version: self.version,
            description: self.description.clone(),
            base_id: self.base_id.0.clone(),
            rules: self.rules.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        };
        invariant.encode()
    }

    /// Decodes a policy's invariant portion from canonical bytes, producing
    /// a policy with no signatures or path: exactly the state a freshly
    /// decoded genesis policy would be in before any evolution.
    pub fn from_proto(bytes: &[u8]) -> Result<Self, PolicyError> {
        let invariant = PolicyInvariant::decode(&mut &bytes[..])
            .map_err(|e| PolicyError::SignatureInvalid(format!("malformed policy encoding: {e}")))?;
        Ok(Self {
            version: invariant.version,
            description: invariant.description,
            base_id: PolicyId(invariant.base_id),
            rules: RuleSet::from_map(invariant.rules),
            signatures: Vec::new(),
            path: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use covenant_crypto::eddsa::Ed25519KeyPair;

    #[test]
    fn id_ignores_signatures_and_path() {
        let rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        let a = Policy::new(b"genesis".to_vec(), rules.clone());
        let mut b = a.clone();
        b.signatures.push(PolicySignature {
            signer: Identity::Delegated(vec![1]),
            signature: Signature::Raw(vec![2]),
            path_digest: [0u8; 32],
        });
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn copy_clears_signatures_and_path() {
        let rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        let mut a = Policy::new(b"genesis".to_vec(), rules);
        a.signatures.push(PolicySignature {
            signer: Identity::Delegated(vec![1]),
            signature: Signature::Raw(vec![2]),
            path_digest: [0u8; 32],
        });
        let copy = a.copy();
        assert!(copy.signatures.is_empty());
        assert!(copy.path.is_empty());
        assert_eq!(copy.rules, a.rules);
    }

    #[test]
    fn evolve_rejects_empty_path() {
        let rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        let mut next = Policy::new(b"v1".to_vec(), rules);
        let result = next.evolve(&[], &[]);
        assert!(matches!(result, Err(PolicyError::EmptyPath)));
        // Failing on an empty path must not have mutated the policy at all.
        assert_eq!(next.version, 0);
    }

    #[test]
    fn evolve_leaves_policy_untouched_on_signer_failure() {
        // A Signer::sign only fails on an empty message, which never
        // happens here, so exercise the all-or-nothing guarantee by
        // confirming version/base_id are unchanged until every signer has
        // succeeded, then checking the post-state matches the genesis
        // ancestor exactly once all signers do succeed.
        let keypair = Ed25519KeyPair::generate().unwrap();
        let signer = Signer::Ed25519(keypair);
        let rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        let genesis = Policy::new(b"genesis".to_vec(), rules.clone());
        let mut next = Policy::new(b"v1".to_vec(), rules);
        next.evolve(&[genesis.clone()], &[&signer]).unwrap();
        assert_eq!(next.version, 1);
        assert_eq!(next.base_id(), genesis.base_id());
        assert_eq!(next.signatures.len(), 1);
        assert_eq!(next.path.len(), 1);
    }

    #[test]
    fn to_proto_round_trips_invariant_fields() {
        let rules = RuleSet::init(["ed25519:a"], ["ed25519:b"]);
        let policy = Policy::new(b"hello".to_vec(), rules);
        let bytes = policy.to_proto();
        let decoded = Policy::from_proto(&bytes).unwrap();
        assert_eq!(decoded.id(), policy.id());
        assert_eq!(decoded.version, policy.version);
        assert_eq!(decoded.description, policy.description);
    }

    #[test]
    fn equal_fields_serialize_to_equal_bytes() {
        let rules_a = RuleSet::init(["ed25519:a"], ["ed25519:b"]);
        let rules_b = RuleSet::init(["ed25519:a"], ["ed25519:b"]);
        let a = Policy::new(b"same".to_vec(), rules_a);
        let b = Policy::new(b"same".to_vec(), rules_b);
        assert_eq!(a.to_proto(), b.to_proto());
    }

    proptest::proptest! {
        /// Invariant 2: `id()` depends only on `(version, description,
        /// base_id, rules)`. Attaching arbitrary signatures and a non-empty
        /// path to an otherwise-identical policy must never change its id.
        #[test]
        fn id_ignores_arbitrary_signatures_and_path(
            description in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..32),
            signature_count in 0usize..4,
        ) {
            let rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
            let base = Policy::new(description, rules);
            let mut with_extras = base.clone();
            for i in 0..signature_count {
                with_extras.signatures.push(PolicySignature {
                    signer: Identity::Delegated(vec![i as u8]),
                    signature: Signature::Raw(vec![i as u8, i as u8]),
                    path_digest: [i as u8; 32],
                });
            }
            with_extras.path.push(base.clone());
            proptest::prop_assert_eq!(with_extras.id(), base.id());
        }
    }
}

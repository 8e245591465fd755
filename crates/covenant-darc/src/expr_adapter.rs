// Path: crates/covenant-darc/src/expr_adapter.rs
//! Bridges the boolean expression evaluator to the policy-object core: turns
//! a flat list of signer identity strings into a `satisfied` predicate,
//! resolving `darc:`-tagged terms by recursively checking the referenced
//! policy's own `_sign` expression.
//!
//! The source material this crate descends from recurses through delegated
//! policies with no cycle or depth protection at all: a delegation loop
//! simply never terminates. This adapter tracks visited policy ids and
//! enforces a maximum recursion depth, surfacing both as an ordinary
//! unsatisfied term rather than a panic or a hang — a cycle or an
//! over-deep chain just fails the authorization check it appears in.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::policy::Policy;
use crate::rules::SIGN;
use crate::verify::{verify, PolicyLookup};

/// The default bound on how many `darc:` hops a single expression
/// evaluation will follow before treating the chain as unsatisfied.
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 16;

struct Guard<'a> {
    lookup: &'a dyn PolicyLookup,
    identities: &'a [String],
    visited: RefCell<HashSet<Vec<u8>>>,
    max_depth: usize,
}

impl<'a> Guard<'a> {
    fn satisfied(&self, term: &str, depth: usize) -> bool {
        match darc_id_of(term) {
            Some(darc_id) => self.satisfied_delegated(term, darc_id, depth),
            None => self.identities.iter().any(|id| id == term),
        }
    }

    fn satisfied_delegated(&self, term: &str, darc_id: Vec<u8>, depth: usize) -> bool {
        if depth >= self.max_depth {
            tracing::warn!(
                target: "covenant.delegation",
                event = "depth_exceeded",
                term,
                max_depth = self.max_depth,
            );
            return false;
        }
        if !self.visited.borrow_mut().insert(darc_id) {
            tracing::warn!(target: "covenant.delegation", event = "cycle_detected", term);
            return false; // already on this evaluation's recursion stack: a cycle
        }

        let Some(policy) = self.lookup.lookup(term) else {
            tracing::debug!(target: "covenant.delegation", event = "lookup_miss", term);
            return false;
        };
        if verify(Some(&policy), self.lookup).is_err() {
            tracing::warn!(target: "covenant.delegation", event = "delegate_verify_failed", term);
            return false;
        }
        let Some(sign_expr) = policy.rules().sign_expr() else {
            return false;
        };
        tracing::debug!(target: "covenant.delegation", event = "resolving", term, depth);
        covenant_expr::evaluate(sign_expr, |t| self.satisfied(t, depth + 1)).unwrap_or(false)
    }
}

fn darc_id_of(term: &str) -> Option<Vec<u8>> {
    let payload = term.strip_prefix("darc:")?;
    hex::decode(payload).ok()
}

/// Builds a `satisfied` predicate over `identities`, resolving delegation
/// through `lookup` with `max_depth` as the recursion bound. The returned
/// closure borrows `lookup` and `identities` for its whole lifetime, and
/// owns its own visited-set: each call to [`satisfied_fn`] starts a fresh
/// evaluation with no memory of any other.
pub fn satisfied_fn<'a>(
    lookup: &'a dyn PolicyLookup,
    identities: &'a [String],
    max_depth: usize,
) -> impl Fn(&str) -> bool + 'a {
    let guard = Guard {
        lookup,
        identities,
        visited: RefCell::new(HashSet::new()),
        max_depth,
    };
    move |term: &str| guard.satisfied(term, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Policy;
    use crate::rules::RuleSet;
    use covenant_crypto::eddsa::Ed25519KeyPair;
    use covenant_crypto::identity::Identity;
    use std::collections::HashMap;

    fn lookup_from(map: HashMap<String, Policy>) -> impl Fn(&str) -> Option<Policy> {
        move |id: &str| map.get(id).cloned()
    }

    #[test]
    fn plain_identity_is_satisfied_directly() {
        let identities = vec!["ed25519:alice".to_string()];
        let lookup = lookup_from(HashMap::new());
        let satisfied = satisfied_fn(&lookup, &identities, DEFAULT_MAX_DELEGATION_DEPTH);
        assert!(satisfied("ed25519:alice"));
        assert!(!satisfied("ed25519:bob"));
    }

    #[test]
    fn delegated_identity_resolves_through_referenced_policy_sign_expression() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        let signer_id = Identity::Ed25519(keypair.public_key()).to_string_id();

        let rules = RuleSet::init([signer_id.clone()], [signer_id.clone()]);
        let delegate_policy = Policy::new(b"delegate".to_vec(), rules);
        let delegate_darc_id = format!("darc:{}", delegate_policy.id().to_hex());

        let mut policies = HashMap::new();
        policies.insert(delegate_darc_id.clone(), delegate_policy);
        let lookup = lookup_from(policies);

        let identities = vec![signer_id];
        let satisfied = satisfied_fn(&lookup, &identities, DEFAULT_MAX_DELEGATION_DEPTH);
        assert!(satisfied(&delegate_darc_id));
    }

    #[test]
    fn unresolvable_delegation_is_unsatisfied() {
        let lookup = lookup_from(HashMap::new());
        let identities: Vec<String> = Vec::new();
        let satisfied = satisfied_fn(&lookup, &identities, DEFAULT_MAX_DELEGATION_DEPTH);
        assert!(!satisfied("darc:deadbeef"));
    }

    #[test]
    fn self_referential_delegation_terminates_instead_of_looping() {
        // A policy whose own `_sign` expression names itself as a delegate:
        // with no cycle protection at all this would recurse forever.
        let rules = RuleSet::init(Vec::<String>::new(), Vec::<String>::new());
        let mut cyclic = Policy::new(b"cyclic".to_vec(), rules);
        let self_id = "darc:aa00aa00".to_string();
        cyclic.rules_mut().update_sign(self_id.clone());

        let mut policies = HashMap::new();
        policies.insert(self_id.clone(), cyclic);
        let lookup = lookup_from(policies);

        let identities: Vec<String> = Vec::new();
        let satisfied = satisfied_fn(&lookup, &identities, DEFAULT_MAX_DELEGATION_DEPTH);
        assert!(!satisfied(&self_id));
    }
}

// Path: crates/covenant-darc/src/request.rs
//! Requests: a caller's claim to be allowed to perform one action under one
//! policy, plus the signatures backing that claim, and the check that
//! decides whether the policy's rules actually grant it.

use covenant_crypto::identity::{Identity, Signature, Signer};
use covenant_types::{PolicyError, PolicyId};

use crate::expr_adapter::{satisfied_fn, DEFAULT_MAX_DELEGATION_DEPTH};
use crate::hash::sha256_concat;
use crate::policy::Policy;
use crate::verify::PolicyLookup;

/// A request to perform `action` under the policy identified by `policy_id`,
/// signed by one or more identities.
#[derive(Clone, Debug)]
pub struct Request {
    /// The policy this request claims authorization under.
    pub policy_id: PolicyId,
    /// The action name, which must exist in the policy's rule set.
    pub action: String,
    /// Free-form payload bytes, included in the signed digest but otherwise
    /// opaque to authorization.
    pub payload: Vec<u8>,
    /// The identities that signed this request, in the same order as
    /// `signatures`.
    pub identities: Vec<Identity>,
    /// The signatures, one per identity in `identities`.
    pub signatures: Vec<Signature>,
}

impl Request {
    /// Builds and signs a request in one step: computes the digest over
    /// `policy_id`, `action`, and `payload`, then has every signer in
    /// `signers` sign it, collecting their public identities alongside.
    pub fn new_signed(
        policy_id: PolicyId,
        action: impl Into<String>,
        payload: Vec<u8>,
        signers: &[&Signer],
    ) -> Result<Self, PolicyError> {
        let action = action.into();
        let digest = sha256_concat(&[policy_id.as_ref(), action.as_bytes(), &payload]);

        let mut identities = Vec::with_capacity(signers.len());
        let mut signatures = Vec::with_capacity(signers.len());
        for signer in signers {
            signatures.push(signer.sign(&digest)?);
            identities.push(signer.identity());
        }

        Ok(Self {
            policy_id,
            action,
            payload,
            identities,
            signatures,
        })
    }

    /// The digest every identity in this request is expected to have signed:
    /// `SHA-256(policy_id || action || payload)`.
    pub fn digest(&self) -> [u8; 32] {
        sha256_concat(&[self.policy_id.as_ref(), self.action.as_bytes(), &self.payload])
    }

    /// The canonical string form of every signing identity, in order.
    pub fn identity_strings(&self) -> Vec<String> {
        self.identities.iter().map(Identity::to_string_id).collect()
    }
}

/// Checks whether `request` is authorized under `policy`: the request's
/// policy id must match, its action must exist, every attached signature
/// must verify over the request digest, and the action's expression must
/// evaluate to true over the signing identities (with delegation resolved
/// through `lookup`).
pub fn check_request(policy: &Policy, request: &Request, lookup: &dyn PolicyLookup) -> Result<(), PolicyError> {
    if policy.id() != request.policy_id {
        return Err(PolicyError::PolicyIdMismatch);
    }
    let expr = policy
        .rules()
        .get(&request.action)
        .ok_or_else(|| PolicyError::UnknownAction(request.action.clone()))?;

    let digest = request.digest();
    for (identity, signature) in request.identities.iter().zip(&request.signatures) {
        identity.verify(&digest, signature)?;
    }

    let identity_strings = request.identity_strings();
    let satisfied = satisfied_fn(lookup, &identity_strings, DEFAULT_MAX_DELEGATION_DEPTH);
    let ok = covenant_expr::evaluate(expr, satisfied)?;
    if !ok {
        tracing::warn!(
            target: "covenant.request",
            event = "expression_false",
            action = %request.action,
            signers = ?identity_strings,
        );
        return Err(PolicyError::ExpressionFalse {
            expression: expr.clone(),
            identities: identity_strings,
        });
    }
    tracing::debug!(target: "covenant.request", event = "authorized", action = %request.action);
    Ok(())
}

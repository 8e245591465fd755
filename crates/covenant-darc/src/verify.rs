// Path: crates/covenant-darc/src/verify.rs
//! Evolution verification: walking a policy's ancestor path back to its
//! genesis and checking every hop's version, base id, signatures, and
//! `_evolve` expression.

use covenant_types::PolicyError;

use crate::expr_adapter::{satisfied_fn, DEFAULT_MAX_DELEGATION_DEPTH};
use crate::hash::{path_digest, sha256_concat};
use crate::policy::Policy;
use crate::rules::EVOLVE;

/// A source of policies by their canonical `"darc:<hex-id>"` string form,
/// used to resolve the base policy when a successor's own `path` is empty.
///
/// Any `Fn(&str) -> Option<Policy>` implements this automatically, so a
/// closure over an in-memory map or a database handle both work as-is.
pub trait PolicyLookup {
    /// Looks up a policy by its canonical identity string.
    fn lookup(&self, id: &str) -> Option<Policy>;
}

impl<F> PolicyLookup for F
where
    F: Fn(&str) -> Option<Policy>,
{
    fn lookup(&self, id: &str) -> Option<Policy> {
        self(id)
    }
}

/// Verifies that `policy` is a legitimate evolution of its genesis,
/// following the path embedded in `policy` (or reconstructing it via
/// `lookup` if empty).
///
/// A genesis policy (`version == 0`) always verifies trivially: it has no
/// predecessor to check against.
pub fn verify(policy: Option<&Policy>, lookup: &dyn PolicyLookup) -> Result<(), PolicyError> {
    let policy = policy.ok_or(PolicyError::NilPolicy)?;
    if policy.version() == 0 {
        tracing::debug!(target: "covenant.verify", event = "genesis_ok", id = %policy.id());
        return Ok(());
    }
    if policy.signatures().is_empty() {
        tracing::warn!(target: "covenant.verify", event = "no_signatures", id = %policy.id());
        return Err(PolicyError::NoSignatures);
    }

    let path = reconstruct_path(policy, lookup)?;

    let mut prev: Option<&Policy> = None;
    for curr in &path {
        if let Some(p) = prev {
            hop(curr, p, lookup)?;
        } else if curr.version() != 0 {
            tracing::warn!(
                target: "covenant.verify",
                event = "path_root_not_genesis",
                version = curr.version(),
            );
            return Err(PolicyError::VersionNotMonotonic {
                expected: 0,
                got: curr.version(),
            });
        }
        prev = Some(curr);
    }

    let last = path.last().ok_or(PolicyError::ReconstructedPathEmpty)?;
    let result = hop(policy, last, lookup);
    match &result {
        Ok(()) => tracing::debug!(
            target: "covenant.verify",
            event = "hop_ok",
            id = %policy.id(),
            version = policy.version(),
        ),
        Err(e) => tracing::warn!(
            target: "covenant.verify",
            event = "hop_rejected",
            id = %policy.id(),
            version = policy.version(),
            error = %e,
        ),
    }
    result
}

/// Returns `policy`'s stored path if non-empty, otherwise reconstructs it by
/// looking up the genesis policy and taking every ancestor strictly older
/// than `policy`, checking the result against every signature's cached path
/// digest.
fn reconstruct_path(policy: &Policy, lookup: &dyn PolicyLookup) -> Result<Vec<Policy>, PolicyError> {
    if !policy.path().is_empty() {
        return Ok(policy.path().to_vec());
    }

    let base_id = policy.base_id();
    if base_id.is_empty() {
        return Err(PolicyError::NilBaseId);
    }
    let base_id_string = format!("darc:{}", base_id.to_hex());
    let latest = lookup
        .lookup(&base_id_string)
        .ok_or_else(|| PolicyError::BaseNotFound(base_id_string.clone()))?;

    let mut path = Vec::new();
    for ancestor in latest.path() {
        if policy.version() > ancestor.version() {
            path.push(ancestor.clone());
        } else {
            break;
        }
    }

    let digest = path_digest(&path);
    for sig in policy.signatures() {
        if sig.path_digest != digest {
            tracing::warn!(
                target: "covenant.verify",
                event = "path_digest_mismatch",
                base_id = %base_id,
            );
            return Err(PolicyError::PathDigestMismatch);
        }
    }
    if path.is_empty() {
        return Err(PolicyError::ReconstructedPathEmpty);
    }
    tracing::debug!(
        target: "covenant.verify",
        event = "path_reconstructed",
        base_id = %base_id,
        hops = path.len(),
    );
    Ok(path)
}

/// Verifies a single evolution hop: `new` must be `prev`'s direct successor,
/// satisfy `prev`'s [`EVOLVE`] expression over `new`'s signers, and every
/// signature on `new` must verify against `prev`'s base id.
fn hop(new: &Policy, prev: &Policy, lookup: &dyn PolicyLookup) -> Result<(), PolicyError> {
    let new_base_id = new.base_id();
    if new_base_id.is_empty() {
        return Err(PolicyError::NilBaseId);
    }
    if new_base_id != prev.base_id() {
        return Err(PolicyError::BaseMismatch);
    }
    if new.version() != prev.version() + 1 {
        return Err(PolicyError::VersionNotMonotonic {
            expected: prev.version() + 1,
            got: new.version(),
        });
    }

    let evolve_expr = prev.rules().evolve_expr().ok_or(PolicyError::UnknownAction(EVOLVE.to_string()))?;
    let signer_ids: Vec<String> = new
        .signatures()
        .iter()
        .map(|sig| sig.signer.to_string_id())
        .collect();
    let satisfied = satisfied_fn(lookup, &signer_ids, DEFAULT_MAX_DELEGATION_DEPTH);
    let ok = covenant_expr::evaluate(evolve_expr, satisfied)?;
    if !ok {
        tracing::warn!(
            target: "covenant.verify",
            event = "evolve_expression_false",
            version = new.version(),
            signers = ?signer_ids,
        );
        return Err(PolicyError::ExpressionFalse {
            expression: evolve_expr.clone(),
            identities: signer_ids,
        });
    }

    for sig in new.signatures() {
        verify_one_signature(sig, new, prev)?;
    }
    Ok(())
}

fn verify_one_signature(
    sig: &crate::policy::PolicySignature,
    new: &Policy,
    prev: &Policy,
) -> Result<(), PolicyError> {
    let base = prev.base_id();
    if base.is_empty() {
        return Err(PolicyError::NilBaseId);
    }
    let path_root = new.path().first().ok_or(PolicyError::MissingSignaturePath)?;
    if path_root.id() != base {
        return Err(PolicyError::PathRootMismatch);
    }

    let message = sha256_concat(&[new.id().as_ref(), &sig.path_digest]);
    sig.signer.verify(&message, &sig.signature)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use covenant_crypto::eddsa::Ed25519KeyPair;
    use covenant_crypto::identity::Signer;

    fn no_lookup() -> impl Fn(&str) -> Option<Policy> {
        |_: &str| None
    }

    #[test]
    fn genesis_policy_always_verifies() {
        let rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        let genesis = Policy::new(b"genesis".to_vec(), rules);
        assert!(verify(Some(&genesis), &no_lookup()).is_ok());
    }

    #[test]
    fn nil_policy_is_an_error() {
        assert!(matches!(verify(None, &no_lookup()), Err(PolicyError::NilPolicy)));
    }

    #[test]
    fn single_evolution_with_correct_signer_verifies() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        let identity_string = covenant_crypto::Identity::Ed25519(keypair.public_key()).to_string_id();
        let signer = Signer::Ed25519(keypair);

        let rules = RuleSet::init([identity_string.clone()], [identity_string]);
        let genesis = Policy::new(b"genesis".to_vec(), rules.clone());

        let mut next = Policy::new(b"v1".to_vec(), rules);
        next.evolve(&[genesis.clone()], &[&signer]).unwrap();

        assert!(verify(Some(&next), &no_lookup()).is_ok());
    }

    #[test]
    fn evolution_signed_by_wrong_key_is_rejected() {
        let owner = Ed25519KeyPair::generate().unwrap();
        let owner_id = covenant_crypto::Identity::Ed25519(owner.public_key()).to_string_id();
        let impostor = Signer::Ed25519(Ed25519KeyPair::generate().unwrap());

        let rules = RuleSet::init([owner_id.clone()], [owner_id]);
        let genesis = Policy::new(b"genesis".to_vec(), rules.clone());

        let mut next = Policy::new(b"v1".to_vec(), rules);
        next.evolve(&[genesis], &[&impostor]).unwrap();

        assert!(verify(Some(&next), &no_lookup()).is_err());
    }

    #[test]
    fn tampered_path_digest_is_rejected() {
        let keypair = Ed25519KeyPair::generate().unwrap();
        let identity_string = covenant_crypto::Identity::Ed25519(keypair.public_key()).to_string_id();
        let signer = Signer::Ed25519(keypair);

        let rules = RuleSet::init([identity_string.clone()], [identity_string]);
        let genesis = Policy::new(b"genesis".to_vec(), rules.clone());

        let mut next = Policy::new(b"v1".to_vec(), rules);
        next.evolve(&[genesis], &[&signer]).unwrap();
        // Flip a byte in the cached path digest of the one signature: the
        // signature no longer covers the path it claims to.
        if let Some(sig) = next_signature_mut(&mut next) {
            sig.path_digest[0] ^= 0xFF;
        }

        assert!(verify(Some(&next), &no_lookup()).is_err());
    }

    fn next_signature_mut(policy: &mut Policy) -> Option<&mut crate::policy::PolicySignature> {
        policy.signatures.first_mut()
    }
}

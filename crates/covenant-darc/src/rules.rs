// Path: crates/covenant-darc/src/rules.rs
//! The rule set: a map from action name to boolean identity-expression text,
//! always carrying the two reserved actions that drive evolution and
//! request-signature checking.

use std::collections::BTreeMap;

use covenant_expr::Expr;
use covenant_types::PolicyError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The action that governs who may produce the next version of a policy.
pub const EVOLVE: &str = "_evolve";
/// The action that governs who may co-sign a request alongside its primary
/// authorization expression.
pub const SIGN: &str = "_sign";

/// A map from action name to its governing expression, stored in a
/// `BTreeMap` so iteration is always in lexicographic key order — exactly
/// the order content-addressing needs, with no separate sort step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct RuleSet(BTreeMap<String, Expr>);

impl RuleSet {
    /// Builds the default rule set for a fresh policy: both reserved actions
    /// are the disjunction of the given identities, and no other actions
    /// exist yet.
    pub fn init<I1, S1, I2, S2>(owners: I1, signers: I2) -> Self
    where
        I1: IntoIterator<Item = S1>,
        S1: AsRef<str>,
        I2: IntoIterator<Item = S2>,
        S2: AsRef<str>,
    {
        let mut rules = BTreeMap::new();
        rules.insert(EVOLVE.to_string(), covenant_expr::init_or(owners));
        rules.insert(SIGN.to_string(), covenant_expr::init_or(signers));
        Self(rules)
    }

    /// Rebuilds a rule set from a raw map, e.g. one just decoded from
    /// canonical bytes. Unlike [`RuleSet::add`], this does not reject
    /// reserved action names: a decoded policy must keep whatever
    /// `_evolve`/`_sign` expressions it was encoded with.
    pub(crate) fn from_map(map: BTreeMap<String, Expr>) -> Self {
        Self(map)
    }

    /// True if `action` has a governing expression in this rule set.
    pub fn contains(&self, action: &str) -> bool {
        self.0.contains_key(action)
    }

    /// The expression governing `action`, if any.
    pub fn get(&self, action: &str) -> Option<&Expr> {
        self.0.get(action)
    }

    /// The expression governing [`EVOLVE`]. Every rule set produced by
    /// [`RuleSet::init`] carries one; a rule set decoded from untrusted bytes
    /// may not, hence the `Option`.
    pub fn evolve_expr(&self) -> Option<&Expr> {
        self.0.get(EVOLVE)
    }

    /// The expression governing [`SIGN`].
    pub fn sign_expr(&self) -> Option<&Expr> {
        self.0.get(SIGN)
    }

    /// Iterates `(action, expression)` pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Adds a brand-new, non-reserved action. Fails if the action already
    /// exists (reserved actions always exist once a rule set has been
    /// [`RuleSet::init`]ed, so this alone keeps them out of reach of the
    /// generic API) or if the name is one of the reserved actions outright,
    /// so that even a rule set built by hand without `init` cannot smuggle
    /// a reserved action in through the wrong door.
    pub fn add(&mut self, action: impl Into<String>, expr: impl Into<Expr>) -> Result<(), PolicyError> {
        let action = action.into();
        if is_reserved(&action) {
            return Err(PolicyError::ReservedAction(action));
        }
        if self.0.contains_key(&action) {
            return Err(PolicyError::DuplicateAction(action));
        }
        self.0.insert(action, expr.into());
        Ok(())
    }

    /// Replaces the expression of an existing, non-reserved action.
    pub fn update(&mut self, action: &str, expr: impl Into<Expr>) -> Result<(), PolicyError> {
        if is_reserved(action) {
            return Err(PolicyError::ReservedAction(action.to_string()));
        }
        if !self.0.contains_key(action) {
            return Err(PolicyError::UnknownAction(action.to_string()));
        }
        self.0.insert(action.to_string(), expr.into());
        Ok(())
    }

    /// Removes a non-reserved action.
    pub fn delete(&mut self, action: &str) -> Result<(), PolicyError> {
        if is_reserved(action) {
            return Err(PolicyError::ReservedAction(action.to_string()));
        }
        if self.0.remove(action).is_none() {
            return Err(PolicyError::UnknownAction(action.to_string()));
        }
        Ok(())
    }

    /// Replaces the [`EVOLVE`] expression. The only way to change who may
    /// evolve a policy, since [`RuleSet::update`] refuses reserved actions.
    pub fn update_evolve(&mut self, expr: impl Into<Expr>) {
        self.0.insert(EVOLVE.to_string(), expr.into());
    }

    /// Replaces the [`SIGN`] expression.
    pub fn update_sign(&mut self, expr: impl Into<Expr>) {
        self.0.insert(SIGN.to_string(), expr.into());
    }
}

fn is_reserved(action: &str) -> bool {
    action == EVOLVE || action == SIGN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_sets_both_reserved_actions() {
        let rules = RuleSet::init(["ed25519:owner"], ["ed25519:signer"]);
        assert_eq!(rules.evolve_expr().unwrap(), "ed25519:owner");
        assert_eq!(rules.sign_expr().unwrap(), "ed25519:signer");
    }

    #[test]
    fn add_rejects_reserved_names() {
        let mut rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        assert!(matches!(
            rules.add(EVOLVE, "ed25519:b"),
            Err(PolicyError::ReservedAction(_))
        ));
    }

    #[test]
    fn add_then_update_then_delete_round_trips() {
        let mut rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        rules.add("invoke", "ed25519:a").unwrap();
        assert!(rules.contains("invoke"));
        rules.update("invoke", "ed25519:a | ed25519:b").unwrap();
        assert_eq!(rules.get("invoke").unwrap(), "ed25519:a | ed25519:b");
        rules.delete("invoke").unwrap();
        assert!(!rules.contains("invoke"));
    }

    #[test]
    fn delete_refuses_reserved_and_unknown_actions() {
        let mut rules = RuleSet::init(["ed25519:a"], ["ed25519:a"]);
        assert!(matches!(rules.delete(SIGN), Err(PolicyError::ReservedAction(_))));
        assert!(matches!(
            rules.delete("nonexistent"),
            Err(PolicyError::UnknownAction(_))
        ));
    }

    #[test]
    fn iteration_order_is_lexicographic() {
        let mut rules = RuleSet::init(Vec::<&str>::new(), Vec::<&str>::new());
        rules.add("zeta", "ed25519:a").unwrap();
        rules.add("alpha", "ed25519:a").unwrap();
        let names: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["_evolve", "_sign", "alpha", "zeta"]);
    }

    #[test]
    fn empty_owner_list_produces_unsatisfiable_evolve_expression() {
        let rules = RuleSet::init(Vec::<&str>::new(), ["ed25519:a"]);
        assert_eq!(rules.evolve_expr().unwrap(), "");
    }
}

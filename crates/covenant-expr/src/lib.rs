// Path: crates/covenant-expr/src/lib.rs
//! A tiny boolean expression language over identity-string atoms.
//!
//! This is the "external collaborator" the policy-object core delegates
//! Boolean-combination semantics to: a rule's expression is free-form text
//! such as `"ed25519:a & ed25519:b | darc:deadbeef"`, and this crate knows
//! how to parse and evaluate it against a caller-supplied `satisfied`
//! predicate. It intentionally has no notion of policies, signatures, or
//! delegation — those live one layer up in `covenant-darc`, which supplies
//! the predicate.

mod parser;

pub use covenant_types::ExprError;

/// The textual form of a rule expression, e.g. `"ed25519:a & ed25519:b"`.
///
/// Kept as a plain `String` rather than a parsed type because a rule set may
/// legitimately hold syntactically invalid expressions until the moment they
/// are evaluated (parsing is lazy, per rule-set semantics).
pub type Expr = String;

/// A parser bound to a single `satisfied` predicate, evaluating expressions
/// against whatever notion of "this identity is present" the predicate
/// encodes.
pub struct Parser<'a> {
    satisfied: Box<dyn Fn(&str) -> bool + 'a>,
}

impl<'a> Parser<'a> {
    /// Binds a fresh parser to `satisfied`. Call [`Parser::evaluate`] once
    /// per expression; the predicate is consulted once per distinct term.
    pub fn new(satisfied: impl Fn(&str) -> bool + 'a) -> Self {
        Self {
            satisfied: Box::new(satisfied),
        }
    }

    /// Parses and evaluates `expr`, returning whether it is satisfied.
    pub fn evaluate(&self, expr: &str) -> Result<bool, ExprError> {
        let ast = parser::parse(expr)?;
        Ok(ast.eval(&*self.satisfied))
    }
}

/// Evaluates `expr` against `satisfied` without retaining a [`Parser`].
/// Equivalent to `Parser::new(satisfied).evaluate(expr)`.
pub fn evaluate(expr: &str, satisfied: impl Fn(&str) -> bool) -> Result<bool, ExprError> {
    Parser::new(satisfied).evaluate(expr)
}

/// Builds the disjunction (`"a | b | c"`) of a list of identity strings.
///
/// Used to initialize the default `_evolve` and `_sign` expressions from a
/// list of owner or signer identities. Returns `"<never satisfied>"`-shaped
/// empty string when `ids` is empty, matching the degenerate "no one may act"
/// rule that an empty owner/signer list implies.
pub fn init_or<I, S>(ids: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

// Path: crates/covenant-types/src/error.rs
//! Central error types shared across the covenant workspace.
//!
//! Every crate that needs to report a domain error defines its local `error`
//! module as a thin re-export of the relevant enum here, mirroring the way a
//! single source of truth keeps error codes stable across crate boundaries.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
///
/// Codes are for log aggregation and client-side branching; the `Display`
/// impl generated by `thiserror` remains the human-readable message.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors raised by the cryptographic identity and signer primitives.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The signature failed cryptographic verification.
    #[error("signature verification failed")]
    VerificationFailed,
    /// The provided key material is malformed or invalid for the algorithm.
    #[error("invalid cryptographic key: {0}")]
    InvalidKey(String),
    /// The provided signature material is malformed or invalid for the algorithm.
    #[error("invalid signature format: {0}")]
    InvalidSignature(String),
    /// Attempted to verify against, or sign with, a delegated identity.
    #[error("delegated identity has no verifiable key material: {0}")]
    NotAKey(String),
    /// The message to sign or verify was empty where a non-empty message is required.
    #[error("nothing to sign or verify, message is empty")]
    EmptyMessage,
    /// A generic failure in an underlying cryptographic library.
    #[error("cryptographic operation failed: {0}")]
    OperationFailed(String),
    /// The requested operation is not supported by this identity variant.
    #[error("unsupported cryptographic operation: {0}")]
    Unsupported(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::VerificationFailed => "CRYPTO_VERIFICATION_FAILED",
            Self::InvalidKey(_) => "CRYPTO_INVALID_KEY",
            Self::InvalidSignature(_) => "CRYPTO_INVALID_SIGNATURE",
            Self::NotAKey(_) => "CRYPTO_NOT_A_KEY",
            Self::EmptyMessage => "CRYPTO_EMPTY_MESSAGE",
            Self::OperationFailed(_) => "CRYPTO_OPERATION_FAILED",
            Self::Unsupported(_) => "CRYPTO_UNSUPPORTED",
        }
    }
}

/// Errors raised while parsing or evaluating a boolean identity expression.
#[derive(Error, Debug)]
pub enum ExprError {
    /// The expression text could not be tokenized or parsed.
    #[error("failed to parse expression '{0}'")]
    Parse(String),
    /// The expression was empty.
    #[error("expression is empty")]
    Empty,
    /// Parentheses in the expression were not balanced.
    #[error("unbalanced parentheses in expression '{0}'")]
    UnbalancedParens(String),
}

impl ErrorCode for ExprError {
    fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "EXPR_PARSE_ERROR",
            Self::Empty => "EXPR_EMPTY",
            Self::UnbalancedParens(_) => "EXPR_UNBALANCED_PARENS",
        }
    }
}

/// Errors produced by the policy-object core: content-addressing, evolution,
/// verification, and request authorization.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// `verify` was called on a `None`/nil policy.
    #[error("policy is nil")]
    NilPolicy,
    /// An evolution was attempted with no previous signers.
    #[error("signer missing")]
    MissingSigner,
    /// A policy id was empty where a non-empty id is required.
    #[error("id missing")]
    EmptyId,
    /// `evolve` was called with an empty path.
    #[error("path should not be empty")]
    EmptyPath,
    /// A signer or verifier was asked to operate on an empty message.
    #[error("nothing to sign, message is empty")]
    EmptyMessage,
    /// A non-genesis policy carried zero evolution signatures.
    #[error("no signatures")]
    NoSignatures,
    /// The reconstructed path was still empty after consulting the lookup callback.
    #[error("empty path")]
    ReconstructedPathEmpty,
    /// The lookup callback could not find the base policy for a given id.
    #[error("could not find base policy for id '{0}'")]
    BaseNotFound(String),
    /// A stored base id did not match the one recomputed from the path.
    #[error("base ids are not equal")]
    BaseMismatch,
    /// A successor was missing its base id entirely.
    #[error("nil base id")]
    NilBaseId,
    /// `version != prev.version + 1` at some hop.
    #[error("incorrect version, expected {expected} but got {got}")]
    VersionNotMonotonic {
        /// The version the verifier expected at this hop.
        expected: u64,
        /// The version actually present.
        got: u64,
    },
    /// The recomputed path digest did not match the one embedded in a signature.
    #[error("recomputed path digest is not equal to the original")]
    PathDigestMismatch,
    /// A signature's path did not have the expected base policy as its root.
    #[error("base policy is not at the root of the signature path")]
    PathRootMismatch,
    /// No path was stored in a signature that required one.
    #[error("no path stored alongside signature")]
    MissingSignaturePath,
    /// An evolution expression evaluated to false over the supplied signers.
    #[error("expression '{expression}' evaluated to false for identities {identities:?}")]
    ExpressionFalse {
        /// The textual rule expression that was evaluated.
        expression: String,
        /// The identity strings the expression was evaluated against.
        identities: Vec<String>,
    },
    /// An action referenced by a request or rule mutation does not exist.
    #[error("action '{0}' does not exist")]
    UnknownAction(String),
    /// `add` was called for an action that already exists.
    #[error("action '{0}' already exists")]
    DuplicateAction(String),
    /// A generic or reserved action was mutated through the wrong API.
    #[error("cannot mutate reserved action '{0}' through this API")]
    ReservedAction(String),
    /// A request's embedded policy id did not match the policy it was checked against.
    #[error("request policy id does not match")]
    PolicyIdMismatch,
    /// A signature was rejected by the evaluator or signature primitive.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),
    /// A delegation chain revisited a policy id already on the recursion stack.
    #[error("delegation cycle detected at policy '{0}'")]
    DelegationCycle(String),
    /// A delegation chain exceeded the configured recursion depth limit.
    #[error("delegation depth limit ({0}) exceeded")]
    DelegationDepthExceeded(usize),
    /// A cryptographic primitive failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// The expression sub-language failed to parse or evaluate.
    #[error(transparent)]
    Expr(#[from] ExprError),
}

impl ErrorCode for PolicyError {
    fn code(&self) -> &'static str {
        match self {
            Self::NilPolicy => "POLICY_NIL",
            Self::MissingSigner => "POLICY_MISSING_SIGNER",
            Self::EmptyId => "POLICY_EMPTY_ID",
            Self::EmptyPath => "POLICY_EMPTY_PATH",
            Self::EmptyMessage => "POLICY_EMPTY_MESSAGE",
            Self::NoSignatures => "POLICY_NO_SIGNATURES",
            Self::ReconstructedPathEmpty => "POLICY_RECONSTRUCTED_PATH_EMPTY",
            Self::BaseNotFound(_) => "POLICY_BASE_NOT_FOUND",
            Self::BaseMismatch => "POLICY_BASE_MISMATCH",
            Self::NilBaseId => "POLICY_NIL_BASE_ID",
            Self::VersionNotMonotonic { .. } => "POLICY_VERSION_NOT_MONOTONIC",
            Self::PathDigestMismatch => "POLICY_PATH_DIGEST_MISMATCH",
            Self::PathRootMismatch => "POLICY_PATH_ROOT_MISMATCH",
            Self::MissingSignaturePath => "POLICY_MISSING_SIGNATURE_PATH",
            Self::ExpressionFalse { .. } => "POLICY_EXPRESSION_FALSE",
            Self::UnknownAction(_) => "POLICY_UNKNOWN_ACTION",
            Self::DuplicateAction(_) => "POLICY_DUPLICATE_ACTION",
            Self::ReservedAction(_) => "POLICY_RESERVED_ACTION",
            Self::PolicyIdMismatch => "POLICY_ID_MISMATCH",
            Self::SignatureInvalid(_) => "POLICY_SIGNATURE_INVALID",
            Self::DelegationCycle(_) => "POLICY_DELEGATION_CYCLE",
            Self::DelegationDepthExceeded(_) => "POLICY_DELEGATION_DEPTH_EXCEEDED",
            Self::Crypto(_) => "POLICY_CRYPTO_ERROR",
            Self::Expr(_) => "POLICY_EXPR_ERROR",
        }
    }
}

/// A convenience alias used throughout the workspace.
pub type Result<T, E = PolicyError> = core::result::Result<T, E>;

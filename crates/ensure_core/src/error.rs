//! Error types for constraint evaluation.
//!
//! Two failure classes exist:
//!
//! - [`ConfigError`]: the constraint tree itself is wrong (unknown kind,
//!   runaway nesting, bad pattern). Always fatal, never accumulated.
//! - [`EnsureError::ValidationFailed`]: the parameters broke one or more
//!   constraints and the caller asked for a failure instead of an error map.

use thiserror::Error;

/// Result type for constraint tree operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors caused by a malformed constraint tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Leaf constraint name not present in the validator registry
    #[error("Unknown constraint '{0}' specified")]
    UnknownConstraint(String),

    /// Nesting of `object`/`each` constraints exceeds the configured limit
    #[error("Constraint tree exceeds maximum nesting depth of {limit}")]
    DepthExceeded {
        /// Configured limit
        limit: usize,
    },

    /// Pattern could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Structural constraint names cannot be registered as validators
    #[error("Constraint name '{0}' is reserved")]
    ReservedName(String),

    /// Options could not be decoded for a constraint kind
    #[error("Invalid options for constraint '{kind}': {reason}")]
    InvalidOptions {
        /// Constraint kind
        kind: String,
        /// Failure details
        reason: String,
    },
}

impl ConfigError {
    /// Creates a new unknown constraint error.
    pub fn unknown_constraint(name: impl Into<String>) -> Self {
        Self::UnknownConstraint(name.into())
    }

    /// Creates a new invalid options error.
    pub fn invalid_options(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error returned by validation entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnsureError {
    /// The constraint tree is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One or more constraints failed, messages in traversal order
    #[error("[400] {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}

impl EnsureError {
    /// Returns the failure messages, empty for configuration errors.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::ValidationFailed(messages) => messages,
            Self::Config(_) => &[],
        }
    }

    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

//! # Ensure Validator
//!
//! Validation engine for ensure constraint trees. This crate provides:
//!
//! - The validator registry and the built-in leaf validators
//! - A definition check that rejects malformed constraint trees up front
//! - The recursive traversal over `each`, `object` and `dependency`
//!   constraints
//! - Result formatting as an error map, a flat message list or an error
//!
//! ## Example
//!
//! ```rust
//! use ensure_core::{ConstraintSetBuilder, FieldBuilder};
//! use ensure_validator::{Engine, OutputMode, Outcome};
//! use serde_json::json;
//!
//! let constraints = ConstraintSetBuilder::new()
//!     .field(
//!         FieldBuilder::new("user")
//!             .object(
//!                 ConstraintSetBuilder::new()
//!                     .field(FieldBuilder::new("email").presence().email().build())
//!                     .build(),
//!             )
//!             .build(),
//!     )
//!     .build();
//!
//! let params = json!({ "user": { "email": "not-an-email" } }).into();
//! let outcome = Engine::new()
//!     .validate(&params, &constraints, OutputMode::Structured)
//!     .unwrap();
//!
//! match outcome {
//!     Outcome::Errors(errors) => {
//!         assert_eq!(errors.get("user.email").unwrap(), &["email is not a valid email"]);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod constraints;
mod engine;
mod formatter;
mod registry;
mod schema;
mod traverse;

pub use engine::*;
pub use formatter::*;
pub use registry::*;
pub use schema::*;

use ensure_core::{ConstraintSet, EnsureError, ParamValue};
use std::sync::LazyLock;

static DEFAULT_ENGINE: LazyLock<Engine> = LazyLock::new(Engine::new);

/// Validates with the built-in validators and default settings.
///
/// See [`Engine::validate`].
pub fn validate(
    params: &ParamValue,
    constraints: &ConstraintSet,
    mode: OutputMode,
) -> Result<Outcome, EnsureError> {
    DEFAULT_ENGINE.validate(params, constraints, mode)
}

/// Fails with `EnsureError::ValidationFailed` when any constraint fails.
///
/// See [`Engine::ensure`].
pub fn ensure(params: &ParamValue, constraints: &ConstraintSet) -> Result<(), EnsureError> {
    DEFAULT_ENGINE.ensure(params, constraints)
}

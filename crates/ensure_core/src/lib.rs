//! # Ensure Core
//!
//! Core data structures for the ensure declarative validation engine.
//!
//! Validation takes two read-only trees: the parameters (a nested request
//! payload) and a constraint tree naming the rules each field must satisfy.
//! This crate defines both trees, the property-path convention used to key
//! errors, the error sink, and the error taxonomy. The traversal engine and
//! the built-in validators live in `ensure_validator`.
//!
//! ## Key Concepts
//!
//! - **ParamValue**: the parameter tree; null and missing fields are the same
//!   absence marker
//! - **ConstraintSet**: field name → constraints, in declaration order
//! - **Constraint**: `Each`, `Object`, `Dependency` or a named `Leaf`
//! - **ErrorMap**: property path → messages, in discovery order
//!
//! ## Example
//!
//! ```rust
//! use ensure_core::{ConstraintSetBuilder, FieldBuilder, ParamValue};
//!
//! let constraints = ConstraintSetBuilder::new()
//!     .field(FieldBuilder::new("email").presence().email().build())
//!     .build();
//!
//! let params: ParamValue = serde_json::json!({ "email": "user@example.com" }).into();
//! assert_eq!(constraints.len(), 1);
//! assert!(params.field("email").is_defined());
//! ```

pub mod builder;
pub mod config;
pub mod constraint;
pub mod error;
pub mod error_map;
pub mod path;
pub mod report;
pub mod value;

pub use builder::*;
pub use config::*;
pub use constraint::*;
pub use error::{ConfigError, EnsureError};
pub use error_map::*;
pub use report::*;
pub use value::*;

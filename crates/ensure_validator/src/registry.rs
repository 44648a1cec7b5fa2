//! Validator registry.
//!
//! Maps leaf constraint names to validator capabilities. The registry is
//! built once, handed to an engine, and read-only afterwards, so engines can
//! be shared across threads.

use crate::constraints;
use ensure_core::{ConfigError, ConstraintOptions, ParamValue, DEPENDENCY, EACH, OBJECT};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A pure leaf validator.
///
/// Returns a message template when `value` violates the constraint. The
/// template may contain a `[var]` placeholder that is replaced by the field
/// label. Disabled constraints never reach a validator.
pub trait ValueValidator: Send + Sync {
    fn validate(&self, value: &ParamValue, options: &ConstraintOptions) -> Option<String>;
}

impl<F> ValueValidator for F
where
    F: Fn(&ParamValue, &ConstraintOptions) -> Option<String> + Send + Sync,
{
    fn validate(&self, value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
        self(value, options)
    }
}

/// Mapping from constraint name to validator.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn ValueValidator>>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in validators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for (name, validator) in constraints::BUILTINS {
            registry
                .validators
                .insert(name.to_string(), Arc::new(*validator));
        }
        registry
    }

    /// Registers a validator, replacing any previous one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReservedName` for `each`, `object` and
    /// `dependency`.
    pub fn register<V>(&mut self, name: impl Into<String>, validator: V) -> Result<(), ConfigError>
    where
        V: ValueValidator + 'static,
    {
        let name = name.into();
        if [EACH, OBJECT, DEPENDENCY].contains(&name.as_str()) {
            return Err(ConfigError::ReservedName(name));
        }

        self.validators.insert(name, Arc::new(validator));
        Ok(())
    }

    /// Registers a validator, builder style.
    pub fn with<V>(mut self, name: impl Into<String>, validator: V) -> Result<Self, ConfigError>
    where
        V: ValueValidator + 'static,
    {
        self.register(name, validator)?;
        Ok(self)
    }

    /// Looks up a validator by name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownConstraint` if nothing is registered
    /// under `name`.
    pub fn lookup(&self, name: &str) -> Result<&dyn ValueValidator, ConfigError> {
        self.validators
            .get(name)
            .map(|validator| validator.as_ref())
            .ok_or_else(|| ConfigError::unknown_constraint(name))
    }

    /// Returns true if a validator is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}

//! Main validation engine.
//!
//! This module provides the [`Engine`] that checks a constraint tree, walks
//! it against a parameter tree and formats the result.

use crate::{
    DefinitionSummary, OutputMode, Outcome, ValidatorRegistry, check_definition, format_errors,
    traverse::Traversal,
};
use ensure_core::{
    ConfigError, ConstraintSet, EngineConfig, EnsureError, ErrorMap, ParamValue, ValidationReport,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Validation engine.
///
/// Holds a read-only validator registry and the engine configuration. Each
/// call owns its own error map, so one engine can serve many threads.
///
/// # Example
///
/// ```rust
/// use ensure_core::{ConstraintSetBuilder, FieldBuilder};
/// use ensure_validator::Engine;
/// use serde_json::json;
///
/// let constraints = ConstraintSetBuilder::new()
///     .field(FieldBuilder::new("name").presence().string().build())
///     .build();
///
/// let engine = Engine::new();
/// let errors = engine
///     .check(&json!({ "name": 42 }).into(), &constraints)
///     .unwrap()
///     .unwrap();
///
/// assert_eq!(errors.get("name").unwrap(), &["name is not a string"]);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<ValidatorRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the built-in validators and default settings.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ValidatorRegistry::with_builtins()),
            config: EngineConfig::default(),
        }
    }

    /// Replaces the validator registry.
    pub fn with_registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replaces the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the validator registry.
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Checks a constraint tree without any data.
    ///
    /// Useful for rejecting a malformed tree before it is used.
    pub fn check_definition(
        &self,
        constraints: &ConstraintSet,
    ) -> Result<DefinitionSummary, ConfigError> {
        check_definition(constraints, &self.registry, self.config.max_depth)
    }

    /// Validates parameters and returns a report with statistics.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the constraint tree is malformed. No
    /// partial report is produced in that case.
    pub fn report(
        &self,
        params: &ParamValue,
        constraints: &ConstraintSet,
    ) -> Result<ValidationReport, ConfigError> {
        let start = Instant::now();
        self.check_definition(constraints)?;

        debug!(fields = constraints.len(), "Starting validation");
        let (errors, mut stats) = Traversal::new(&self.registry, &self.config)
            .run(params, constraints)?;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        debug!(
            failing_paths = errors.len(),
            messages = errors.message_count(),
            duration_ms = stats.duration_ms,
            "Validation finished"
        );
        Ok(ValidationReport::new(errors, stats))
    }

    /// Validates parameters and returns every error keyed by path.
    pub fn collect(
        &self,
        params: &ParamValue,
        constraints: &ConstraintSet,
    ) -> Result<ErrorMap, ConfigError> {
        Ok(self.report(params, constraints)?.errors)
    }

    /// Validates parameters and formats the result according to `mode`.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned in every mode. In
    /// [`OutputMode::Throwing`], failed constraints are returned as
    /// `EnsureError::ValidationFailed`.
    pub fn validate(
        &self,
        params: &ParamValue,
        constraints: &ConstraintSet,
        mode: OutputMode,
    ) -> Result<Outcome, EnsureError> {
        let errors = self.collect(params, constraints)?;
        format_errors(errors, mode, self.config.paths_in_messages)
    }

    /// Validates parameters, returning `None` when everything passed.
    pub fn check(
        &self,
        params: &ParamValue,
        constraints: &ConstraintSet,
    ) -> Result<Option<ErrorMap>, ConfigError> {
        Ok(self.collect(params, constraints)?.into_option())
    }

    /// Validates parameters and hands the flattened messages to `handler`.
    ///
    /// The handler is only called when at least one constraint failed.
    pub fn check_with<F>(
        &self,
        params: &ParamValue,
        constraints: &ConstraintSet,
        handler: F,
    ) -> Result<(), ConfigError>
    where
        F: FnOnce(Vec<String>),
    {
        let errors = self.collect(params, constraints)?;
        if !errors.is_empty() {
            handler(errors.flatten(self.config.paths_in_messages));
        }
        Ok(())
    }

    /// Validates parameters and fails when any constraint failed.
    pub fn ensure(
        &self,
        params: &ParamValue,
        constraints: &ConstraintSet,
    ) -> Result<(), EnsureError> {
        self.validate(params, constraints, OutputMode::Throwing)
            .map(|_| ())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensure_core::{ConstraintOptions, ConstraintSetBuilder, FieldBuilder};
    use serde_json::json;

    fn constraints() -> ConstraintSet {
        ConstraintSetBuilder::new()
            .field(FieldBuilder::new("name").presence().string().build())
            .field(
                FieldBuilder::new("age")
                    .numericality(ConstraintOptions::new().with_greater_than(17.0))
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_valid_params() {
        let engine = Engine::new();
        let params = json!({ "name": "Ada", "age": 36 }).into();

        assert_eq!(engine.check(&params, &constraints()).unwrap(), None);
        assert!(
            engine
                .validate(&params, &constraints(), OutputMode::Flattened)
                .unwrap()
                .is_valid()
        );
        assert!(engine.ensure(&params, &constraints()).is_ok());
    }

    #[test]
    fn test_report_stats() {
        let engine = Engine::new();
        let report = engine
            .report(&json!({ "age": 3 }).into(), &constraints())
            .unwrap();

        assert!(!report.passed);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.stats.fields_checked, 2);
        assert_eq!(report.stats.constraints_evaluated, 3);
    }

    #[test]
    fn test_check_with_only_called_on_failure() {
        let engine = Engine::new().with_config(EngineConfig::new().with_paths_in_messages(true));

        let mut seen = Vec::new();
        engine
            .check_with(&json!({ "name": "Ada" }).into(), &constraints(), |m| {
                seen = m
            })
            .unwrap();
        assert!(seen.is_empty());

        engine
            .check_with(&json!({ "age": 3 }).into(), &constraints(), |m| seen = m)
            .unwrap();
        assert_eq!(
            seen,
            vec![
                "name: name can't be blank".to_string(),
                "age: age is not greater than 17".to_string(),
            ]
        );
    }

    #[test]
    fn test_ensure_message() {
        let err = Engine::new()
            .ensure(&json!({ "age": 3 }).into(), &constraints())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "[400] name can't be blank; age is not greater than 17"
        );
        assert_eq!(err.messages().len(), 2);
    }
}

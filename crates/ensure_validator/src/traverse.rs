//! Constraint traversal.
//!
//! Walks a constraint tree against a parameter tree, dispatching structural
//! constraints (`each`, `object`, `dependency`) and leaf validators, and
//! records every failure in an [`ErrorMap`] keyed by property path.

use crate::ValidatorRegistry;
use ensure_core::path;
use ensure_core::{
    ConfigError, Constraint, ConstraintSet, DependencyContext, DependencyRule, EachRule,
    EngineConfig, ErrorMap, LeafConstraint, ParamValue, ValidationStats,
};
use tracing::trace;

/// State of one traversal. Owned by a single validation call.
pub(crate) struct Traversal<'a> {
    registry: &'a ValidatorRegistry,
    config: &'a EngineConfig,
    errors: ErrorMap,
    stats: ValidationStats,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(registry: &'a ValidatorRegistry, config: &'a EngineConfig) -> Self {
        Self {
            registry,
            config,
            errors: ErrorMap::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Runs the traversal from the root of both trees.
    pub(crate) fn run(
        mut self,
        params: &ParamValue,
        constraints: &ConstraintSet,
    ) -> Result<(ErrorMap, ValidationStats), ConfigError> {
        self.visit("", params, constraints, 0)?;
        Ok((self.errors, self.stats))
    }

    fn visit(
        &mut self,
        prefix: &str,
        node: &ParamValue,
        constraints: &ConstraintSet,
        depth: usize,
    ) -> Result<(), ConfigError> {
        if depth > self.config.max_depth {
            return Err(ConfigError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        for rule in constraints.iter() {
            let property_path = path::join(prefix, &rule.name);
            let value = node.field(&rule.name);
            self.stats.fields_checked += 1;

            for constraint in &rule.constraints {
                trace!(path = %property_path, kind = constraint.kind(), "Dispatching constraint");
                self.stats.constraints_evaluated += 1;

                match constraint {
                    Constraint::Each(each) => {
                        self.visit_each(&property_path, &rule.name, value, each, depth)?
                    }
                    Constraint::Object(nested) => {
                        self.visit_object(&property_path, &rule.name, value, nested, depth)?
                    }
                    Constraint::Dependency(rules) => {
                        self.check_dependencies(&property_path, &rule.name, value, node, rules)
                    }
                    Constraint::Leaf(leaf) => {
                        self.check_leaf(&property_path, &rule.name, value, leaf)?
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_each(
        &mut self,
        property_path: &str,
        name: &str,
        value: &ParamValue,
        each: &EachRule,
        depth: usize,
    ) -> Result<(), ConfigError> {
        if value.is_null() {
            return Ok(());
        }
        let Some(elements) = value.as_array() else {
            let label = self.label(name);
            self.errors
                .add(property_path, format!("{label} is not an array"));
            return Ok(());
        };

        for (i, element) in elements.iter().enumerate() {
            let element_path = path::index(property_path, i);
            match each {
                EachRule::Objects(nested) => {
                    self.visit(&element_path, element, nested, depth + 1)?
                }
                EachRule::Values(leaves) => {
                    self.stats.fields_checked += 1;
                    let label_source = path::index(name, i);
                    for leaf in leaves {
                        self.stats.constraints_evaluated += 1;
                        self.check_leaf(&element_path, &label_source, element, leaf)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_object(
        &mut self,
        property_path: &str,
        name: &str,
        value: &ParamValue,
        nested: &ConstraintSet,
        depth: usize,
    ) -> Result<(), ConfigError> {
        match value {
            ParamValue::Null => Ok(()),
            ParamValue::Object(_) => self.visit(property_path, value, nested, depth + 1),
            _ => {
                let label = self.label(name);
                self.errors
                    .add(property_path, format!("{label} is not an object"));
                Ok(())
            }
        }
    }

    // First failing rule wins; later rules are not evaluated.
    fn check_dependencies(
        &mut self,
        property_path: &str,
        name: &str,
        value: &ParamValue,
        node: &ParamValue,
        rules: &[DependencyRule],
    ) {
        let context = DependencyContext {
            field_value: value,
            all_fields: node,
        };

        let failed = rules.iter().find(|rule| {
            rule.test.as_ref().is_none_or(|test| test.eval(&context)) && !rule.ensure.eval(&context)
        });

        if let Some(rule) = failed {
            let message = match &rule.message {
                Some(message) => message.clone(),
                None => format!("{} dependency error", self.label(name)),
            };
            self.errors.add(property_path, message);
        }
    }

    fn check_leaf(
        &mut self,
        property_path: &str,
        label_source: &str,
        value: &ParamValue,
        leaf: &LeafConstraint,
    ) -> Result<(), ConfigError> {
        let validator = self.registry.lookup(&leaf.kind)?;
        let Some(options) = &leaf.options else {
            return Ok(());
        };

        if let Some(template) = validator.validate(value, options) {
            let message = template
                .replacen("[var]", &self.label(label_source), 1)
                .trim()
                .to_string();
            trace!(path = %property_path, kind = %leaf.kind, %message, "Constraint failed");
            self.errors.add(property_path, message);
        }
        Ok(())
    }

    fn label(&self, name: &str) -> String {
        self.config.label_style.render(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensure_core::{ConstraintSetBuilder, FieldBuilder, LabelStyle};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(params: serde_json::Value, constraints: &ConstraintSet) -> ErrorMap {
        let registry = ValidatorRegistry::with_builtins();
        let config = EngineConfig::default();
        Traversal::new(&registry, &config)
            .run(&params.into(), constraints)
            .unwrap()
            .0
    }

    #[test]
    fn test_messages_accumulate_per_path() {
        let constraints = ConstraintSetBuilder::new()
            .field(
                FieldBuilder::new("a")
                    .string()
                    .length(ensure_core::ConstraintOptions::new().with_minimum(3))
                    .build(),
            )
            .build();

        let errors = run(json!({ "a": 12 }), &constraints);
        // length passes on numbers, string does not
        assert_eq!(errors.get("a").unwrap(), &["a is not a string".to_string()]);
    }

    #[test]
    fn test_element_label_uses_index() {
        let constraints = ConstraintSetBuilder::new()
            .field(
                FieldBuilder::new("tags")
                    .each(vec![LeafConstraint::enabled("string")])
                    .build(),
            )
            .build();

        let errors = run(json!({ "tags": ["ok", 3] }), &constraints);
        assert_eq!(
            errors.get("tags[1]").unwrap(),
            &["tags[1] is not a string".to_string()]
        );
        assert!(!errors.contains("tags[0]"));
    }

    #[test]
    fn test_start_case_labels() {
        let constraints = ConstraintSetBuilder::new()
            .field(FieldBuilder::new("someVar").string().build())
            .build();
        let registry = ValidatorRegistry::with_builtins();
        let config = EngineConfig::default().with_label_style(LabelStyle::StartCase);

        let (errors, _) = Traversal::new(&registry, &config)
            .run(&json!({ "someVar": 1 }).into(), &constraints)
            .unwrap();
        assert_eq!(
            errors.get("someVar").unwrap(),
            &["Some Var is not a string".to_string()]
        );
    }

    #[test]
    fn test_stats_count_element_visits() {
        let constraints = ConstraintSetBuilder::new()
            .field(
                FieldBuilder::new("tags")
                    .each(vec![LeafConstraint::enabled("string")])
                    .build(),
            )
            .build();
        let registry = ValidatorRegistry::with_builtins();
        let config = EngineConfig::default();

        let (_, stats) = Traversal::new(&registry, &config)
            .run(&json!({ "tags": ["a", "b"] }).into(), &constraints)
            .unwrap();
        assert_eq!(stats.fields_checked, 3);
        assert_eq!(stats.constraints_evaluated, 3);
    }
}

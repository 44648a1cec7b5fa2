//! Builder pattern for creating constraint trees.
//!
//! This module provides ergonomic builders for constructing constraint sets
//! and their field rules with a fluent API.

use crate::{
    Comparator, Constraint, ConstraintOptions, ConstraintSet, DependencyRule, EachRule, FieldRule,
    LeafConstraint, ParamValue, Pattern,
};

/// Builder for creating a `ConstraintSet`.
///
/// # Example
///
/// ```rust
/// use ensure_core::{ConstraintSetBuilder, FieldBuilder};
///
/// let constraints = ConstraintSetBuilder::new()
///     .field(FieldBuilder::new("name").presence().string().build())
///     .field(
///         FieldBuilder::new("address")
///             .object(
///                 ConstraintSetBuilder::new()
///                     .field(FieldBuilder::new("city").string().build())
///                     .build(),
///             )
///             .build(),
///     )
///     .build();
///
/// assert_eq!(constraints.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ConstraintSetBuilder {
    fields: Vec<FieldRule>,
}

impl ConstraintSetBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field rule.
    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Adds multiple field rules.
    pub fn fields(mut self, rules: Vec<FieldRule>) -> Self {
        self.fields.extend(rules);
        self
    }

    /// Builds the constraint set.
    pub fn build(self) -> ConstraintSet {
        ConstraintSet {
            fields: self.fields,
        }
    }
}

/// Builder for creating a `FieldRule`.
///
/// Constraints are applied in the order the builder methods are called.
///
/// # Example
///
/// ```rust
/// use ensure_core::{ConstraintOptions, FieldBuilder};
///
/// let rule = FieldBuilder::new("age")
///     .presence()
///     .numericality(ConstraintOptions::new().with_only_integer(true))
///     .build();
///
/// assert_eq!(rule.constraints.len(), 2);
/// ```
#[derive(Debug)]
pub struct FieldBuilder {
    rule: FieldRule,
}

impl FieldBuilder {
    /// Creates a new field builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            rule: FieldRule::new(name),
        }
    }

    /// Adds a leaf constraint.
    pub fn leaf(mut self, leaf: LeafConstraint) -> Self {
        self.rule.constraints.push(Constraint::Leaf(leaf));
        self
    }

    /// Adds an enabled leaf constraint with options.
    pub fn constraint(self, kind: impl Into<String>, options: ConstraintOptions) -> Self {
        self.leaf(LeafConstraint::new(kind, options))
    }

    /// Adds an enabled leaf constraint with default options.
    pub fn enable(self, kind: impl Into<String>) -> Self {
        self.leaf(LeafConstraint::enabled(kind))
    }

    /// Adds a disabled leaf constraint.
    pub fn disable(self, kind: impl Into<String>) -> Self {
        self.leaf(LeafConstraint::disabled(kind))
    }

    pub fn string(self) -> Self {
        self.enable("string")
    }

    pub fn number(self) -> Self {
        self.enable("number")
    }

    pub fn presence(self) -> Self {
        self.enable("presence")
    }

    pub fn bool(self) -> Self {
        self.enable("bool")
    }

    pub fn array(self) -> Self {
        self.enable("array")
    }

    pub fn date(self) -> Self {
        self.enable("date")
    }

    pub fn uuid(self) -> Self {
        self.enable("uuid")
    }

    pub fn email(self) -> Self {
        self.enable("email")
    }

    pub fn url(self) -> Self {
        self.enable("url")
    }

    /// Adds an `inclusion` constraint over the given values.
    pub fn inclusion<T: Into<ParamValue>>(self, values: impl IntoIterator<Item = T>) -> Self {
        self.constraint("inclusion", ConstraintOptions::within(values))
    }

    /// Adds a `format` constraint.
    pub fn format(self, pattern: Pattern) -> Self {
        self.constraint("format", ConstraintOptions::pattern(pattern))
    }

    /// Adds a `length` constraint.
    pub fn length(self, options: ConstraintOptions) -> Self {
        self.constraint("length", options)
    }

    /// Adds a `numericality` constraint.
    pub fn numericality(self, options: ConstraintOptions) -> Self {
        self.constraint("numericality", options)
    }

    /// Adds an `ordered` constraint.
    pub fn ordered(self, comparator: Comparator) -> Self {
        self.constraint("ordered", ConstraintOptions::comparator(comparator))
    }

    /// Adds a nested-record constraint.
    pub fn object(mut self, nested: ConstraintSet) -> Self {
        self.rule.constraints.push(Constraint::Object(nested));
        self
    }

    /// Adds an `each` constraint whose elements are records.
    pub fn each_object(mut self, nested: ConstraintSet) -> Self {
        self.rule
            .constraints
            .push(Constraint::Each(EachRule::Objects(nested)));
        self
    }

    /// Adds an `each` constraint applying leaf constraints to every element.
    pub fn each(mut self, leaves: Vec<LeafConstraint>) -> Self {
        self.rule
            .constraints
            .push(Constraint::Each(EachRule::Values(leaves)));
        self
    }

    /// Adds a dependency rule.
    ///
    /// Repeated calls extend the same rule list, so the field still reports
    /// at most one dependency error.
    pub fn dependency(mut self, rule: DependencyRule) -> Self {
        let existing = self.rule.constraints.iter_mut().find_map(|c| match c {
            Constraint::Dependency(rules) => Some(rules),
            _ => None,
        });

        match existing {
            Some(rules) => rules.push(rule),
            None => self
                .rule
                .constraints
                .push(Constraint::Dependency(vec![rule])),
        }
        self
    }

    /// Builds the field rule.
    pub fn build(self) -> FieldRule {
        self.rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_order_is_call_order() {
        let rule = FieldBuilder::new("a").presence().string().disable("email").build();
        let kinds: Vec<&str> = rule.constraints.iter().map(Constraint::kind).collect();
        assert_eq!(kinds, vec!["presence", "string", "email"]);
    }

    #[test]
    fn test_dependency_rules_share_one_constraint() {
        let rule = FieldBuilder::new("a")
            .string()
            .dependency(DependencyRule::ensure(|_| true))
            .dependency(DependencyRule::ensure(|_| false).with_message("second"))
            .build();

        assert_eq!(rule.constraints.len(), 2);
        match &rule.constraints[1] {
            Constraint::Dependency(rules) => assert_eq!(rules.len(), 2),
            other => panic!("expected dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_sets() {
        let set = ConstraintSetBuilder::new()
            .field(
                FieldBuilder::new("items")
                    .each_object(
                        ConstraintSetBuilder::new()
                            .field(FieldBuilder::new("id").uuid().build())
                            .build(),
                    )
                    .build(),
            )
            .field(
                FieldBuilder::new("tags")
                    .each(vec![LeafConstraint::enabled("string")])
                    .build(),
            )
            .build();

        assert_eq!(set.len(), 2);
        assert!(matches!(
            set.get("items").unwrap().constraints[0],
            Constraint::Each(EachRule::Objects(_))
        ));
        assert!(matches!(
            set.get("tags").unwrap().constraints[0],
            Constraint::Each(EachRule::Values(_))
        ));
    }
}

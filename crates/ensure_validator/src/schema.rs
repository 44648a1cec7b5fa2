//! Constraint definition checks.
//!
//! Walks a constraint tree once, without any data, so configuration mistakes
//! surface before traversal starts and never alongside partial results.

use crate::ValidatorRegistry;
use ensure_core::{ConfigError, Constraint, ConstraintSet, EachRule, LeafConstraint};
use std::collections::BTreeSet;

/// Shape of a constraint tree that passed the definition check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionSummary {
    /// Field rules across all nesting levels
    pub fields: usize,
    /// Constraints across all nesting levels, structural ones included
    pub constraints: usize,
    /// Deepest `object`/`each` nesting reached
    pub max_depth: usize,
    /// Every constraint kind referenced
    pub kinds: BTreeSet<String>,
}

/// Checks that every leaf kind resolves and that nesting stays within
/// `max_depth`.
///
/// # Errors
///
/// Returns `ConfigError::UnknownConstraint` for the first unregistered kind
/// in declaration order, or `ConfigError::DepthExceeded`.
pub fn check_definition(
    constraints: &ConstraintSet,
    registry: &ValidatorRegistry,
    max_depth: usize,
) -> Result<DefinitionSummary, ConfigError> {
    let mut checker = DefinitionChecker {
        registry,
        limit: max_depth,
        summary: DefinitionSummary::default(),
    };
    checker.visit_set(constraints, 0)?;
    Ok(checker.summary)
}

struct DefinitionChecker<'a> {
    registry: &'a ValidatorRegistry,
    limit: usize,
    summary: DefinitionSummary,
}

impl DefinitionChecker<'_> {
    fn visit_set(&mut self, set: &ConstraintSet, depth: usize) -> Result<(), ConfigError> {
        if depth > self.limit {
            return Err(ConfigError::DepthExceeded { limit: self.limit });
        }
        self.summary.max_depth = self.summary.max_depth.max(depth);

        for rule in set.iter() {
            self.summary.fields += 1;
            for constraint in &rule.constraints {
                self.summary.constraints += 1;
                self.summary.kinds.insert(constraint.kind().to_string());

                match constraint {
                    Constraint::Object(nested) => self.visit_set(nested, depth + 1)?,
                    Constraint::Each(EachRule::Objects(nested)) => {
                        self.visit_set(nested, depth + 1)?
                    }
                    Constraint::Each(EachRule::Values(leaves)) => {
                        for leaf in leaves {
                            self.summary.constraints += 1;
                            self.visit_leaf(leaf)?;
                        }
                    }
                    Constraint::Dependency(_) => {}
                    Constraint::Leaf(leaf) => self.visit_leaf(leaf)?,
                }
            }
        }
        Ok(())
    }

    fn visit_leaf(&mut self, leaf: &LeafConstraint) -> Result<(), ConfigError> {
        self.registry.lookup(&leaf.kind)?;
        self.summary.kinds.insert(leaf.kind.clone());
        Ok(())
    }
}

//! Constraint tree types.
//!
//! A constraint tree maps field names to the constraints applied to them.
//! Constraint kinds come in two classes:
//!
//! - **Structural**: `each`, `object` and `dependency` drive recursion or
//!   cross-field logic.
//! - **Leaf**: any name resolvable in a validator registry (`string`,
//!   `presence`, `numericality`, ...).
//!
//! The tree is decoded once into the tagged [`Constraint`] variant so the
//! traversal engine never branches on reserved key names.

use crate::{ConfigError, ParamValue};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Name of the elementwise structural constraint.
pub const EACH: &str = "each";
/// Name of the nested-record structural constraint.
pub const OBJECT: &str = "object";
/// Name of the cross-field structural constraint.
pub const DEPENDENCY: &str = "dependency";

/// Ordered set of field rules at one nesting level.
///
/// Declaration order is preserved and drives traversal order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    /// Field rules in declaration order
    pub fields: Vec<FieldRule>,
}

impl ConstraintSet {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of fields declared at this level.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up the rule declared for a field.
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    /// Appends a field rule.
    pub fn push(&mut self, rule: FieldRule) {
        self.fields.push(rule);
    }

    /// Returns an iterator over the field rules.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.fields.iter()
    }
}

impl FromIterator<FieldRule> for ConstraintSet {
    fn from_iter<T: IntoIterator<Item = FieldRule>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Constraints declared for a single field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Field name
    pub name: String,
    /// Constraints in declaration order
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    /// Creates a field rule without constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }
}

/// A constraint applied to one field.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Field holds a sequence validated elementwise
    Each(EachRule),
    /// Field holds a nested record
    Object(ConstraintSet),
    /// Cross-field conditional rules, first failure wins
    Dependency(Vec<DependencyRule>),
    /// Directly evaluable validator rule
    Leaf(LeafConstraint),
}

impl Constraint {
    /// Returns the constraint-kind name as written in a constraint tree.
    pub fn kind(&self) -> &str {
        match self {
            Constraint::Each(_) => EACH,
            Constraint::Object(_) => OBJECT,
            Constraint::Dependency(_) => DEPENDENCY,
            Constraint::Leaf(leaf) => &leaf.kind,
        }
    }
}

/// Sub-constraints of an `each` constraint.
#[derive(Debug, Clone)]
pub enum EachRule {
    /// Every element is a record traversed with the nested set
    Objects(ConstraintSet),
    /// Leaf constraints applied directly to every element
    Values(Vec<LeafConstraint>),
}

/// A named leaf constraint and its options.
#[derive(Debug, Clone)]
pub struct LeafConstraint {
    /// Registry name of the validator
    pub kind: String,
    /// `None` when the constraint is disabled
    pub options: Option<ConstraintOptions>,
}

impl LeafConstraint {
    /// Creates an enabled constraint.
    pub fn new(kind: impl Into<String>, options: ConstraintOptions) -> Self {
        Self {
            kind: kind.into(),
            options: Some(options),
        }
    }

    /// Creates an enabled constraint with default options.
    pub fn enabled(kind: impl Into<String>) -> Self {
        Self::new(kind, ConstraintOptions::default())
    }

    /// Creates a disabled constraint. It never produces an error.
    pub fn disabled(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: None,
        }
    }

    /// Returns true unless the constraint was declared with `false`.
    pub fn is_enabled(&self) -> bool {
        self.options.is_some()
    }
}

/// Configuration record for leaf constraints.
///
/// Every validator reads only the keys relevant to it. Unset keys are
/// `None`, which is distinct from a key explicitly set to a value.
#[derive(Debug, Clone, Default)]
pub struct ConstraintOptions {
    /// Replaces the validator's default message
    pub message: Option<String>,
    /// Pattern for `format` and `numericality`
    pub pattern: Option<Pattern>,
    /// Minimum length
    pub minimum: Option<usize>,
    /// Maximum length
    pub maximum: Option<usize>,
    /// Exact length
    pub exactly: Option<usize>,
    /// Allowed values for `inclusion`
    pub within: Option<Vec<ParamValue>>,
    /// Exclusive lower bound
    pub greater_than: Option<f64>,
    /// Inclusive lower bound
    pub greater_than_or_equal_to: Option<f64>,
    /// Exclusive upper bound
    pub less_than: Option<f64>,
    /// Inclusive upper bound
    pub less_than_or_equal_to: Option<f64>,
    /// Rejects numbers with a fractional part
    pub only_integer: bool,
    /// `presence` also rejects `""` and empty sequences
    pub disallow_empty: bool,
    /// Adjacent-pair predicate for `ordered`
    pub comparator: Option<Comparator>,
    pub too_short: Option<String>,
    pub too_long: Option<String>,
    pub wrong_length: Option<String>,
    pub not_an_integer: Option<String>,
    pub not_greater_than: Option<String>,
    pub not_greater_than_or_equal_to: Option<String>,
    pub not_less_than: Option<String>,
    pub not_less_than_or_equal_to: Option<String>,
    pub wrong_format: Option<String>,
    /// Keys not recognised by the built-in validators
    pub extra: BTreeMap<String, ParamValue>,
}

impl ConstraintOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with only an allowed-values list (`inclusion: [..]`).
    pub fn within<T: Into<ParamValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            within: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Options with only a pattern (`format: '\d'`).
    pub fn pattern(pattern: Pattern) -> Self {
        Self {
            pattern: Some(pattern),
            ..Self::default()
        }
    }

    /// Options with only a comparator (`ordered: fn`).
    pub fn comparator(comparator: Comparator) -> Self {
        Self {
            comparator: Some(comparator),
            ..Self::default()
        }
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the minimum length.
    pub fn with_minimum(mut self, minimum: usize) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the maximum length.
    pub fn with_maximum(mut self, maximum: usize) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Sets the exact length.
    pub fn with_exactly(mut self, exactly: usize) -> Self {
        self.exactly = Some(exactly);
        self
    }

    /// Sets the exclusive lower bound.
    pub fn with_greater_than(mut self, bound: f64) -> Self {
        self.greater_than = Some(bound);
        self
    }

    /// Sets the inclusive lower bound.
    pub fn with_greater_than_or_equal_to(mut self, bound: f64) -> Self {
        self.greater_than_or_equal_to = Some(bound);
        self
    }

    /// Sets the exclusive upper bound.
    pub fn with_less_than(mut self, bound: f64) -> Self {
        self.less_than = Some(bound);
        self
    }

    /// Sets the inclusive upper bound.
    pub fn with_less_than_or_equal_to(mut self, bound: f64) -> Self {
        self.less_than_or_equal_to = Some(bound);
        self
    }

    /// Requires integral numbers.
    pub fn with_only_integer(mut self, only_integer: bool) -> Self {
        self.only_integer = only_integer;
        self
    }

    /// Rejects empty strings and sequences in `presence`.
    pub fn with_disallow_empty(mut self, disallow_empty: bool) -> Self {
        self.disallow_empty = disallow_empty;
        self
    }

    /// Sets the pattern.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets the comparator.
    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Stores a key for custom validators.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Picks the message for a failed sub-condition.
    ///
    /// An explicit `message` always wins, then the sub-condition override,
    /// then the validator default.
    pub fn message_or(&self, specific: Option<&String>, default: impl Into<String>) -> String {
        self.message
            .as_ref()
            .or(specific)
            .cloned()
            .unwrap_or_else(|| default.into())
    }
}

/// A compiled regular expression used by pattern-based validators.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a source string anchored at both ends.
    ///
    /// `flags` follow the JavaScript spelling: `i` (case-insensitive), `m`
    /// (multi-line), `s` (dot matches newline). `g`, `y` and `u` have no
    /// effect on a whole-value test and are accepted.
    pub fn anchored(source: &str, flags: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = RegexBuilder::new(&format!("^(?:{source})$"));
        for flag in flags.unwrap_or_default().chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'g' | 'y' | 'u' => {}
                other => {
                    return Err(ConfigError::InvalidPattern {
                        pattern: source.to_string(),
                        reason: format!("unsupported flag '{other}'"),
                    });
                }
            }
        }

        let regex = builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Wraps a caller-compiled regex. It is used as-is, without anchoring.
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
        }
    }

    /// Returns the pattern source as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tests a string against the pattern.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.regex.as_str()).finish()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self::from_regex(regex)
    }
}

type CompareFn = dyn Fn(&ParamValue, &ParamValue) -> bool + Send + Sync;

/// Two-argument predicate checked on every adjacent pair by `ordered`.
#[derive(Clone)]
pub struct Comparator {
    name: String,
    compare: Arc<CompareFn>,
}

impl Comparator {
    /// Wraps a caller-supplied comparator.
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(&ParamValue, &ParamValue) -> bool + Send + Sync + 'static,
    {
        Self::named("custom", compare)
    }

    /// Wraps a comparator under a display name.
    pub fn named<F>(name: impl Into<String>, compare: F) -> Self
    where
        F: Fn(&ParamValue, &ParamValue) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            compare: Arc::new(compare),
        }
    }

    /// Resolves one of the built-in named comparators.
    ///
    /// Numbers compare numerically, strings lexically; mixed or non-scalar
    /// pairs never satisfy a built-in comparator.
    pub fn by_name(name: &str) -> Option<Self> {
        let accept: fn(Ordering) -> bool = match name {
            "ascending" => Ordering::is_le,
            "descending" => Ordering::is_ge,
            "strictly_ascending" | "strictlyAscending" => Ordering::is_lt,
            "strictly_descending" | "strictlyDescending" => Ordering::is_gt,
            _ => return None,
        };

        Some(Self::named(name, move |a, b| {
            compare_scalars(a, b).is_some_and(accept)
        }))
    }

    /// Returns the comparator's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the comparator to an adjacent pair.
    pub fn holds(&self, left: &ParamValue, right: &ParamValue) -> bool {
        (self.compare)(left, right)
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Comparator").field(&self.name).finish()
    }
}

fn compare_scalars(a: &ParamValue, b: &ParamValue) -> Option<Ordering> {
    match (a, b) {
        (ParamValue::String(x), ParamValue::String(y)) => Some(x.cmp(y)),
        (ParamValue::Date(x), ParamValue::Date(y)) => Some(x.cmp(y)),
        _ => a.as_number()?.partial_cmp(&b.as_number()?),
    }
}

/// Arguments handed to dependency predicates.
///
/// Both `test` and `ensure` receive the same named pair, so there is no
/// positional ambiguity between the field's own value and its siblings.
#[derive(Debug, Clone, Copy)]
pub struct DependencyContext<'a> {
    /// Value of the field the rule is declared on
    pub field_value: &'a ParamValue,
    /// The record that contains the field
    pub all_fields: &'a ParamValue,
}

type PredicateFn = dyn Fn(&DependencyContext<'_>) -> bool + Send + Sync;

/// Opaque predicate over a [`DependencyContext`].
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wraps a caller-supplied predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&DependencyContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Evaluates the predicate.
    pub fn eval(&self, context: &DependencyContext<'_>) -> bool {
        (self.0)(context)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A conditional cross-field rule.
///
/// When `test` is absent or holds, `ensure` must hold; otherwise one error
/// (`message` or a generic one) is recorded for the field.
#[derive(Debug, Clone)]
pub struct DependencyRule {
    pub test: Option<Predicate>,
    pub ensure: Predicate,
    pub message: Option<String>,
}

impl DependencyRule {
    /// Creates an unconditional rule.
    pub fn ensure<F>(ensure: F) -> Self
    where
        F: Fn(&DependencyContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            test: None,
            ensure: Predicate::new(ensure),
            message: None,
        }
    }

    /// Adds the guard predicate.
    pub fn when<F>(mut self, test: F) -> Self
    where
        F: Fn(&DependencyContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.test = Some(Predicate::new(test));
        self
    }

    /// Sets the message recorded on failure.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_pattern() {
        let pattern = Pattern::anchored(r"\d", None).unwrap();
        assert!(pattern.is_match("1"));
        assert!(!pattern.is_match("1a"));
        assert!(!pattern.is_match(""));
    }

    #[test]
    fn test_pattern_flags() {
        let strict = Pattern::anchored("a", None).unwrap();
        assert!(!strict.is_match("A"));

        let relaxed = Pattern::anchored("a", Some("i")).unwrap();
        assert!(relaxed.is_match("A"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let pattern = Pattern::anchored("a|b", None).unwrap();
        assert!(pattern.is_match("a"));
        assert!(!pattern.is_match("ab"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::anchored("[invalid(regex", None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));

        let err = Pattern::anchored("a", Some("q")).unwrap_err();
        assert!(err.to_string().contains("unsupported flag 'q'"));
    }

    #[test]
    fn test_regex_pattern_is_not_anchored() {
        let pattern = Pattern::from(Regex::new(r"\d").unwrap());
        assert!(pattern.is_match("a1b"));
    }

    #[test]
    fn test_named_comparators() {
        let asc = Comparator::by_name("ascending").unwrap();
        assert!(asc.holds(&ParamValue::Int(1), &ParamValue::Int(1)));
        assert!(asc.holds(&ParamValue::Int(1), &ParamValue::Float(1.5)));
        assert!(!asc.holds(&ParamValue::Int(2), &ParamValue::Int(1)));

        let strict = Comparator::by_name("strictly_ascending").unwrap();
        assert!(!strict.holds(&ParamValue::Int(1), &ParamValue::Int(1)));

        let desc = Comparator::by_name("descending").unwrap();
        assert!(desc.holds(&ParamValue::from("b"), &ParamValue::from("a")));
        assert!(!desc.holds(&ParamValue::from("b"), &ParamValue::Int(1)));

        assert!(Comparator::by_name("sideways").is_none());
    }

    #[test]
    fn test_message_priority() {
        let options = ConstraintOptions::new();
        let specific = Some("too short!".to_string());
        assert_eq!(options.message_or(specific.as_ref(), "default"), "too short!");
        assert_eq!(options.message_or(None, "default"), "default");

        let options = ConstraintOptions::new().with_message("custom");
        assert_eq!(options.message_or(specific.as_ref(), "default"), "custom");
    }

    #[test]
    fn test_constraint_kind_names() {
        assert_eq!(Constraint::Object(ConstraintSet::new()).kind(), "object");
        assert_eq!(
            Constraint::Each(EachRule::Values(Vec::new())).kind(),
            "each"
        );
        assert_eq!(
            Constraint::Leaf(LeafConstraint::enabled("string")).kind(),
            "string"
        );
    }
}

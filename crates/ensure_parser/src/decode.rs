//! Decoding of constraint and parameter documents.
//!
//! Documents are read into `serde_json::Value` with key order preserved, then
//! turned into the typed constraint tree. Key order becomes declaration
//! order.

use chrono::DateTime;
use ensure_core::{
    Comparator, ConfigError, Constraint, ConstraintOptions, ConstraintSet, DEPENDENCY, EACH,
    EachRule, FieldRule, LeafConstraint, OBJECT, ParamValue, Pattern,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Decodes a constraint document: field name → constraint kind → options.
///
/// # Errors
///
/// Returns `ConfigError::InvalidOptions` when the document does not have the
/// expected shape or an option has the wrong type, `ConfigError::InvalidPattern`
/// when a pattern does not compile.
pub fn decode_constraints(document: &Value) -> Result<ConstraintSet, ConfigError> {
    let Value::Object(fields) = document else {
        return Err(ConfigError::invalid_options(
            OBJECT,
            "a constraint document must map field names to constraints",
        ));
    };

    fields
        .iter()
        .map(|(name, kinds)| decode_field(name, kinds))
        .collect()
}

fn decode_field(name: &str, kinds: &Value) -> Result<FieldRule, ConfigError> {
    let Value::Object(kinds) = kinds else {
        return Err(ConfigError::invalid_options(
            name,
            "a field must map constraint names to options",
        ));
    };

    let mut rule = FieldRule::new(name);
    for (kind, options) in kinds {
        if let Some(constraint) = decode_constraint(name, kind, options)? {
            rule.constraints.push(constraint);
        }
    }
    Ok(rule)
}

// `None` for a disabled structural constraint.
fn decode_constraint(
    field: &str,
    kind: &str,
    options: &Value,
) -> Result<Option<Constraint>, ConfigError> {
    match kind {
        EACH => decode_each(field, options),
        OBJECT => match options {
            Value::Null | Value::Bool(false) => Ok(None),
            nested @ Value::Object(_) => Ok(Some(Constraint::Object(decode_constraints(nested)?))),
            _ => Err(ConfigError::invalid_options(
                OBJECT,
                "expected a nested constraint document",
            )),
        },
        DEPENDENCY => Err(ConfigError::invalid_options(
            DEPENDENCY,
            "dependency rules need predicates and can only be built in code",
        )),
        _ => Ok(Some(Constraint::Leaf(decode_leaf(kind, options)?))),
    }
}

fn decode_each(field: &str, options: &Value) -> Result<Option<Constraint>, ConfigError> {
    let sub = match options {
        Value::Null | Value::Bool(false) => return Ok(None),
        Value::Object(sub) => sub,
        _ => {
            return Err(ConfigError::invalid_options(
                EACH,
                "expected a mapping of constraints applied to every element",
            ));
        }
    };

    if let Some(nested) = sub.get(OBJECT) {
        let ignored: Vec<&str> = sub
            .keys()
            .map(String::as_str)
            .filter(|key| *key != OBJECT)
            .collect();
        if !ignored.is_empty() {
            warn!(field, ?ignored, "Ignoring element constraints next to 'object' in 'each'");
        }

        return match nested {
            Value::Object(_) => Ok(Some(Constraint::Each(EachRule::Objects(
                decode_constraints(nested)?,
            )))),
            _ => Err(ConfigError::invalid_options(
                OBJECT,
                "expected a nested constraint document",
            )),
        };
    }

    let leaves = sub
        .iter()
        .map(|(kind, options)| match kind.as_str() {
            EACH | DEPENDENCY => Err(ConfigError::invalid_options(
                kind.as_str(),
                "cannot be applied to sequence elements",
            )),
            _ => decode_leaf(kind, options),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Constraint::Each(EachRule::Values(leaves))))
}

/// Decodes the options of a leaf constraint.
///
/// Shorthands: `false`/`null` disable the constraint, `true` enables it with
/// defaults, a sequence is the `within` list, a string is the pattern (or the
/// comparator name for `ordered`) and a number is the exact `length`.
pub fn decode_leaf(kind: &str, options: &Value) -> Result<LeafConstraint, ConfigError> {
    let options = match options {
        Value::Null | Value::Bool(false) => return Ok(LeafConstraint::disabled(kind)),
        Value::Bool(true) => ConstraintOptions::new(),
        Value::Array(values) => ConstraintOptions::within(values.iter().cloned().map(ParamValue::from)),
        Value::String(name) if kind == "ordered" => {
            ConstraintOptions::comparator(named_comparator(name)?)
        }
        Value::String(source) => ConstraintOptions::pattern(Pattern::anchored(source, None)?),
        Value::Number(_) if kind == "length" => {
            ConstraintOptions::new().with_exactly(as_usize(kind, "exactly", options)?)
        }
        Value::Number(_) => {
            return Err(ConfigError::invalid_options(
                kind,
                "a bare number is only accepted for 'length'",
            ));
        }
        Value::Object(map) => decode_options(kind, map)?,
    };

    Ok(LeafConstraint::new(kind, options))
}

fn decode_options(kind: &str, map: &Map<String, Value>) -> Result<ConstraintOptions, ConfigError> {
    let mut options = ConstraintOptions::new();
    let mut flags = None;

    for (key, value) in map {
        match key.as_str() {
            "message" => options.message = Some(as_string(kind, key, value)?),
            "pattern" => {}
            "flags" => flags = Some(as_string(kind, key, value)?),
            "minimum" => options.minimum = Some(as_usize(kind, key, value)?),
            "maximum" => options.maximum = Some(as_usize(kind, key, value)?),
            "exactly" => options.exactly = Some(as_usize(kind, key, value)?),
            "within" => match value {
                Value::Array(values) => {
                    options.within = Some(values.iter().cloned().map(ParamValue::from).collect())
                }
                _ => return Err(ConfigError::invalid_options(kind, "'within' must be a list")),
            },
            "greaterThan" | "greater_than" => {
                options.greater_than = Some(as_f64(kind, key, value)?)
            }
            "greaterThanOrEqualTo" | "greater_than_or_equal_to" => {
                options.greater_than_or_equal_to = Some(as_f64(kind, key, value)?)
            }
            "lessThan" | "less_than" => options.less_than = Some(as_f64(kind, key, value)?),
            "lessThanOrEqualTo" | "less_than_or_equal_to" => {
                options.less_than_or_equal_to = Some(as_f64(kind, key, value)?)
            }
            "onlyInteger" | "only_integer" => options.only_integer = as_bool(kind, key, value)?,
            "disallowEmpty" | "disallow_empty" => {
                options.disallow_empty = as_bool(kind, key, value)?
            }
            "comparator" => {
                options.comparator = Some(named_comparator(&as_string(kind, key, value)?)?)
            }
            "tooShort" | "too_short" => options.too_short = Some(as_string(kind, key, value)?),
            "tooLong" | "too_long" => options.too_long = Some(as_string(kind, key, value)?),
            "wrongLength" | "wrong_length" => {
                options.wrong_length = Some(as_string(kind, key, value)?)
            }
            "notAnInteger" | "not_an_integer" => {
                options.not_an_integer = Some(as_string(kind, key, value)?)
            }
            "notGreaterThan" | "not_greater_than" => {
                options.not_greater_than = Some(as_string(kind, key, value)?)
            }
            "notGreaterThanOrEqualTo" | "not_greater_than_or_equal_to" => {
                options.not_greater_than_or_equal_to = Some(as_string(kind, key, value)?)
            }
            "notLessThan" | "not_less_than" => {
                options.not_less_than = Some(as_string(kind, key, value)?)
            }
            "notLessThanOrEqualTo" | "not_less_than_or_equal_to" => {
                options.not_less_than_or_equal_to = Some(as_string(kind, key, value)?)
            }
            "wrongFormat" | "wrong_format" => {
                options.wrong_format = Some(as_string(kind, key, value)?)
            }
            _ => {
                options.extra.insert(key.clone(), ParamValue::from(value.clone()));
            }
        }
    }

    match map.get("pattern") {
        Some(pattern) => {
            let source = as_string(kind, "pattern", pattern)?;
            options.pattern = Some(Pattern::anchored(&source, flags.as_deref())?);
        }
        None if flags.is_some() => {
            return Err(ConfigError::invalid_options(kind, "'flags' given without a 'pattern'"));
        }
        None => {}
    }

    Ok(options)
}

fn named_comparator(name: &str) -> Result<Comparator, ConfigError> {
    Comparator::by_name(name).ok_or_else(|| {
        ConfigError::invalid_options("ordered", format!("unknown comparator '{name}'"))
    })
}

fn as_string(kind: &str, key: &str, value: &Value) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::invalid_options(kind, format!("'{key}' must be a string")))
}

fn as_usize(kind: &str, key: &str, value: &Value) -> Result<usize, ConfigError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            ConfigError::invalid_options(kind, format!("'{key}' must be a non-negative integer"))
        })
}

fn as_f64(kind: &str, key: &str, value: &Value) -> Result<f64, ConfigError> {
    value
        .as_f64()
        .ok_or_else(|| ConfigError::invalid_options(kind, format!("'{key}' must be a number")))
}

fn as_bool(kind: &str, key: &str, value: &Value) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| ConfigError::invalid_options(kind, format!("'{key}' must be a boolean")))
}

/// Converts a TOML value into a parameter value.
///
/// Offset datetimes become dates; local dates and times keep their text.
pub fn toml_to_param(value: toml::Value) -> ParamValue {
    match value {
        toml::Value::String(s) => ParamValue::String(s),
        toml::Value::Integer(i) => ParamValue::Int(i),
        toml::Value::Float(f) => ParamValue::Float(f),
        toml::Value::Boolean(b) => ParamValue::Bool(b),
        toml::Value::Datetime(datetime) => {
            let text = datetime.to_string();
            match DateTime::parse_from_rfc3339(&text) {
                Ok(date) => ParamValue::Date(date),
                Err(_) => ParamValue::String(text),
            }
        }
        toml::Value::Array(items) => {
            ParamValue::Array(items.into_iter().map(toml_to_param).collect())
        }
        toml::Value::Table(table) => table
            .into_iter()
            .map(|(key, value)| (key, toml_to_param(value)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(kind: &str, options: Value) -> LeafConstraint {
        decode_leaf(kind, &options).unwrap()
    }

    #[test]
    fn test_leaf_shorthands() {
        assert!(!leaf("string", json!(false)).is_enabled());
        assert!(!leaf("string", json!(null)).is_enabled());
        assert!(leaf("string", json!(true)).is_enabled());

        let inclusion = leaf("inclusion", json!(["a", 1]));
        let within = inclusion.options.unwrap().within.unwrap();
        assert_eq!(within, vec![ParamValue::from("a"), ParamValue::Int(1)]);

        let format = leaf("format", json!("[a-z]+"));
        let pattern = format.options.unwrap().pattern.unwrap();
        assert!(pattern.is_match("abc"));
        assert!(!pattern.is_match("abc1"));

        let length = leaf("length", json!(4));
        assert_eq!(length.options.unwrap().exactly, Some(4));

        let ordered = leaf("ordered", json!("descending"));
        assert_eq!(ordered.options.unwrap().comparator.unwrap().name(), "descending");
    }

    #[test]
    fn test_option_keys() {
        let options = leaf(
            "numericality",
            json!({
                "onlyInteger": true,
                "greater_than": 1,
                "lessThanOrEqualTo": 9.5,
                "notAnInteger": "whole numbers only",
                "unit": "kg"
            }),
        )
        .options
        .unwrap();

        assert!(options.only_integer);
        assert_eq!(options.greater_than, Some(1.0));
        assert_eq!(options.less_than_or_equal_to, Some(9.5));
        assert_eq!(options.not_an_integer.as_deref(), Some("whole numbers only"));
        assert_eq!(options.extra.get("unit"), Some(&ParamValue::from("kg")));
    }

    #[test]
    fn test_pattern_flags() {
        let options = leaf("format", json!({ "pattern": "abc", "flags": "i" }))
            .options
            .unwrap();
        assert!(options.pattern.unwrap().is_match("ABC"));

        let err = decode_leaf("format", &json!({ "flags": "i" })).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptions { .. }));

        let err = decode_leaf("format", &json!({ "pattern": "(" })).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_wrong_option_types() {
        assert!(decode_leaf("length", &json!({ "minimum": -1 })).is_err());
        assert!(decode_leaf("length", &json!({ "minimum": "3" })).is_err());
        assert!(decode_leaf("presence", &json!({ "disallowEmpty": "yes" })).is_err());
        assert!(decode_leaf("number", &json!(3)).is_err());
        assert!(decode_leaf("ordered", &json!("sideways")).is_err());
    }

    #[test]
    fn test_structural_kinds() {
        let set = decode_constraints(&json!({
            "tags": { "each": { "string": true, "length": { "maximum": 10 } } },
            "items": { "each": { "object": { "id": { "presence": true } } } },
            "owner": { "object": { "name": { "string": true } }, "presence": true },
            "skipped": { "object": false }
        }))
        .unwrap();

        let kinds = |name: &str| -> Vec<String> {
            set.get(name)
                .unwrap()
                .constraints
                .iter()
                .map(|c| c.kind().to_string())
                .collect()
        };

        assert_eq!(set.len(), 4);
        assert_eq!(kinds("tags"), vec!["each"]);
        assert_eq!(kinds("owner"), vec!["object", "presence"]);
        assert!(kinds("skipped").is_empty());

        match &set.get("tags").unwrap().constraints[0] {
            Constraint::Each(EachRule::Values(leaves)) => assert_eq!(leaves.len(), 2),
            other => panic!("expected element constraints, got {other:?}"),
        }
        match &set.get("items").unwrap().constraints[0] {
            Constraint::Each(EachRule::Objects(nested)) => assert!(nested.get("id").is_some()),
            other => panic!("expected nested record constraints, got {other:?}"),
        }
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let set = decode_constraints(&json!({ "zeta": {}, "alpha": {}, "mid": {} })).unwrap();
        let names: Vec<&str> = set.iter().map(|rule| rule.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_dependency_is_rejected() {
        let err = decode_constraints(&json!({ "a": { "dependency": { "message": "x" } } }))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::invalid_options(
                "dependency",
                "dependency rules need predicates and can only be built in code"
            )
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(decode_constraints(&json!(["a"])).is_err());
        assert!(decode_constraints(&json!({ "a": true })).is_err());
        assert!(decode_constraints(&json!({ "a": { "each": 3 } })).is_err());
        assert!(decode_constraints(&json!({ "a": { "each": { "each": {} } } })).is_err());
    }

    #[test]
    fn test_toml_datetimes() {
        let table: toml::Table =
            toml::from_str("at = 2024-05-01T10:00:00+02:00\nday = 2024-05-01").unwrap();
        let params = toml_to_param(toml::Value::Table(table));

        assert!(params.field("at").as_date().is_some());
        assert_eq!(params.field("day"), &ParamValue::from("2024-05-01"));
    }
}

//! Parameter values.
//!
//! This module provides the tree representation of the data being validated.
//! Request payloads arrive as nested records, sequences and scalars; a missing
//! key and an explicit null are both read as [`ParamValue::Null`].

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

/// Shared absence marker handed out for missing fields.
pub static NULL: ParamValue = ParamValue::Null;

/// A value in a parameter tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParamValue {
    /// Null/missing value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Date instance
    Date(DateTime<FixedOffset>),
    /// Sequence value
    Array(Vec<ParamValue>),
    /// Record value
    Object(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Returns true if this value is the absence marker.
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Returns true for any value other than the absence marker.
    pub fn is_defined(&self) -> bool {
        !self.is_null()
    }

    /// Returns true if this value is a finite number.
    pub fn is_number(&self) -> bool {
        self.as_number().is_some()
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Int(_) => "int64",
            ParamValue::Float(_) => "float64",
            ParamValue::String(_) => "string",
            ParamValue::Date(_) => "date",
            ParamValue::Array(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }

    /// Attempts to get this value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as a finite number.
    ///
    /// NaN and the infinities are not numbers for validation purposes.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    /// Attempts to get this value as a sequence.
    pub fn as_array(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to get this value as a record.
    pub fn as_object(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            ParamValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Attempts to get this value as a date.
    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            ParamValue::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Reads a field of a record.
    ///
    /// Missing keys, and any lookup on a value that is not a record, yield the
    /// absence marker.
    pub fn field(&self, name: &str) -> &ParamValue {
        match self {
            ParamValue::Object(map) => map.get(name).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Returns the length of a string (in characters) or a sequence.
    pub fn length(&self) -> Option<usize> {
        match self {
            ParamValue::String(s) => Some(s.chars().count()),
            ParamValue::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Returns the textual form used when matching patterns.
    ///
    /// Only scalars have one; sequences, records and null never match.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ParamValue::String(s) => Some(s.clone()),
            ParamValue::Bool(b) => Some(b.to_string()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Float(f) => Some(f.to_string()),
            ParamValue::Date(d) => Some(d.to_rfc3339()),
            ParamValue::Null | ParamValue::Array(_) | ParamValue::Object(_) => None,
        }
    }

    /// Strict equality used for membership tests.
    ///
    /// Numbers compare by value across the integer/float split, so `1` is a
    /// member of `[1.0]`.
    pub fn same_value(&self, other: &ParamValue) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<DateTime<FixedOffset>> for ParamValue {
    fn from(d: DateTime<FixedOffset>) -> Self {
        ParamValue::Date(d)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        ParamValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ParamValue::String(s),
            serde_json::Value::Array(items) => {
                ParamValue::Array(items.into_iter().map(ParamValue::from).collect())
            }
            serde_json::Value::Object(map) => ParamValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, ParamValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl FromIterator<(String, ParamValue)> for ParamValue {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        ParamValue::Object(iter.into_iter().collect())
    }
}

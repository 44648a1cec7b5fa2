//! Parser for ensure constraint and parameter documents (YAML/TOML/JSON).
//!
//! Constraint documents map field names to constraint kinds and their
//! options. Parameter documents are the data being validated.
//!
//! # Example
//!
//! ```rust
//! use ensure_parser::parse_constraints_yaml;
//!
//! let yaml = r#"
//! name:
//!   presence: true
//!   length:
//!     minimum: 2
//! tags:
//!   each:
//!     string: true
//! "#;
//!
//! let constraints = parse_constraints_yaml(yaml).expect("Failed to parse constraints");
//! assert_eq!(constraints.len(), 2);
//! ```

mod decode;

pub use decode::{decode_constraints, decode_leaf};

use ensure_core::{ConfigError, ConstraintSet, ParamValue};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading documents.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Document parsed but does not describe a valid constraint tree
    #[error("Invalid constraint document: {0}")]
    InvalidConstraints(#[from] ConfigError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Parse a constraint document from a YAML string.
pub fn parse_constraints_yaml(content: &str) -> Result<ConstraintSet> {
    let document: Value = serde_yaml_ng::from_str(content)?;
    Ok(decode_constraints(&document)?)
}

/// Parse a constraint document from a TOML string.
///
/// # Example
///
/// ```rust
/// use ensure_parser::parse_constraints_toml;
///
/// let toml = r#"
/// [email]
/// presence = true
/// email = { message = "please give a real address" }
/// "#;
///
/// let constraints = parse_constraints_toml(toml).unwrap();
/// assert_eq!(constraints.get("email").unwrap().constraints.len(), 2);
/// ```
pub fn parse_constraints_toml(content: &str) -> Result<ConstraintSet> {
    let document: Value =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(decode_constraints(&document)?)
}

/// Parse a constraint document from a JSON string.
pub fn parse_constraints_json(content: &str) -> Result<ConstraintSet> {
    let document: Value = serde_json::from_str(content)?;
    Ok(decode_constraints(&document)?)
}

/// Parse parameters from a YAML string.
pub fn parse_params_yaml(content: &str) -> Result<ParamValue> {
    let value: Value = serde_yaml_ng::from_str(content)?;
    Ok(value.into())
}

/// Parse parameters from a TOML string.
///
/// Offset datetimes become date values.
pub fn parse_params_toml(content: &str) -> Result<ParamValue> {
    let table: toml::Table =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(decode::toml_to_param(toml::Value::Table(table)))
}

/// Parse parameters from a JSON string.
pub fn parse_params_json(content: &str) -> Result<ParamValue> {
    let value: Value = serde_json::from_str(content)?;
    Ok(value.into())
}

/// Detect the document format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `DocumentFormat::Yaml`
/// * `.toml` → `DocumentFormat::Toml`
/// * `.json` → `DocumentFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<DocumentFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(DocumentFormat::Yaml),
        "toml" => Ok(DocumentFormat::Toml),
        "json" => Ok(DocumentFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a constraint document from a file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use ensure_parser::parse_constraints_file;
/// use std::path::Path;
///
/// let constraints = parse_constraints_file(Path::new("constraints/signup.yml")).unwrap();
/// println!("Loaded {} field rules", constraints.len());
/// ```
pub fn parse_constraints_file(path: &Path) -> Result<ConstraintSet> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "Loading constraint document");

    match format {
        DocumentFormat::Yaml => parse_constraints_yaml(&content),
        DocumentFormat::Toml => parse_constraints_toml(&content),
        DocumentFormat::Json => parse_constraints_json(&content),
    }
}

/// Parse parameters from a file with automatic format detection.
pub fn parse_params_file(path: &Path) -> Result<ParamValue> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "Loading parameters");

    match format {
        DocumentFormat::Yaml => parse_params_yaml(&content),
        DocumentFormat::Toml => parse_params_toml(&content),
        DocumentFormat::Json => parse_params_json(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensure_core::{Constraint, EachRule};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::Builder;

    const SIGNUP_YAML: &str = r#"
username:
  presence:
    disallowEmpty: true
  length:
    minimum: 3
    maximum: 20
    tooShort: "[var] needs at least 3 characters"
email:
  presence: true
  email: true
role:
  inclusion: [admin, member]
address:
  object:
    city:
      string: true
    zip:
      format:
        pattern: "[0-9]{5}"
scores:
  each:
    numericality:
      onlyInteger: true
      greaterThanOrEqualTo: 0
"#;

    #[test]
    fn test_parse_yaml_constraints() {
        let constraints = parse_constraints_yaml(SIGNUP_YAML).expect("Failed to parse YAML");

        let names: Vec<&str> = constraints.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["username", "email", "role", "address", "scores"]);

        let username = constraints.get("username").unwrap();
        let kinds: Vec<&str> = username.constraints.iter().map(Constraint::kind).collect();
        assert_eq!(kinds, vec!["presence", "length"]);

        match &username.constraints[1] {
            Constraint::Leaf(leaf) => {
                let options = leaf.options.as_ref().unwrap();
                assert_eq!(options.minimum, Some(3));
                assert_eq!(options.maximum, Some(20));
                assert_eq!(
                    options.too_short.as_deref(),
                    Some("[var] needs at least 3 characters")
                );
            }
            other => panic!("expected a leaf constraint, got {other:?}"),
        }

        assert!(matches!(
            constraints.get("scores").unwrap().constraints[0],
            Constraint::Each(EachRule::Values(_))
        ));
    }

    #[test]
    fn test_parse_toml_constraints() {
        let toml = r#"
[name]
string = true
presence = { disallowEmpty = true }

[address.object.city]
presence = true
"#;

        let constraints = parse_constraints_toml(toml).expect("Failed to parse TOML");
        assert_eq!(constraints.len(), 2);

        let kinds: Vec<&str> = constraints
            .get("name")
            .unwrap()
            .constraints
            .iter()
            .map(Constraint::kind)
            .collect();
        assert_eq!(kinds, vec!["string", "presence"]);
        assert!(matches!(
            constraints.get("address").unwrap().constraints[0],
            Constraint::Object(_)
        ));
    }

    #[test]
    fn test_parse_json_constraints() {
        let json = r#"{ "ids": { "each": { "uuid": true } }, "note": { "string": false } }"#;
        let constraints = parse_constraints_json(json).expect("Failed to parse JSON");
        assert_eq!(constraints.len(), 2);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            parse_constraints_yaml("a: [unclosed").unwrap_err(),
            ParserError::YamlError(_)
        ));
        assert!(matches!(
            parse_constraints_toml("a = ").unwrap_err(),
            ParserError::TomlError(_)
        ));
        assert!(matches!(
            parse_constraints_json("{").unwrap_err(),
            ParserError::JsonError(_)
        ));
        assert!(matches!(
            parse_constraints_yaml("a:\n  format:\n    pattern: \"(\"\n").unwrap_err(),
            ParserError::InvalidConstraints(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params_yaml("name: Ada\ntags: [a, b]\nage: 36\n").unwrap();
        assert_eq!(params.field("name"), &ParamValue::from("Ada"));
        assert_eq!(params.field("tags").length(), Some(2));
        assert_eq!(params.field("age"), &ParamValue::Int(36));

        let params = parse_params_toml("score = 4.5\n[owner]\nname = \"Ada\"\n").unwrap();
        assert_eq!(params.field("score"), &ParamValue::Float(4.5));
        assert_eq!(params.field("owner").field("name"), &ParamValue::from("Ada"));

        let params = parse_params_json(r#"{ "missing": null }"#).unwrap();
        assert!(params.field("missing").is_null());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a.yml")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(detect_format(Path::new("a.YAML")).unwrap(), DocumentFormat::Yaml);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), DocumentFormat::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), DocumentFormat::Json);
        assert!(matches!(
            detect_format(Path::new("a.xml")).unwrap_err(),
            ParserError::UnsupportedFormat(ext) if ext == "xml"
        ));
        assert!(matches!(
            detect_format(Path::new("constraints")).unwrap_err(),
            ParserError::InvalidExtension
        ));
    }

    #[test]
    fn test_parse_files() {
        let mut constraints_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        constraints_file.write_all(SIGNUP_YAML.as_bytes()).unwrap();

        let mut params_file = Builder::new().suffix(".json").tempfile().unwrap();
        params_file
            .write_all(br#"{ "username": "ada", "email": "ada@example.com" }"#)
            .unwrap();

        let constraints = parse_constraints_file(constraints_file.path()).unwrap();
        let params = parse_params_file(params_file.path()).unwrap();

        assert_eq!(constraints.len(), 5);
        assert_eq!(params.field("username"), &ParamValue::from("ada"));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_constraints_file(Path::new("/nonexistent/constraints.yml"));
        assert!(matches!(result.unwrap_err(), ParserError::IoError(_)));
    }
}

//! Result formatting.
//!
//! Turns the error map of one traversal into the shape the caller asked for.

use ensure_core::{EnsureError, ErrorMap};
use serde::Serialize;

/// Output shape selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// The error map itself
    #[default]
    Structured,
    /// Individual messages in map order
    Flattened,
    /// `Err(EnsureError::ValidationFailed)` when anything failed
    Throwing,
}

/// Result of a validation call in structured or flattened mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// No constraint failed
    Valid,
    /// Errors keyed by property path
    Errors(ErrorMap),
    /// Flattened messages
    Messages(Vec<String>),
}

impl Outcome {
    /// Returns true when no constraint failed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    /// Returns the error map, if this outcome carries one.
    pub fn errors(&self) -> Option<&ErrorMap> {
        match self {
            Outcome::Errors(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns the flattened messages, if this outcome carries them.
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            Outcome::Messages(messages) => Some(messages),
            _ => None,
        }
    }
}

/// Formats an error map according to `mode`.
///
/// # Errors
///
/// In [`OutputMode::Throwing`], returns `EnsureError::ValidationFailed` when
/// the map is not empty.
pub fn format_errors(
    errors: ErrorMap,
    mode: OutputMode,
    with_paths: bool,
) -> Result<Outcome, EnsureError> {
    if errors.is_empty() {
        return Ok(Outcome::Valid);
    }

    match mode {
        OutputMode::Structured => Ok(Outcome::Errors(errors)),
        OutputMode::Flattened => Ok(Outcome::Messages(errors.flatten(with_paths))),
        OutputMode::Throwing => Err(EnsureError::ValidationFailed(errors.flatten(with_paths))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ErrorMap {
        let mut errors = ErrorMap::new();
        errors.add("a.b", "b is not a string");
        errors.add("c", "c can't be blank");
        errors
    }

    #[test]
    fn test_empty_map_is_valid_in_every_mode() {
        for mode in [
            OutputMode::Structured,
            OutputMode::Flattened,
            OutputMode::Throwing,
        ] {
            assert_eq!(format_errors(ErrorMap::new(), mode, true).unwrap(), Outcome::Valid);
        }
    }

    #[test]
    fn test_flattened_with_paths() {
        let outcome = format_errors(sample(), OutputMode::Flattened, true).unwrap();
        assert_eq!(
            outcome.messages().unwrap(),
            &["a.b: b is not a string", "c: c can't be blank"]
        );
    }

    #[test]
    fn test_throwing_joins_messages() {
        let err = format_errors(sample(), OutputMode::Throwing, false).unwrap_err();
        assert_eq!(err.to_string(), "[400] b is not a string; c can't be blank");
    }
}

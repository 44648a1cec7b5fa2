//! Validation reports.
//!
//! A report bundles the error map of one call with execution statistics.

use crate::ErrorMap;
use serde::Serialize;

/// Report of one validation call.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether every constraint passed
    pub passed: bool,

    /// Errors keyed by property path
    pub errors: ErrorMap,

    /// Validation statistics
    pub stats: ValidationStats,
}

/// Statistics about validation execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    /// Number of field visits, counting each sequence element separately
    pub fields_checked: usize,

    /// Number of constraints evaluated
    pub constraints_evaluated: usize,

    /// Validation duration in milliseconds
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Creates a report from an error map.
    pub fn new(errors: ErrorMap, stats: ValidationStats) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
            stats,
        }
    }

    /// Returns the error count, one per message.
    pub fn error_count(&self) -> usize {
        self.errors.message_count()
    }
}

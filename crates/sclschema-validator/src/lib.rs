//! # SCLSchema Validation Engine
//!
//! This crate decides whether SCL instance trees conform to an IEC 61850
//! namespace schema (NSD): one generic presence-condition engine shared by
//! every nesting level, value validators for the built-in basic types and
//! schema enumerations, and structural validators that recurse through
//! nested type instances with per-run memoization.
//!
//! Conformance findings are never `Err` values: every check pushes
//! [`Diagnostic`]s and keeps going, so one run reports every
//! non-conformance in the document.

pub mod basic;
pub mod enumeration;
pub mod error;
pub mod presence;
pub mod registry;
pub mod structural;
pub mod validator;

// Re-export main types for convenience
pub use basic::BasicTypeValidator;
pub use enumeration::EnumerationValidator;
pub use error::{ValidationError, ValidationResult};
pub use presence::{PresenceAccumulator, PresenceValidator, SlotPresence};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use structural::{RunContext, StructuralValidator};
pub use validator::{DocumentEntry, InstanceDocument, Validator};

use serde::Serialize;

use sclschema_core::SourceLocation;

/// Validation configuration options
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Validate leaf values against their declared types (default: true)
    pub check_values: bool,
    /// Maximum structural recursion depth (default: 64)
    pub max_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_values: true,
            max_depth: 64,
        }
    }
}

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages
    Information,
    /// Warning messages
    Warning,
    /// Error messages (validation failures)
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Information => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Individual validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Finding severity
    pub severity: Severity,
    /// Finding code/identifier
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Reference to the offending element (`Class.slot` style)
    pub element: String,
    /// Location in the source document, when known
    pub location: Option<SourceLocation>,
}

/// Ordered receiver for diagnostics. Severities are assigned by the engine
/// and never escalated or downgraded downstream; a sink may only filter.
pub trait DiagnosticSink {
    /// Receive one finding, in emission order.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Validation outcome with detailed results
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    /// Overall validation success
    pub success: bool,
    /// List of findings, in emission order
    pub diagnostics: Vec<Diagnostic>,
    /// Validation statistics
    pub stats: ValidationStats,
}

impl ValidationOutcome {
    /// Build an outcome from collected diagnostics; success means no
    /// error-severity finding was emitted.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>, stats: ValidationStats) -> Self {
        let success = !diagnostics.iter().any(|d| d.severity == Severity::Error);
        Self {
            success,
            diagnostics,
            stats,
        }
    }
}

/// Validation statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStats {
    /// Number of container instances validated
    pub containers_validated: usize,
    /// Number of slot occurrences checked
    pub slots_checked: usize,
    /// Number of leaf values validated
    pub values_validated: usize,
    /// Number of enumerated-type definitions validated
    pub enum_defs_validated: usize,
    /// Validation duration in milliseconds
    pub duration_ms: u64,
}

pub(crate) fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

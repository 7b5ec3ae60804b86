//! Error types and result handling for schema validation
//!
//! Conformance findings are not errors - they travel as [`crate::Diagnostic`]
//! values. `ValidationError` covers caller misuse and document-level
//! failures that prevent a run from starting at all.

use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Failure modes that abort a validation call outright
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The named entry class is not registered
    #[error("Schema class not found: {name}")]
    SchemaNotFound { name: String },

    /// The instance document is not usable as an input tree
    #[error("Invalid instance document: {message}")]
    InvalidDocument { message: String },

    /// JSON/YAML parsing errors
    #[error("Parsing error: {message}")]
    ParseError { message: String },

    /// IO errors
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl ValidationError {
    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Create an invalid document error
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for ValidationError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ValidationError::schema_not_found("XCBR");
        assert!(matches!(err, ValidationError::SchemaNotFound { .. }));
        assert!(err.to_string().contains("XCBR"));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json");
        assert!(json_err.is_err());

        let validation_err: ValidationError = json_err.unwrap_err().into();
        assert!(matches!(validation_err, ValidationError::ParseError { .. }));
    }
}

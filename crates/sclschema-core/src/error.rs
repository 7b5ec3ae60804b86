//! Error types for core schema operations.

use thiserror::Error;

/// Result type alias for core schema operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building the in-memory schema model.
#[derive(Error, Debug)]
pub enum Error {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml::Error),

    /// A slot name registered twice on the same class
    #[error("duplicate slot '{slot}' in class '{class}'")]
    DuplicateSlot {
        /// The class being built.
        class: String,
        /// The re-registered slot name.
        slot: String,
    },

    /// A literal registered twice on the same enumeration
    #[error("duplicate literal '{literal}' in enumeration '{enumeration}'")]
    DuplicateLiteral {
        /// The enumeration being built.
        enumeration: String,
        /// The re-registered literal.
        literal: String,
    },

    /// Invalid schema structure
    #[error("Invalid schema structure: {0}")]
    InvalidSchema(String),
}

//! Error types for webqa-runner

use crate::defect::DefectStatus;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during execution and classification
#[derive(Debug, Error)]
pub enum Error {
    /// Classifier or runner configuration is invalid (every violation listed)
    #[error("Invalid configuration: {}", violations.join("; "))]
    Configuration {
        /// All violations found in the configuration
        violations: Vec<String>,
    },

    /// Defect status change not allowed by the lifecycle
    #[error("Invalid defect transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: DefectStatus,
        /// Requested status
        to: DefectStatus,
    },

    /// Worker pool could not be created
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

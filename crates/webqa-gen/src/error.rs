//! Error types for webqa-gen

use thiserror::Error;

/// Result type alias for webqa-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during test synthesis
#[derive(Debug, Error)]
pub enum Error {
    /// Target framework is not one of playwright, selenium, cypress
    #[error("Unsupported framework: {0}")]
    UnsupportedFramework(String),

    /// Synthesis configuration is invalid (every violation listed)
    #[error("Invalid configuration: {}", violations.join("; "))]
    Configuration {
        /// All violations found in the configuration
        violations: Vec<String>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

//! Error types for webqa-report

use crate::tracker::{ConfigViolation, TrackerError};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during triage and reporting
#[derive(Debug, Error)]
pub enum Error {
    /// Tracker configuration is invalid; the call was not attempted
    #[error("Invalid tracker configuration: {}", join_violations(violations))]
    Configuration {
        /// Every violation found
        violations: Vec<ConfigViolation>,
    },

    /// Tracker collaborator failed
    #[error("Tracker call failed: {0}")]
    ExternalCall(#[from] TrackerError),

    /// IO error (from std::io)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

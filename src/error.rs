//! Error types for the run store

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by [`crate::QaRun`] operations
#[derive(Debug, Error)]
pub enum Error {
    /// Operation addressed an item that is not part of the run
    #[error("Unknown {kind}: {id}")]
    UnknownReference {
        /// Item kind, e.g. `defect`
        kind: &'static str,
        /// Requested identifier
        id: String,
    },

    /// Synthesis failed
    #[error(transparent)]
    Generator(#[from] webqa_gen::Error),

    /// Execution or classification failed
    #[error(transparent)]
    Runner(#[from] webqa_runner::Error),

    /// Triage or reporting failed
    #[error(transparent)]
    Report(#[from] webqa_report::Error),
}

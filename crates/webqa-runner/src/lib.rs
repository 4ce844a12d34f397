//! WebQA Runner
//!
//! Executes test specifications through an [`ExecutionBackend`] and classifies
//! the outcomes, together with probe findings, into triage-ready defects.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::needless_borrows_for_generic_args)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]
#![cfg_attr(test, allow(clippy::redundant_clone))]
#![cfg_attr(test, allow(clippy::uninlined_format_args))]

pub mod classify;
pub mod defect;
pub mod error;
pub mod execution;
pub mod probe;
pub mod result;

#[cfg(test)]
pub mod test_fixtures;

pub use classify::{
    Classification, ClassificationAnomaly, ClassifierConfig, DefectClassifier, Thresholds,
    category_from_test_category, classify, severity_from_error,
};
pub use defect::{Defect, DefectCategory, DefectStatus, Severity, dedupe_defects};
pub use error::{Error, Result};
pub use execution::{
    BackendError, ExecutionBackend, ExecutionOutcome, ExecutionReport, ParallelConfig,
    ParallelRunner, SimulatedBackend,
};
pub use probe::{ProbeFinding, ProbeKind, SimulatedProbes};
pub use result::{ExecutionResult, ExecutionStatus, ResultCollector};

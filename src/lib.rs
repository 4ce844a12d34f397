//! WebQA
//!
//! Web UI test synthesis and defect triage. Discovered page elements become
//! Playwright, Selenium or Cypress test specifications; execution outcomes
//! and probe findings become severity-tagged defects, tracker tickets and
//! run reports.
//!
//! The engines live in the member crates and are re-exported here:
//!
//! - [`webqa_gen`]: element model and test synthesis
//! - [`webqa_runner`]: execution seam, defect model and classification
//! - [`webqa_report`]: triage, tickets, summaries and exports
//!
//! [`QaRun`] ties one generation of all artifacts together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod run;

pub use error::{Error, Result};
pub use run::QaRun;

pub use webqa_gen as generation;
pub use webqa_report as report;
pub use webqa_runner as runner;

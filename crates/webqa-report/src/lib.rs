//! WebQA Report
//!
//! Triage and reporting for classified defects: tracker priority mapping,
//! ticket bodies, ticket creation through a [`TrackerClient`], run
//! summaries, the JSON export document and JUnit XML.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_self)]
#![allow(clippy::needless_raw_string_hashes)]
#![allow(clippy::needless_borrows_for_generic_args)]
#![allow(clippy::uninlined_format_args)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_clone))]
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod error;
pub mod export;
pub mod junit;
pub mod summary;
pub mod ticket;
pub mod tracker;
pub mod triage;

#[cfg(test)]
pub mod test_fixtures;

pub use error::{Error, Result};
pub use export::ExportDocument;
pub use junit::JunitReport;
pub use summary::{RunSummary, pass_rate_estimate, summarize};
pub use ticket::{Ticket, TicketMapper, TicketOutcome, TriageReport, build_request};
pub use tracker::{
    ConfigViolation, SimulatedTracker, TOKEN_ENV_VAR, TicketRequest, TicketResponse,
    TrackerClient, TrackerConfig, TrackerError,
};
pub use triage::{TrackerPriority, build_ticket_body, map_priority, ticket_labels, ticket_summary};

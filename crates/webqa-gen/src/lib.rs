//! WebQA Test Synthesis
//!
//! Turns interactive elements discovered on a web page into executable test
//! specifications for Playwright, Selenium or Cypress.
//!
//! Synthesis is a pure function of its inputs: identical elements and
//! configuration produce identical specifications, identifiers included,
//! because IDs come from an injected [`IdGenerator`] instead of a clock or RNG.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// Allow common patterns
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::needless_raw_string_hashes)]
#![allow(clippy::too_many_lines)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::redundant_closure_for_method_calls))]
#![cfg_attr(test, allow(clippy::redundant_clone))]

pub mod clock;
pub mod element;
pub mod error;
pub mod framework;
pub mod ids;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_impl;
pub mod synthesis;
pub mod template;

pub use clock::{Clock, FixedClock, SystemClock};
pub use element::{Element, ElementId, ElementKind, Locator, Position, duplicate_ids};
pub use error::{Error, Result};
pub use framework::Framework;
pub use ids::{HashedIds, IdGenerator, SequentialIds};
pub use synthesis::{
    Priority, SynthesisAnomaly, SynthesisConfig, SynthesisOutput, TestCategory, TestSpecification,
    TestSynthesizer, synthesize,
};
pub use template::TestKind;

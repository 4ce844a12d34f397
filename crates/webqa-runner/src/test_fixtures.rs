//! Test fixtures shared by the runner unit tests
//!
//! A small storefront page: one button, one email input, one link and a login form.

use crate::defect::{Defect, DefectCategory, DefectStatus, Severity};
use chrono::{DateTime, Utc};
use webqa_gen::{Element, ElementKind, Framework, SynthesisConfig, TestSpecification, synthesize};

/// Base URL of the fixture page
pub const FIXTURE_URL: &str = "https://shop.test/";

/// Elements discovered on the fixture page
#[must_use]
pub fn fixture_elements() -> Vec<Element> {
    vec![
        Element::new("btn-1", ElementKind::Button, "#buy").with_text("Buy"),
        Element::new("in-1", ElementKind::Input, "#email").with_attribute("type", "email"),
        Element::new("lnk-1", ElementKind::Link, "a.about").with_attribute("href", "/about"),
        Element::new("frm-1", ElementKind::Form, "#login"),
    ]
}

/// Specifications synthesized from the fixture page
#[must_use]
pub fn fixture_specifications(framework: Framework) -> Vec<TestSpecification> {
    synthesize(&fixture_elements(), &SynthesisConfig::new(framework, FIXTURE_URL))
        .unwrap_or_default()
}

/// An open, untracked functional defect
#[must_use]
pub fn sample_defect() -> Defect {
    Defect {
        id: "bug-0000-failure".to_string(),
        title: "Test failed: Click button: Buy".to_string(),
        description: "The click test failed".to_string(),
        severity: Severity::Major,
        status: DefectStatus::Open,
        category: DefectCategory::Functional,
        source_url: FIXTURE_URL.to_string(),
        element_ref: Some("btn-1".to_string()),
        artifact_ref: None,
        repro_steps: vec!["Navigate".to_string()],
        expected: "pass".to_string(),
        actual: "fail".to_string(),
        specification_id: Some("tc-0000-click".to_string()),
        tracker_ref: None,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
        reporter: "webqa".to_string(),
    }
}

//! Test fixtures shared by the report unit tests

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use webqa_gen::{Framework, Priority, TestCategory, TestKind, TestSpecification};
use webqa_runner::{Defect, DefectCategory, DefectStatus, Severity};

/// `count` click specifications named `Click button: b<i>`
#[must_use]
pub fn specifications(count: usize) -> Vec<TestSpecification> {
    (0..count)
        .map(|i| TestSpecification {
            id: format!("tc-{i:04}-click"),
            name: format!("Click button: b{i}"),
            description: format!("Clicks button b{i}"),
            framework: Framework::Playwright,
            kind: TestKind::Click,
            body: "test('click', async ({ page }) => {});\n".to_string(),
            covered_element_ids: BTreeSet::from([format!("b{i}")]),
            priority: Priority::High,
            category: TestCategory::Functional,
        })
        .collect()
}

/// An open defect on the fixture page
#[must_use]
pub fn defect(id: &str, severity: Severity, category: DefectCategory) -> Defect {
    Defect {
        id: id.to_string(),
        title: format!("Defect {id}"),
        description: "Something broke".to_string(),
        severity,
        status: DefectStatus::Open,
        category,
        source_url: "https://shop.test/".to_string(),
        element_ref: Some("b0".to_string()),
        artifact_ref: None,
        repro_steps: vec!["Navigate to https://shop.test/".to_string()],
        expected: "Test should pass without error".to_string(),
        actual: "Timeout".to_string(),
        specification_id: Some("tc-0000-click".to_string()),
        tracker_ref: None,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
        reporter: "webqa".to_string(),
    }
}

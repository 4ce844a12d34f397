//! Triage: tracker priority and ticket body for a defect
//!
//! The body is rendered from a fixed markdown template by substituting
//! `{field}` placeholders, so section order never depends on the defect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use webqa_gen::template::render_template;
use webqa_runner::{Defect, Severity};

/// Label added to every ticket created by this tool
pub const AUTOMATION_LABEL: &str = "webqa-automated";

/// Markdown layout of a ticket body
pub const TICKET_BODY_TEMPLATE: &str = "## Description

{description}

## Steps to Reproduce

{steps}

## Expected Result

{expected}

## Actual Result

{actual}

## Metadata

- **URL**: {url}
- **Element**: {element}
- **Category**: {category}
- **Severity**: {severity}
- **Reporter**: {reporter}
- **Created**: {created}
{artifact}";

/// External tracker priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackerPriority {
    /// Stops the release
    Blocker,
    /// Fix before release
    High,
    /// Fix in a following release
    Medium,
    /// Nice to have
    Low,
}

impl TrackerPriority {
    /// Get all priorities, highest first
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Blocker, Self::High, Self::Medium, Self::Low]
    }
}

impl std::fmt::Display for TrackerPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocker => write!(f, "Blocker"),
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Tracker priority for a defect severity
#[must_use]
pub const fn map_priority(severity: Severity) -> TrackerPriority {
    match severity {
        Severity::Critical => TrackerPriority::Blocker,
        Severity::Major => TrackerPriority::High,
        Severity::Minor => TrackerPriority::Medium,
        Severity::Trivial => TrackerPriority::Low,
    }
}

/// Capitalized severity, as shown in ticket summaries
#[must_use]
pub const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::Major => "Major",
        Severity::Minor => "Minor",
        Severity::Trivial => "Trivial",
    }
}

/// One-line ticket summary: `[Severity] title`
#[must_use]
pub fn ticket_summary(defect: &Defect) -> String {
    format!("[{}] {}", severity_label(defect.severity), defect.title)
}

/// Configured labels followed by category, severity and automation labels
#[must_use]
pub fn ticket_labels(defect: &Defect, configured: &[String]) -> Vec<String> {
    let mut labels = configured.to_vec();
    labels.push(format!("category:{}", defect.category));
    labels.push(format!("severity:{}", defect.severity));
    labels.push(AUTOMATION_LABEL.to_string());
    labels
}

/// Render the ticket body for a defect
#[must_use]
pub fn build_ticket_body(defect: &Defect) -> String {
    let steps = defect
        .repro_steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let artifact = defect
        .artifact_ref
        .as_ref()
        .map(|a| format!("- **Artifact**: {a}\n"))
        .unwrap_or_default();

    let mut fields = BTreeMap::new();
    fields.insert("description", defect.description.clone());
    fields.insert("steps", steps);
    fields.insert("expected", defect.expected.clone());
    fields.insert("actual", defect.actual.clone());
    fields.insert("url", defect.source_url.clone());
    fields.insert(
        "element",
        defect.element_ref.clone().unwrap_or_else(|| "N/A".to_string()),
    );
    fields.insert("category", defect.category.to_string());
    fields.insert("severity", defect.severity.to_string());
    fields.insert("reporter", defect.reporter.clone());
    fields.insert("created", defect.created_at.to_rfc3339());
    fields.insert("artifact", artifact);

    let body = render_ticket_template(TICKET_BODY_TEMPLATE, &fields);
    format!("{}\n", body.trim_end())
}

/// Render a ticket template by substituting `{field}` placeholders in one pass
///
/// Unknown placeholders are left as-is; substituted values are never rescanned.
#[must_use]
pub fn render_ticket_template(template: &str, fields: &BTreeMap<&str, String>) -> String {
    render_template(template, fields)
}

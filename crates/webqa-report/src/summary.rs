//! Run summary
//!
//! Purely derived counts; recomputable at any time from the current defect
//! and specification sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use webqa_gen::TestSpecification;
use webqa_runner::{Defect, DefectCategory, DefectStatus, Severity};

/// Aggregated counts for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Number of test specifications
    pub total_specifications: usize,
    /// Number of defects
    pub total_defects: usize,
    /// Estimated pass rate in percent, two decimals
    pub pass_rate_estimate: f64,
    /// Defect count per severity, every severity present
    pub by_severity: BTreeMap<Severity, usize>,
    /// Defect count per category, every category present
    pub by_category: BTreeMap<DefectCategory, usize>,
    /// Defects open or in progress
    pub open_count: usize,
    /// Defects resolved or closed
    pub resolved_count: usize,
}

impl RunSummary {
    /// Defects counted for a severity
    #[must_use]
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Defects counted for a category
    #[must_use]
    pub fn category_count(&self, category: DefectCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// `max(0, 100 - defects / specifications * 100)`, or 0 with no specifications
#[must_use]
pub fn pass_rate_estimate(total_defects: usize, total_specifications: usize) -> f64 {
    if total_specifications == 0 {
        return 0.0;
    }
    let rate = 100.0 - (total_defects as f64 / total_specifications as f64) * 100.0;
    (rate.max(0.0) * 100.0).round() / 100.0
}

/// Summarize defects against the specifications of the same run
#[must_use]
pub fn summarize(defects: &[Defect], specifications: &[TestSpecification]) -> RunSummary {
    let mut by_severity: BTreeMap<Severity, usize> =
        Severity::all().into_iter().map(|s| (s, 0)).collect();
    let mut by_category: BTreeMap<DefectCategory, usize> =
        DefectCategory::all().into_iter().map(|c| (c, 0)).collect();
    let mut open_count = 0;
    let mut resolved_count = 0;

    for defect in defects {
        *by_severity.entry(defect.severity).or_insert(0) += 1;
        *by_category.entry(defect.category).or_insert(0) += 1;
        match defect.status {
            DefectStatus::Open | DefectStatus::InProgress => open_count += 1,
            DefectStatus::Resolved | DefectStatus::Closed => resolved_count += 1,
        }
    }

    RunSummary {
        total_specifications: specifications.len(),
        total_defects: defects.len(),
        pass_rate_estimate: pass_rate_estimate(defects.len(), specifications.len()),
        by_severity,
        by_category,
        open_count,
        resolved_count,
    }
}

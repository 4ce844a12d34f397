//! Export document for downstream tooling
//!
//! # JSON shape
//!
//! ```text
//! {
//!   "summary":     { totalSpecifications, totalDefects, passRateEstimate, ... },
//!   "bugs":        [ Defect, ... ],
//!   "testCases":   [ TestSpecification, ... ],
//!   "generatedAt": "2026-01-02T03:04:05Z"
//! }
//! ```
//!
//! Keys are camelCase. The document reads back into the same types.

use crate::error::Result;
use crate::summary::{RunSummary, summarize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use webqa_gen::TestSpecification;
use webqa_runner::Defect;

/// Complete run export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Aggregated counts
    pub summary: RunSummary,
    /// Every defect of the run
    pub bugs: Vec<Defect>,
    /// Every specification of the run
    pub test_cases: Vec<TestSpecification>,
    /// When the document was produced
    pub generated_at: DateTime<Utc>,
}

impl ExportDocument {
    /// Build an export, computing the summary from the inputs
    #[must_use]
    pub fn new(
        defects: &[Defect],
        specifications: &[TestSpecification],
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            summary: summarize(defects, specifications),
            bugs: defects.to_vec(),
            test_cases: specifications.to_vec(),
            generated_at,
        }
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the export shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read_from(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{defect, specifications};
    use webqa_runner::{DefectCategory, Severity};

    fn document() -> ExportDocument {
        ExportDocument::new(
            &[defect("bug-1", Severity::Major, DefectCategory::Ui)],
            &specifications(4),
            DateTime::<Utc>::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_top_level_keys() {
        let value: serde_json::Value = serde_json::from_str(&document().to_json().unwrap()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in ["summary", "bugs", "testCases", "generatedAt"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(value["summary"]["totalSpecifications"], 4);
        assert_eq!(value["bugs"][0]["severity"], "major");
        assert_eq!(value["testCases"][0]["coveredElementIds"][0], "b0");
    }

    #[test]
    fn test_document_reads_back() {
        let doc = document();
        let back = ExportDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
        assert!((back.summary.pass_rate_estimate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(ExportDocument::from_json("{\"summary\": 3}").is_err());
    }
}

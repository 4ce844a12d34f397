//! Execution results
//!
//! Every executed specification produces exactly one result, whatever the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message used when a failed result carries no error text
pub const UNKNOWN_FAILURE: &str = "Test failed with unknown error";

/// Status of one specification run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Specification passed
    Passed,
    /// Specification failed
    Failed,
    /// Specification was not run
    Skipped,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of running one test specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Unique result ID
    pub id: String,
    /// Specification that was run
    pub specification_id: String,
    /// Status
    pub status: ExecutionStatus,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Error text, present only for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Screenshot, trace or video reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<String>,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl ExecutionResult {
    /// Create a passing result
    #[must_use]
    pub fn passed(
        id: impl Into<String>,
        specification_id: impl Into<String>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            specification_id: specification_id.into(),
            status: ExecutionStatus::Passed,
            duration_ms,
            error: None,
            artifact_ref: None,
            timestamp,
        }
    }

    /// Create a failing result; `None` error means an unknown cause
    #[must_use]
    pub fn failed(
        id: impl Into<String>,
        specification_id: impl Into<String>,
        error: Option<String>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            specification_id: specification_id.into(),
            status: ExecutionStatus::Failed,
            duration_ms,
            error,
            artifact_ref: None,
            timestamp,
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(
        id: impl Into<String>,
        specification_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            specification_id: specification_id.into(),
            status: ExecutionStatus::Skipped,
            duration_ms: 0,
            error: None,
            artifact_ref: None,
            timestamp,
        }
    }

    /// Attach an artifact reference
    #[must_use]
    pub fn with_artifact(mut self, artifact_ref: impl Into<String>) -> Self {
        self.artifact_ref = Some(artifact_ref.into());
        self
    }

    /// Whether the run failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == ExecutionStatus::Failed
    }

    /// Error text, or the unknown-failure message for failures without one
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        if self.is_failed() {
            Some(self.error.as_deref().unwrap_or(UNKNOWN_FAILURE))
        } else {
            None
        }
    }
}

/// Collector for results from many runs
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    results: Vec<ExecutionResult>,
}

impl ResultCollector {
    /// Create a new collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result
    pub fn add(&mut self, result: ExecutionResult) {
        self.results.push(result);
    }

    /// Get all results
    #[must_use]
    pub fn all(&self) -> &[ExecutionResult] {
        &self.results
    }

    /// Get count of each status
    #[must_use]
    pub fn counts(&self) -> HashMap<ExecutionStatus, usize> {
        let mut counts = HashMap::new();
        for r in &self.results {
            *counts.entry(r.status).or_insert(0) += 1;
        }
        counts
    }

    /// Get pass count
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.count(ExecutionStatus::Passed)
    }

    /// Get fail count
    #[must_use]
    pub fn fail_count(&self) -> usize {
        self.count(ExecutionStatus::Failed)
    }

    /// Get skip count
    #[must_use]
    pub fn skip_count(&self) -> usize {
        self.count(ExecutionStatus::Skipped)
    }

    /// Get total count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&ExecutionResult> {
        self.results.iter().filter(|r| r.is_failed()).collect()
    }

    /// Consume the collector
    #[must_use]
    pub fn into_results(self) -> Vec<ExecutionResult> {
        self.results
    }

    /// Export to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.results)
    }

    fn count(&self, status: ExecutionStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

impl FromIterator<ExecutionResult> for ResultCollector {
    fn from_iter<I: IntoIterator<Item = ExecutionResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[test]
    fn test_failure_message() {
        let failed = ExecutionResult::failed("r1", "tc-1", Some("Timeout".to_string()), 5, ts());
        assert_eq!(failed.failure_message(), Some("Timeout"));

        let unknown = ExecutionResult::failed("r2", "tc-1", None, 5, ts());
        assert_eq!(unknown.failure_message(), Some(UNKNOWN_FAILURE));

        let passed = ExecutionResult::passed("r3", "tc-1", 5, ts());
        assert_eq!(passed.failure_message(), None);
    }

    #[test]
    fn test_collector_counts() {
        let collector: ResultCollector = vec![
            ExecutionResult::passed("r1", "a", 10, ts()),
            ExecutionResult::failed("r2", "b", None, 10, ts()),
            ExecutionResult::skipped("r3", "c", ts()),
            ExecutionResult::passed("r4", "d", 10, ts()),
        ]
        .into_iter()
        .collect();

        assert_eq!(collector.total(), 4);
        assert_eq!(collector.pass_count(), 2);
        assert_eq!(collector.fail_count(), 1);
        assert_eq!(collector.skip_count(), 1);
        assert_eq!(collector.failures()[0].id, "r2");
        assert_eq!(collector.counts().get(&ExecutionStatus::Passed), Some(&2));
    }

    #[test]
    fn test_result_json_shape() {
        let result = ExecutionResult::failed("r1", "tc-1", Some("boom".to_string()), 12, ts())
            .with_artifact("screenshots/r1.png");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"specificationId\":\"tc-1\""));
        assert!(json.contains("\"durationMs\":12"));
        assert!(json.contains("\"artifactRef\":\"screenshots/r1.png\""));
        assert!(json.contains("\"status\":\"failed\""));

        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_collector_to_json() {
        let mut collector = ResultCollector::new();
        collector.add(ExecutionResult::passed("r1", "a", 1, ts()));
        let json = collector.to_json().unwrap();
        assert!(json.contains("\"passed\""));
    }
}

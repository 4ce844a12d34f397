//! Defect classification
//!
//! Maps failed execution results and probe findings to severity- and
//! category-tagged defects. Classification is a pure function of its inputs:
//! identifiers and timestamps come from the injected [`IdGenerator`] and
//! [`Clock`], never from ambient state.

use crate::defect::{Defect, DefectCategory, DefectStatus, Severity};
use crate::error::{Error, Result};
use crate::probe::{ProbeFinding, ProbeKind};
use crate::result::ExecutionResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use webqa_gen::ids::SCOPE_DEFECT;
use webqa_gen::{Clock, IdGenerator, Priority, SequentialIds, SystemClock, TestCategory, TestSpecification};

/// Default reporter recorded on generated defects
pub const DEFAULT_REPORTER: &str = "webqa";

/// Expected-behavior text for failure-derived defects
pub const EXPECTED_PASS: &str = "Test should pass without error";

/// Probe thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    /// Maximum acceptable page load time
    pub load_time_ms: u64,
    /// Maximum acceptable visual diff ratio
    pub visual_diff_ratio: f64,
    /// Minimum acceptable accessibility score
    pub a11y_score_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            load_time_ms: 3_000,
            visual_diff_ratio: 0.05,
            a11y_score_min: 90.0,
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Turn visual findings into defects
    #[serde(default)]
    pub enable_visual: bool,
    /// Turn load-time findings into defects
    #[serde(default)]
    pub enable_performance: bool,
    /// Turn accessibility findings into defects
    #[serde(default)]
    pub enable_accessibility: bool,
    /// Probe thresholds
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Page under test, recorded on failure-derived defects; may be empty
    #[serde(default)]
    pub source_url: String,
    /// Reporter recorded on every defect; blank means the default reporter
    #[serde(default = "default_reporter")]
    pub reporter: String,
}

fn default_reporter() -> String {
    DEFAULT_REPORTER.to_string()
}

impl ClassifierConfig {
    /// Create a configuration with all probes disabled
    #[must_use]
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            enable_visual: false,
            enable_performance: false,
            enable_accessibility: false,
            thresholds: Thresholds::default(),
            source_url: source_url.into(),
            reporter: default_reporter(),
        }
    }

    /// Enable every probe
    #[must_use]
    pub const fn with_all_probes(mut self) -> Self {
        self.enable_visual = true;
        self.enable_performance = true;
        self.enable_accessibility = true;
        self
    }

    /// Set thresholds
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = reporter.into();
        self
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Check the thresholds, reporting every violation
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` listing all violations.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();
        let t = &self.thresholds;
        if t.load_time_ms == 0 {
            violations.push("thresholds.loadTimeMs must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&t.visual_diff_ratio) {
            violations.push(format!(
                "thresholds.visualDiffRatio must be within [0, 1], got {}",
                t.visual_diff_ratio
            ));
        }
        if !(0.0..=100.0).contains(&t.a11y_score_min) {
            violations.push(format!(
                "thresholds.a11yScoreMin must be within [0, 100], got {}",
                t.a11y_score_min
            ));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration { violations })
        }
    }

    fn reporter(&self) -> &str {
        let reporter = self.reporter.trim();
        if reporter.is_empty() {
            DEFAULT_REPORTER
        } else {
            reporter
        }
    }

    fn probe_enabled(&self, kind: ProbeKind) -> bool {
        match kind {
            ProbeKind::Visual => self.enable_visual,
            ProbeKind::Performance => self.enable_performance,
            ProbeKind::Accessibility => self.enable_accessibility,
        }
    }
}

/// Severity for a failed specification
///
/// Timeouts and missing elements are critical. Assertion mismatches are major
/// for high-priority specifications and minor otherwise. Anything else,
/// including a missing error, is minor.
#[must_use]
pub fn severity_from_error(error: Option<&str>, priority: Priority) -> Severity {
    let Some(error) = error else {
        return Severity::Minor;
    };
    let error = error.to_lowercase();
    if error.contains("timeout") || error.contains("not found") {
        Severity::Critical
    } else if error.contains("assertion") || error.contains("expected") {
        if priority == Priority::High {
            Severity::Major
        } else {
            Severity::Minor
        }
    } else {
        Severity::Minor
    }
}

/// Defect category for a failed specification; integration collapses to functional
#[must_use]
pub const fn category_from_test_category(category: TestCategory) -> DefectCategory {
    match category {
        TestCategory::Functional | TestCategory::Integration => DefectCategory::Functional,
        TestCategory::Ui => DefectCategory::Ui,
    }
}

/// Per-item issue found during classification; never fatal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassificationAnomaly {
    /// Result references a specification that is not in the run
    UnknownSpecification {
        /// Offending result
        result_id: String,
        /// Missing specification
        specification_id: String,
    },
}

impl std::fmt::Display for ClassificationAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSpecification {
                result_id,
                specification_id,
            } => write!(
                f,
                "result {result_id} references unknown specification {specification_id}"
            ),
        }
    }
}

/// Defects plus the anomalies met while producing them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Failure-derived defects followed by probe-derived defects
    pub defects: Vec<Defect>,
    /// Skipped inputs
    pub anomalies: Vec<ClassificationAnomaly>,
}

/// Fields shared by every defect built in one call
struct DefectDraft {
    title: String,
    description: String,
    severity: Severity,
    category: DefectCategory,
    source_url: String,
    element_ref: Option<String>,
    artifact_ref: Option<String>,
    repro_steps: Vec<String>,
    expected: String,
    actual: String,
    specification_id: Option<String>,
}

/// Failed results and probe findings → defects
pub struct DefectClassifier {
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for DefectClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefectClassifier").finish_non_exhaustive()
    }
}

impl Default for DefectClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DefectClassifier {
    /// Create a classifier with sequential IDs and the system clock
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Box::new(SequentialIds),
            clock: Box::new(SystemClock),
        }
    }

    /// Use a custom ID generator
    #[must_use]
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Use a custom clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Classify a batch
    ///
    /// Results are processed in the order given. Probe findings for disabled
    /// probes, and findings within threshold, produce nothing. No
    /// deduplication is done across the two sources.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` when the configuration is invalid.
    /// Results pointing at unknown specifications are reported as anomalies.
    pub fn classify(
        &self,
        results: &[ExecutionResult],
        specifications: &[TestSpecification],
        config: &ClassifierConfig,
        findings: &[ProbeFinding],
    ) -> Result<Classification> {
        config.validate()?;
        let by_id: HashMap<&str, &TestSpecification> = specifications
            .iter()
            .map(|s| (s.id.as_str(), s))
            .collect();
        let mut classification = Classification::default();

        for result in results.iter().filter(|r| r.is_failed()) {
            let Some(spec) = by_id.get(result.specification_id.as_str()) else {
                warn!(
                    result_id = %result.id,
                    specification_id = %result.specification_id,
                    "result references unknown specification; skipped"
                );
                classification
                    .anomalies
                    .push(ClassificationAnomaly::UnknownSpecification {
                        result_id: result.id.clone(),
                        specification_id: result.specification_id.clone(),
                    });
                continue;
            };
            let draft = failure_draft(result, spec, config);
            let defect = self.build(classification.defects.len(), "failure", draft, config);
            debug!(id = %defect.id, severity = %defect.severity, category = %defect.category, "classified failure");
            classification.defects.push(defect);
        }

        for finding in findings {
            let kind = finding.kind();
            if !config.probe_enabled(kind) {
                continue;
            }
            if let Some(draft) = probe_draft(finding, &config.thresholds) {
                let defect = self.build(classification.defects.len(), kind.tag(), draft, config);
                debug!(id = %defect.id, severity = %defect.severity, category = %defect.category, "classified probe finding");
                classification.defects.push(defect);
            }
        }

        info!(
            results = results.len(),
            defects = classification.defects.len(),
            anomalies = classification.anomalies.len(),
            "classification finished"
        );
        Ok(classification)
    }

    fn build(&self, index: usize, tag: &str, draft: DefectDraft, config: &ClassifierConfig) -> Defect {
        let now = self.clock.now();
        Defect {
            id: self.ids.generate(SCOPE_DEFECT, index, tag),
            title: draft.title,
            description: draft.description,
            severity: draft.severity,
            status: DefectStatus::Open,
            category: draft.category,
            source_url: draft.source_url,
            element_ref: draft.element_ref,
            artifact_ref: draft.artifact_ref,
            repro_steps: draft.repro_steps,
            expected: draft.expected,
            actual: draft.actual,
            specification_id: draft.specification_id,
            tracker_ref: None,
            created_at: now,
            updated_at: now,
            reporter: config.reporter().to_string(),
        }
    }
}

fn failure_draft(
    result: &ExecutionResult,
    spec: &TestSpecification,
    config: &ClassifierConfig,
) -> DefectDraft {
    let actual = result
        .failure_message()
        .unwrap_or(crate::result::UNKNOWN_FAILURE)
        .to_string();
    DefectDraft {
        title: format!("Test failed: {}", spec.name),
        description: format!(
            "{} ({} priority, {} test) failed after {} ms: {actual}",
            spec.description, spec.priority, spec.category, result.duration_ms
        ),
        severity: severity_from_error(result.error.as_deref(), spec.priority),
        category: category_from_test_category(spec.category),
        source_url: config.source_url.clone(),
        element_ref: spec.covered_element_ids.iter().next().cloned(),
        artifact_ref: result.artifact_ref.clone(),
        repro_steps: vec![
            if config.source_url.is_empty() {
                "Open the page under test".to_string()
            } else {
                format!("Navigate to {}", config.source_url)
            },
            format!("Execute test specification '{}' ({})", spec.name, spec.framework),
            "Observe the failure".to_string(),
        ],
        expected: EXPECTED_PASS.to_string(),
        actual,
        specification_id: Some(spec.id.clone()),
    }
}

fn probe_draft(finding: &ProbeFinding, thresholds: &Thresholds) -> Option<DefectDraft> {
    match finding {
        ProbeFinding::VisualDiff {
            url,
            element_ref,
            diff_ratio,
            artifact_ref,
        } if *diff_ratio > thresholds.visual_diff_ratio => Some(DefectDraft {
            title: format!("Visual regression detected on {url}"),
            description: format!(
                "Screenshot differs from the baseline by {:.1}% (threshold {:.1}%)",
                diff_ratio * 100.0,
                thresholds.visual_diff_ratio * 100.0
            ),
            severity: Severity::Minor,
            category: DefectCategory::Ui,
            source_url: url.clone(),
            element_ref: element_ref.clone(),
            artifact_ref: artifact_ref.clone(),
            repro_steps: vec![
                format!("Navigate to {url}"),
                "Capture a full-page screenshot".to_string(),
                "Compare it against the baseline screenshot".to_string(),
            ],
            expected: format!("Visual diff ratio at most {}", thresholds.visual_diff_ratio),
            actual: format!("Visual diff ratio {diff_ratio}"),
            specification_id: None,
        }),
        ProbeFinding::LoadTime { url, load_time_ms }
            if *load_time_ms > thresholds.load_time_ms =>
        {
            Some(DefectDraft {
                title: format!("Slow page load on {url}"),
                description: format!(
                    "Page took {load_time_ms} ms to load (threshold {} ms)",
                    thresholds.load_time_ms
                ),
                severity: Severity::Major,
                category: DefectCategory::Performance,
                source_url: url.clone(),
                element_ref: None,
                artifact_ref: None,
                repro_steps: vec![
                    format!("Navigate to {url}"),
                    "Measure the time until the load event fires".to_string(),
                ],
                expected: format!("Page loads within {} ms", thresholds.load_time_ms),
                actual: format!("Page loaded in {load_time_ms} ms"),
                specification_id: None,
            })
        }
        ProbeFinding::Accessibility {
            url,
            score,
            violations,
        } if *score < thresholds.a11y_score_min => Some(DefectDraft {
            title: format!("Accessibility issues on {url}"),
            description: if violations.is_empty() {
                format!("Accessibility score {score} is below {}", thresholds.a11y_score_min)
            } else {
                format!(
                    "Accessibility score {score} is below {}; violations: {}",
                    thresholds.a11y_score_min,
                    violations.join(", ")
                )
            },
            severity: Severity::Major,
            category: DefectCategory::Usability,
            source_url: url.clone(),
            element_ref: None,
            artifact_ref: None,
            repro_steps: vec![
                format!("Navigate to {url}"),
                "Run an accessibility audit".to_string(),
            ],
            expected: format!("Accessibility score of at least {}", thresholds.a11y_score_min),
            actual: format!("Accessibility score {score}"),
            specification_id: None,
        }),
        _ => None,
    }
}

/// Classify with sequential IDs and the system clock
///
/// # Errors
///
/// Returns an error when the configuration is invalid.
pub fn classify(
    results: &[ExecutionResult],
    specifications: &[TestSpecification],
    config: &ClassifierConfig,
    findings: &[ProbeFinding],
) -> Result<Vec<Defect>> {
    DefectClassifier::new()
        .classify(results, specifications, config, findings)
        .map(|c| c.defects)
}

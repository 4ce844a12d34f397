//! WebQA CLI Library
//!
//! Library functions for the `webqa` command-line tool. Every helper returns
//! `Result<_, String>` with a message ready to print.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
// Allow common patterns in test code
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use webqa_gen::{Element, SynthesisConfig, SynthesisOutput, TestSpecification, TestSynthesizer};
use webqa_report::{
    ExportDocument, JunitReport, RunSummary, SimulatedTracker, TicketMapper, TrackerConfig,
    TriageReport, build_ticket_body, map_priority, ticket_labels, ticket_summary,
};
use webqa_runner::{
    BackendError, Classification, ClassifierConfig, Defect, DefectClassifier, ExecutionReport,
    ExecutionResult, ParallelConfig, ParallelRunner, ProbeFinding, SimulatedBackend,
    SimulatedProbes, dedupe_defects,
};

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "webqa=info";

/// Error text the simulated backend reports for scripted failures
pub const SIMULATED_FAILURE: &str = "Simulated failure: assertion did not hold";

/// Result of a CLI operation
#[derive(Debug)]
pub enum CliResult {
    /// Operation succeeded
    Success(String),
    /// Operation failed with error
    Error(String),
}

impl CliResult {
    /// Returns true if the result is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the message
    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Error(msg) => msg,
        }
    }
}

impl<T> From<Result<T, String>> for CliResult
where
    T: std::fmt::Display,
{
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Self::Success(value.to_string()),
            Err(e) => Self::Error(e),
        }
    }
}

/// Combined configuration file
///
/// ```yaml
/// synthesis:
///   framework: playwright
///   baseUrl: https://shop.example.com/
/// classifier:
///   enableVisual: true
/// tracker:
///   baseUrl: https://tracker.example.com
///   projectKey: WEB
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebQaConfig {
    /// Synthesis settings
    pub synthesis: SynthesisConfig,
    /// Classifier settings; defaults derive from the synthesis base URL
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
    /// Tracker settings; required only for `ticket`
    #[serde(default)]
    pub tracker: Option<TrackerConfig>,
}

impl WebQaConfig {
    /// Classifier configuration with the source URL filled from synthesis
    pub fn classifier_config(&self) -> ClassifierConfig {
        let mut config = self
            .classifier
            .clone()
            .unwrap_or_else(|| ClassifierConfig::new(String::new()));
        if config.source_url.trim().is_empty() {
            config.source_url.clone_from(&self.synthesis.base_url);
        }
        config
    }

    /// Tracker configuration with an optional token override applied
    pub fn tracker_config(&self, token: Option<String>) -> Result<TrackerConfig, String> {
        let config = self
            .tracker
            .clone()
            .ok_or_else(|| "No tracker section in configuration".to_string())?;
        Ok(config.with_token_override(token))
    }
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `webqa=info`, or `webqa=debug` when
/// `verbose` is on. The `webqa` target prefix covers every member crate.
/// Logs go to stderr.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "webqa=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the combined configuration from YAML
pub fn load_config(path: &Path) -> Result<WebQaConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading config {}: {e}", path.display()))?;
    parse_config(&content)
}

/// Parse the combined configuration
pub fn parse_config(yaml: &str) -> Result<WebQaConfig, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("Error parsing config YAML: {e}"))
}

/// Read a JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {what} {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("Error parsing {what} JSON: {e}"))
}

/// Write a value as pretty JSON, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("Error serializing {what}: {e}"))?;
    write_file(path, &json)
}

fn write_file(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating directory {}: {e}", parent.display()))?;
    }
    std::fs::write(path, content).map_err(|e| format!("Error writing {}: {e}", path.display()))
}

/// Load discovered elements from JSON
pub fn load_elements(path: &Path) -> Result<Vec<Element>, String> {
    read_json(path, "elements")
}

/// Load specifications from JSON or YAML, chosen by extension
pub fn load_specifications(path: &Path) -> Result<Vec<TestSpecification>, String> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if !is_yaml {
        return read_json(path, "specifications");
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading specifications {}: {e}", path.display()))?;
    serde_yaml::from_str(&content).map_err(|e| format!("Error parsing specifications YAML: {e}"))
}

/// Synthesize specifications
pub fn generate_specifications(
    elements: &[Element],
    config: &SynthesisConfig,
) -> Result<SynthesisOutput, String> {
    TestSynthesizer::new()
        .synthesize(elements, config)
        .map_err(|e| format!("Error synthesizing tests: {e}"))
}

/// Format specifications as YAML
pub fn specifications_to_yaml(specifications: &[TestSpecification]) -> Result<String, String> {
    serde_yaml::to_string(specifications)
        .map_err(|e| format!("Error serializing specifications: {e}"))
}

/// Format specifications as JSON
pub fn specifications_to_json(specifications: &[TestSpecification]) -> Result<String, String> {
    serde_json::to_string_pretty(specifications)
        .map_err(|e| format!("Error serializing specifications: {e}"))
}

/// Write every specification body to its own source file
pub fn write_test_files(
    specifications: &[TestSpecification],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Error creating directory {}: {e}", output_dir.display()))?;
    let mut written = Vec::with_capacity(specifications.len());
    for spec in specifications {
        let path = output_dir.join(spec.file_name());
        write_file(&path, &spec.body)?;
        debug!(path = %path.display(), "wrote test file");
        written.push(path);
    }
    Ok(written)
}

/// Simulated backend where the listed specifications fail
pub fn simulated_backend(failing: &[String], unavailable: &[String]) -> SimulatedBackend {
    let backend = failing.iter().fold(SimulatedBackend::new(), |backend, id| {
        backend.with_failure(id.clone(), SIMULATED_FAILURE)
    });
    unavailable.iter().fold(backend, |backend, id| {
        backend.with_backend_error(id.clone(), BackendError::Unavailable("simulated".to_string()))
    })
}

/// Execute specifications on the simulated backend
pub fn execute_specifications(
    specifications: &[TestSpecification],
    backend: &SimulatedBackend,
    workers: usize,
    stop_on_failure: bool,
) -> Result<ExecutionReport, String> {
    let config = ParallelConfig::default()
        .with_workers(workers)
        .with_stop_on_failure(stop_on_failure);
    let report = ParallelRunner::new(config)
        .run(backend, specifications)
        .map_err(|e| format!("Execution failed: {e}"))?;
    info!(
        passed = report.passed,
        failed = report.failed,
        skipped = report.skipped,
        "execution finished"
    );
    Ok(report)
}

/// Simulated probe findings for a page, empty when no probe is enabled
pub fn probe_findings(config: &ClassifierConfig) -> Vec<ProbeFinding> {
    if config.enable_visual || config.enable_performance || config.enable_accessibility {
        SimulatedProbes.audit(&config.source_url)
    } else {
        Vec::new()
    }
}

/// Classify results and simulated probe findings into defects
pub fn classify_results(
    results: &[ExecutionResult],
    specifications: &[TestSpecification],
    config: &ClassifierConfig,
) -> Result<Classification, String> {
    let findings = probe_findings(config);
    DefectClassifier::new()
        .classify(results, specifications, config, &findings)
        .map_err(|e| format!("Error classifying results: {e}"))
}

/// Build the export document
pub fn build_export(
    defects: &[Defect],
    specifications: &[TestSpecification],
    generated_at: DateTime<Utc>,
) -> ExportDocument {
    ExportDocument::new(defects, specifications, generated_at)
}

/// Generate JUnit XML
pub fn generate_junit_report(
    suite_name: &str,
    specifications: &[TestSpecification],
    results: &[ExecutionResult],
    summary: &RunSummary,
) -> Result<String, String> {
    JunitReport::new(suite_name)
        .generate(specifications, results, summary)
        .map_err(|e| format!("Error generating JUnit: {e}"))
}

/// One-line overview of a run summary
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "{} specifications, {} defects ({} open, {} resolved), pass rate estimate {:.2}%",
        summary.total_specifications,
        summary.total_defects,
        summary.open_count,
        summary.resolved_count,
        summary.pass_rate_estimate
    )
}

/// Format a ticket preview for `--dry-run`
pub fn format_ticket_preview(defect: &Defect, config: &TrackerConfig) -> String {
    format!(
        "--- {} ---\nPriority: {}\nLabels: {}\n\n{}",
        ticket_summary(defect),
        map_priority(defect.severity),
        ticket_labels(defect, &config.labels).join(", "),
        build_ticket_body(defect)
    )
}

/// Defects to ticket, optionally one per `(sourceUrl, elementRef, category)` group
pub fn ticket_targets(defects: &[Defect], dedupe: bool) -> Vec<Defect> {
    if dedupe {
        dedupe_defects(defects).into_iter().cloned().collect()
    } else {
        defects.to_vec()
    }
}

/// Create tickets on the simulated tracker
pub fn create_tickets(defects: &[Defect], config: &TrackerConfig) -> Result<TriageReport, String> {
    TicketMapper::new(SimulatedTracker::new())
        .create_tickets(defects, config)
        .map_err(|e| format!("Error creating tickets: {e}"))
}

/// Defects with the tracker references from a triage report applied
pub fn apply_triage(defects: &[Defect], report: &TriageReport) -> Vec<Defect> {
    defects
        .iter()
        .map(|defect| {
            report
                .outcomes
                .iter()
                .find_map(|outcome| match outcome {
                    webqa_report::TicketOutcome::Created { defect: linked, .. }
                        if linked.id == defect.id =>
                    {
                        Some(linked.clone())
                    }
                    _ => None,
                })
                .unwrap_or_else(|| defect.clone())
        })
        .collect()
}

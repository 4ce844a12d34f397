//! Execution collaborator seam and parallel runner
//!
//! Browser automation lives behind [`ExecutionBackend`]. The runner fans
//! specifications out over a rayon pool and always yields one
//! [`ExecutionResult`] per specification, in specification order.

use crate::error::{Error, Result};
use crate::result::{ExecutionResult, ExecutionStatus};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};
use webqa_gen::ids::SCOPE_RESULT;
use webqa_gen::{Clock, IdGenerator, SequentialIds, SystemClock, TestSpecification};

/// What a backend observed while running one specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Status reported by the framework runner
    pub status: ExecutionStatus,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Error text for failures
    pub error: Option<String>,
    /// Screenshot, trace or video reference
    pub artifact_ref: Option<String>,
}

impl ExecutionOutcome {
    /// Passing outcome
    #[must_use]
    pub fn pass(duration_ms: u64) -> Self {
        Self {
            status: ExecutionStatus::Passed,
            duration_ms,
            error: None,
            artifact_ref: None,
        }
    }

    /// Failing outcome
    #[must_use]
    pub fn fail(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            status: ExecutionStatus::Failed,
            duration_ms,
            error: Some(error.into()),
            artifact_ref: None,
        }
    }

    /// Skipped outcome
    #[must_use]
    pub fn skip() -> Self {
        Self {
            status: ExecutionStatus::Skipped,
            duration_ms: 0,
            error: None,
            artifact_ref: None,
        }
    }

    /// Attach an artifact reference
    #[must_use]
    pub fn with_artifact(mut self, artifact_ref: impl Into<String>) -> Self {
        self.artifact_ref = Some(artifact_ref.into());
        self
    }
}

/// Failure of the execution collaborator itself, as opposed to a failing test
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Browser or grid could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Framework runner crashed while running the specification
    #[error("runner crashed: {0}")]
    Crashed(String),
}

/// Runs a single test specification
///
/// Implementations must be shareable across worker threads.
pub trait ExecutionBackend: Send + Sync {
    /// Execute one specification
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the collaborator cannot produce an outcome.
    fn execute(
        &self,
        specification: &TestSpecification,
    ) -> std::result::Result<ExecutionOutcome, BackendError>;
}

/// Deterministic backend with scripted outcomes
///
/// Unscripted specifications pass, with a duration derived from the body length.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    scripted: HashMap<String, std::result::Result<ExecutionOutcome, BackendError>>,
}

impl SimulatedBackend {
    /// Create a backend where everything passes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for one specification
    #[must_use]
    pub fn with_outcome(mut self, specification_id: impl Into<String>, outcome: ExecutionOutcome) -> Self {
        self.scripted.insert(specification_id.into(), Ok(outcome));
        self
    }

    /// Script a failure with the given error text
    #[must_use]
    pub fn with_failure(self, specification_id: impl Into<String>, error: impl Into<String>) -> Self {
        self.with_outcome(specification_id, ExecutionOutcome::fail(error, 1_500))
    }

    /// Script a backend error for one specification
    #[must_use]
    pub fn with_backend_error(mut self, specification_id: impl Into<String>, error: BackendError) -> Self {
        self.scripted.insert(specification_id.into(), Err(error));
        self
    }

    /// Simulated duration for an unscripted specification
    #[must_use]
    pub fn simulated_duration(specification: &TestSpecification) -> u64 {
        200 + (specification.body.len() as u64 * 7) % 1_800
    }
}

impl ExecutionBackend for SimulatedBackend {
    fn execute(
        &self,
        specification: &TestSpecification,
    ) -> std::result::Result<ExecutionOutcome, BackendError> {
        self.scripted.get(&specification.id).cloned().unwrap_or_else(|| {
            Ok(ExecutionOutcome::pass(Self::simulated_duration(specification)))
        })
    }
}

/// Parallel runner configuration
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads
    pub num_workers: usize,
    /// Skip remaining specifications after the first failure
    pub stop_on_failure: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get().min(4),
            stop_on_failure: false,
        }
    }
}

impl ParallelConfig {
    /// Set the worker count (at least one)
    #[must_use]
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Enable or disable stop-on-failure
    #[must_use]
    pub const fn with_stop_on_failure(mut self, enabled: bool) -> Self {
        self.stop_on_failure = enabled;
        self
    }
}

/// Results of one parallel run
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// One result per specification, in specification order
    pub results: Vec<ExecutionResult>,
    /// Number of passed specifications
    pub passed: usize,
    /// Number of failed specifications
    pub failed: usize,
    /// Number of skipped specifications
    pub skipped: usize,
    /// Total wall time in milliseconds
    pub duration_ms: u64,
    /// Whether stop-on-failure cut the run short
    pub stopped_early: bool,
}

/// Fans specifications out over a rayon pool
pub struct ParallelRunner {
    config: ParallelConfig,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for ParallelRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ParallelRunner {
    fn default() -> Self {
        Self::new(ParallelConfig::default())
    }
}

impl ParallelRunner {
    /// Create a runner with sequential IDs and the system clock
    #[must_use]
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            config,
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

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Execute every specification
    ///
    /// # Errors
    ///
    /// Returns `Error::Execution` if the worker pool cannot be built.
    /// Backend errors never fail the run; they become failed results.
    pub fn run<B: ExecutionBackend + ?Sized>(
        &self,
        backend: &B,
        specifications: &[TestSpecification],
    ) -> Result<ExecutionReport> {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_workers.max(1))
            .build()
            .map_err(|e| Error::Execution(e.to_string()))?;
        let stop_flag = AtomicBool::new(false);

        let results: Vec<ExecutionResult> = pool.install(|| {
            specifications
                .par_iter()
                .enumerate()
                .map(|(index, spec)| {
                    if self.config.stop_on_failure && stop_flag.load(Ordering::Relaxed) {
                        return ExecutionResult::skipped(
                            self.result_id(index, spec),
                            &spec.id,
                            self.clock.now(),
                        );
                    }
                    let result = self.run_one(backend, index, spec);
                    if result.is_failed() && self.config.stop_on_failure {
                        stop_flag.store(true, Ordering::Relaxed);
                    }
                    result
                })
                .collect()
        });

        let count = |status: ExecutionStatus| results.iter().filter(|r| r.status == status).count();
        let report = ExecutionReport {
            passed: count(ExecutionStatus::Passed),
            failed: count(ExecutionStatus::Failed),
            skipped: count(ExecutionStatus::Skipped),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            stopped_early: stop_flag.load(Ordering::Relaxed),
            results,
        };
        info!(
            total = report.results.len(),
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            workers = self.config.num_workers,
            "execution finished"
        );
        Ok(report)
    }

    /// Execute one specification at batch position `index`
    pub fn run_one<B: ExecutionBackend + ?Sized>(
        &self,
        backend: &B,
        index: usize,
        spec: &TestSpecification,
    ) -> ExecutionResult {
        let id = self.result_id(index, spec);
        let now = self.clock.now();
        let result = match backend.execute(spec) {
            Ok(outcome) => {
                let result = match outcome.status {
                    ExecutionStatus::Passed => {
                        ExecutionResult::passed(id, &spec.id, outcome.duration_ms, now)
                    }
                    ExecutionStatus::Failed => ExecutionResult::failed(
                        id,
                        &spec.id,
                        outcome.error,
                        outcome.duration_ms,
                        now,
                    ),
                    ExecutionStatus::Skipped => ExecutionResult::skipped(id, &spec.id, now),
                };
                match outcome.artifact_ref {
                    Some(artifact) => result.with_artifact(artifact),
                    None => result,
                }
            }
            Err(err) => ExecutionResult::failed(
                id,
                &spec.id,
                Some(format!("Execution backend error: {err}")),
                0,
                now,
            ),
        };
        debug!(specification_id = %spec.id, status = %result.status, duration_ms = result.duration_ms, "specification executed");
        result
    }

    fn result_id(&self, index: usize, spec: &TestSpecification) -> String {
        self.ids.generate(SCOPE_RESULT, index, spec.kind.tag())
    }
}

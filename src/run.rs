//! Run-scoped store
//!
//! A [`QaRun`] owns one consistent generation of elements, specifications,
//! results, defects and tickets. Replacing an upstream set discards everything
//! derived from it, so nothing ever references another generation.
//! Defects change only through [`QaRun::transition_defect`],
//! [`QaRun::set_tracker_ref`] and ticket creation, each of which swaps in the
//! new value returned by the defect's own transition function.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use tracing::info;
use webqa_gen::{Element, SynthesisAnomaly, SynthesisConfig, TestSpecification, TestSynthesizer};
use webqa_report::{
    ExportDocument, RunSummary, Ticket, TicketMapper, TicketOutcome, TrackerClient, TrackerConfig,
    TriageReport, summarize,
};
use webqa_runner::{
    ClassificationAnomaly, ClassifierConfig, Defect, DefectClassifier, DefectStatus,
    ExecutionBackend, ExecutionResult, ParallelRunner, ProbeFinding, dedupe_defects,
};

/// One consistent generation of run artifacts
#[derive(Debug, Clone, Default)]
pub struct QaRun {
    elements: Vec<Element>,
    specifications: Vec<TestSpecification>,
    results: Vec<ExecutionResult>,
    defects: Vec<Defect>,
    tickets: Vec<Ticket>,
    synthesis_anomalies: Vec<SynthesisAnomaly>,
    classification_anomalies: Vec<ClassificationAnomaly>,
}

impl QaRun {
    /// Create an empty run
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovered elements
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Synthesized specifications
    #[must_use]
    pub fn specifications(&self) -> &[TestSpecification] {
        &self.specifications
    }

    /// Recorded execution results
    #[must_use]
    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    /// Current defects
    #[must_use]
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    /// Tickets created in this run
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Anomalies from the last synthesis
    #[must_use]
    pub fn synthesis_anomalies(&self) -> &[SynthesisAnomaly] {
        &self.synthesis_anomalies
    }

    /// Anomalies from the last classification
    #[must_use]
    pub fn classification_anomalies(&self) -> &[ClassificationAnomaly] {
        &self.classification_anomalies
    }

    /// Look up a defect
    #[must_use]
    pub fn defect(&self, id: &str) -> Option<&Defect> {
        self.defects.iter().find(|d| d.id == id)
    }

    /// Synthesize specifications for a new element set
    ///
    /// Replaces the whole generation.
    ///
    /// # Errors
    ///
    /// Returns an error when the synthesis configuration is invalid; the run
    /// is left unchanged.
    pub fn synthesize(
        &mut self,
        synthesizer: &TestSynthesizer,
        elements: Vec<Element>,
        config: &SynthesisConfig,
    ) -> Result<&[TestSpecification]> {
        let output = synthesizer.synthesize(&elements, config)?;
        self.reset();
        self.elements = elements;
        self.specifications = output.specifications;
        self.synthesis_anomalies = output.anomalies;
        Ok(&self.specifications)
    }

    /// Execute every specification
    ///
    /// Replaces results and everything derived from them.
    ///
    /// # Errors
    ///
    /// Returns an error if the runner cannot start.
    pub fn execute<B: ExecutionBackend + ?Sized>(
        &mut self,
        runner: &ParallelRunner,
        backend: &B,
    ) -> Result<&[ExecutionResult]> {
        let report = runner.run(backend, &self.specifications)?;
        self.record_results(report.results);
        Ok(&self.results)
    }

    /// Record results produced by an external execution collaborator
    ///
    /// Replaces results and everything derived from them.
    pub fn record_results(&mut self, results: Vec<ExecutionResult>) {
        self.results = results;
        self.clear_defects();
    }

    /// Classify the recorded results and probe findings
    ///
    /// Replaces defects and tickets.
    ///
    /// # Errors
    ///
    /// Returns an error when the classifier configuration is invalid.
    pub fn classify(
        &mut self,
        classifier: &DefectClassifier,
        config: &ClassifierConfig,
        findings: &[ProbeFinding],
    ) -> Result<&[Defect]> {
        let classification =
            classifier.classify(&self.results, &self.specifications, config, findings)?;
        self.clear_defects();
        self.defects = classification.defects;
        self.classification_anomalies = classification.anomalies;
        Ok(&self.defects)
    }

    /// Move a defect to a new status
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownReference` for a missing defect, or the
    /// lifecycle error for a forbidden transition.
    pub fn transition_defect(
        &mut self,
        id: &str,
        status: DefectStatus,
        at: DateTime<Utc>,
    ) -> Result<&Defect> {
        let slot = self.defect_slot(id)?;
        *slot = slot.transition(status, at)?;
        Ok(slot)
    }

    /// Record a tracker reference on a defect
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownReference` for a missing defect.
    pub fn set_tracker_ref(
        &mut self,
        id: &str,
        key: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<&Defect> {
        let slot = self.defect_slot(id)?;
        *slot = slot.with_tracker_ref(key, at);
        Ok(slot)
    }

    /// Create a ticket for one defect
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownReference` for a missing defect, or the mapper's
    /// configuration/tracker error; on error the defect is unchanged.
    pub fn create_ticket<C: TrackerClient>(
        &mut self,
        mapper: &TicketMapper<C>,
        defect_id: &str,
        config: &TrackerConfig,
    ) -> Result<TicketOutcome> {
        let slot = self.defect_slot(defect_id)?;
        let outcome = mapper.create_ticket(slot, config)?;
        if let TicketOutcome::Created { ticket, defect } = &outcome {
            *slot = defect.clone();
            self.tickets.push(ticket.clone());
        }
        Ok(outcome)
    }

    /// Create tickets for every defect, optionally one per
    /// `(sourceUrl, elementRef, category)` group
    ///
    /// # Errors
    ///
    /// Returns the configuration error before any call when the tracker
    /// configuration is invalid.
    pub fn create_tickets<C: TrackerClient>(
        &mut self,
        mapper: &TicketMapper<C>,
        config: &TrackerConfig,
        dedupe: bool,
    ) -> Result<TriageReport> {
        let targets: Vec<Defect> = if dedupe {
            dedupe_defects(&self.defects).into_iter().cloned().collect()
        } else {
            self.defects.clone()
        };
        let report = mapper.create_tickets(&targets, config)?;
        for outcome in &report.outcomes {
            if let TicketOutcome::Created { ticket, defect } = outcome {
                if let Some(slot) = self.defects.iter_mut().find(|d| d.id == defect.id) {
                    *slot = defect.clone();
                }
                self.tickets.push(ticket.clone());
            }
        }
        Ok(report)
    }

    /// Aggregated counts for the current defects and specifications
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        summarize(&self.defects, &self.specifications)
    }

    /// Export document for the current generation
    #[must_use]
    pub fn export(&self, generated_at: DateTime<Utc>) -> ExportDocument {
        ExportDocument::new(&self.defects, &self.specifications, generated_at)
    }

    /// Discard every artifact of the run
    pub fn reset(&mut self) {
        if !self.elements.is_empty() || !self.defects.is_empty() {
            info!(
                elements = self.elements.len(),
                specifications = self.specifications.len(),
                defects = self.defects.len(),
                tickets = self.tickets.len(),
                "run reset"
            );
        }
        *self = Self::default();
    }

    fn clear_defects(&mut self) {
        self.defects.clear();
        self.tickets.clear();
        self.classification_anomalies.clear();
    }

    fn defect_slot(&mut self, id: &str) -> Result<&mut Defect> {
        self.defects
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::UnknownReference {
                kind: "defect",
                id: id.to_string(),
            })
    }
}

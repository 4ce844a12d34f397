//! Ticket creation
//!
//! Turns a defect into at most one tracker ticket. A defect that already
//! carries a tracker reference is never sent again; a failed tracker call
//! leaves the defect untouched so it can be retried.

use crate::error::{Error, Result};
use crate::tracker::{TicketRequest, TrackerClient, TrackerConfig, TrackerError};
use crate::triage::{TrackerPriority, build_ticket_body, map_priority, ticket_labels, ticket_summary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};
use webqa_gen::ids::SCOPE_TICKET;
use webqa_gen::{Clock, IdGenerator, SequentialIds, SystemClock};
use webqa_runner::Defect;

/// A ticket created on the external tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Local ticket ID
    pub id: String,
    /// Tracker key, e.g. `WEB-12`
    pub external_key: String,
    /// One-line summary
    pub summary: String,
    /// Markdown body
    pub body: String,
    /// Tracker priority
    pub priority: TrackerPriority,
    /// Tracker workflow status
    pub status: String,
    /// Reporter copied from the defect
    pub reporter: String,
    /// Creation time on the tracker side
    pub created_at: DateTime<Utc>,
    /// Browse URL
    pub external_url: String,
}

/// Result of a ticket-creation call
#[derive(Debug, Clone, PartialEq)]
pub enum TicketOutcome {
    /// A new ticket exists and the defect now references it
    Created {
        /// The new ticket
        ticket: Ticket,
        /// The defect with `trackerRef` set
        defect: Defect,
    },
    /// The defect was already linked; nothing was sent
    AlreadyLinked {
        /// Existing tracker reference
        tracker_ref: String,
    },
}

impl TicketOutcome {
    /// Tracker reference after the call
    #[must_use]
    pub fn tracker_ref(&self) -> &str {
        match self {
            Self::Created { ticket, .. } => &ticket.external_key,
            Self::AlreadyLinked { tracker_ref } => tracker_ref,
        }
    }
}

/// Outcome of a batch: per-defect tracker failures do not stop the batch
#[derive(Debug, Clone, Default)]
pub struct TriageReport {
    /// Successful or no-op calls, in input order
    pub outcomes: Vec<TicketOutcome>,
    /// Defects whose tracker call failed, with the reason
    pub failures: Vec<(String, TrackerError)>,
}

/// Build the tracker request for a defect
#[must_use]
pub fn build_request(defect: &Defect, config: &TrackerConfig) -> TicketRequest {
    TicketRequest {
        summary: ticket_summary(defect),
        body: build_ticket_body(defect),
        priority: map_priority(defect.severity),
        issue_type: config.issue_type.clone(),
        project_key: config.project_key.clone(),
        labels: ticket_labels(defect, &config.labels),
    }
}

/// Maps defects to tracker tickets through a [`TrackerClient`]
pub struct TicketMapper<C> {
    client: C,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    issued: AtomicUsize,
}

impl<C: std::fmt::Debug> std::fmt::Debug for TicketMapper<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketMapper")
            .field("client", &self.client)
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}

impl<C: TrackerClient> TicketMapper<C> {
    /// Create a mapper with sequential IDs and the system clock
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            ids: Box::new(SequentialIds),
            clock: Box::new(SystemClock),
            issued: AtomicUsize::new(0),
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

    /// Get the tracker client
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create a ticket for one defect
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` (call not attempted) when the tracker
    /// configuration is invalid, or `Error::ExternalCall` when the tracker
    /// fails. In both cases the caller's defect is unchanged.
    pub fn create_ticket(&self, defect: &Defect, config: &TrackerConfig) -> Result<TicketOutcome> {
        if let Some(tracker_ref) = &defect.tracker_ref {
            info!(defect_id = %defect.id, %tracker_ref, "defect already linked; not re-sent");
            return Ok(TicketOutcome::AlreadyLinked {
                tracker_ref: tracker_ref.clone(),
            });
        }
        config.validate()?;

        let request = build_request(defect, config);
        let response = self.client.create_issue(config, &request).map_err(|e| {
            warn!(defect_id = %defect.id, error = %e, "tracker call failed; defect left open");
            Error::ExternalCall(e)
        })?;

        let index = self.issued.fetch_add(1, Ordering::SeqCst);
        let ticket = Ticket {
            id: self.ids.generate(SCOPE_TICKET, index, "ticket"),
            external_key: response.external_key,
            summary: request.summary,
            body: request.body,
            priority: request.priority,
            status: response.status,
            reporter: defect.reporter.clone(),
            created_at: response.created_at,
            external_url: response.url,
        };
        let defect = defect.with_tracker_ref(&ticket.external_key, self.clock.now());
        info!(defect_id = %defect.id, key = %ticket.external_key, priority = %ticket.priority, "ticket created");
        Ok(TicketOutcome::Created { ticket, defect })
    }

    /// Create tickets for a batch of defects
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` before any call when the configuration
    /// is invalid. Tracker failures are collected per defect.
    pub fn create_tickets(&self, defects: &[Defect], config: &TrackerConfig) -> Result<TriageReport> {
        config.validate()?;
        let mut report = TriageReport::default();
        for defect in defects {
            match self.create_ticket(defect, config) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(Error::ExternalCall(e)) => report.failures.push((defect.id.clone(), e)),
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::SimulatedTracker;
    use webqa_gen::FixedClock;
    use webqa_runner::{DefectCategory, DefectStatus, Severity};

    fn config() -> TrackerConfig {
        TrackerConfig {
            base_url: "https://tracker.example.com".to_string(),
            email: "qa@example.com".to_string(),
            api_token: "secret".to_string(),
            project_key: "WEB".to_string(),
            issue_type: "Bug".to_string(),
            labels: vec!["regression".to_string()],
        }
    }

    fn defect(id: &str, severity: Severity) -> Defect {
        Defect {
            id: id.to_string(),
            title: "Slow page load on https://shop.test/".to_string(),
            description: "Page took 4500 ms".to_string(),
            severity,
            status: DefectStatus::Open,
            category: DefectCategory::Performance,
            source_url: "https://shop.test/".to_string(),
            element_ref: None,
            artifact_ref: None,
            repro_steps: vec!["Navigate to https://shop.test/".to_string()],
            expected: "Page loads within 3000 ms".to_string(),
            actual: "Page loaded in 4500 ms".to_string(),
            specification_id: None,
            tracker_ref: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            reporter: "webqa".to_string(),
        }
    }

    fn mapper() -> TicketMapper<SimulatedTracker> {
        TicketMapper::new(SimulatedTracker::new().with_clock(FixedClock::epoch()))
            .with_clock(FixedClock::at(2026, 1, 2, 3, 4, 5))
    }

    #[test]
    fn test_create_ticket_links_defect() {
        let mapper = mapper();
        let original = defect("bug-0000-performance", Severity::Major);
        let outcome = mapper.create_ticket(&original, &config()).unwrap();

        let TicketOutcome::Created { ticket, defect } = outcome else {
            panic!("expected a created ticket");
        };
        assert_eq!(ticket.external_key, "WEB-1");
        assert_eq!(ticket.id, "tkt-0000-ticket");
        assert_eq!(ticket.priority, TrackerPriority::High);
        assert_eq!(ticket.summary, "[Major] Slow page load on https://shop.test/");
        assert_eq!(ticket.external_url, "https://tracker.example.com/browse/WEB-1");
        assert_eq!(defect.tracker_ref.as_deref(), Some("WEB-1"));
        assert_eq!(defect.updated_at, FixedClock::at(2026, 1, 2, 3, 4, 5).0);
        assert!(original.tracker_ref.is_none());

        let sent = mapper.client().sent();
        assert_eq!(
            sent[0].labels,
            vec![
                "regression",
                "category:performance",
                "severity:major",
                "webqa-automated"
            ]
        );
    }

    #[test]
    fn test_create_ticket_is_idempotent() {
        let mapper = mapper();
        let outcome = mapper
            .create_ticket(&defect("bug-1", Severity::Minor), &config())
            .unwrap();
        let TicketOutcome::Created { defect: linked, .. } = outcome else {
            panic!("expected a created ticket");
        };

        let again = mapper.create_ticket(&linked, &config()).unwrap();
        assert_eq!(
            again,
            TicketOutcome::AlreadyLinked {
                tracker_ref: "WEB-1".to_string()
            }
        );
        assert_eq!(mapper.client().sent().len(), 1);
    }

    #[test]
    fn test_invalid_config_is_not_attempted() {
        let mapper = mapper();
        let bad = TrackerConfig {
            base_url: String::new(),
            api_token: String::new(),
            ..config()
        };
        let err = mapper
            .create_ticket(&defect("bug-1", Severity::Critical), &bad)
            .unwrap_err();
        match err {
            Error::Configuration { violations } => assert!(violations.len() >= 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(mapper.client().sent().is_empty());
    }

    #[test]
    fn test_tracker_failure_leaves_defect_open() {
        let mapper = TicketMapper::new(
            SimulatedTracker::new().failing(TrackerError::Unavailable("timeout".to_string())),
        );
        let original = defect("bug-1", Severity::Critical);
        let err = mapper.create_ticket(&original, &config()).unwrap_err();
        assert!(matches!(err, Error::ExternalCall(_)));
        assert_eq!(original.status, DefectStatus::Open);
        assert!(original.tracker_ref.is_none());
    }

    #[test]
    fn test_batch_collects_failures() {
        let mapper = TicketMapper::new(SimulatedTracker::new().failing(TrackerError::Unauthorized));
        let defects = vec![defect("bug-1", Severity::Major), defect("bug-2", Severity::Minor)];
        let report = mapper.create_tickets(&defects, &config()).unwrap();
        assert!(report.outcomes.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].0, "bug-1");
    }

    #[test]
    fn test_batch_mixes_created_and_linked() {
        let mapper = mapper();
        let mut linked = defect("bug-2", Severity::Minor);
        linked.tracker_ref = Some("WEB-99".to_string());
        let defects = vec![defect("bug-1", Severity::Trivial), linked];
        let report = mapper.create_tickets(&defects, &config()).unwrap();

        let refs: Vec<&str> = report.outcomes.iter().map(TicketOutcome::tracker_ref).collect();
        assert_eq!(refs, vec!["WEB-1", "WEB-99"]);
        assert!(report.failures.is_empty());
    }
}

//! Defect model and lifecycle
//!
//! Severity and category are fixed when a defect is classified. Only the
//! status and tracker reference change afterwards, and each change returns a
//! new `Defect` value.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Defect severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks core functionality
    Critical,
    /// Significant breakage
    Major,
    /// Limited impact
    Minor,
    /// Cosmetic
    Trivial,
}

impl Severity {
    /// Get all severities, most severe first
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::Critical, Self::Major, Self::Minor, Self::Trivial]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Trivial => write!(f, "trivial"),
        }
    }
}

/// Defect category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefectCategory {
    /// Behavior is wrong
    Functional,
    /// Rendering or layout is wrong
    Ui,
    /// Too slow
    Performance,
    /// Security weakness
    Security,
    /// Hard to use or inaccessible
    Usability,
}

impl DefectCategory {
    /// Get all categories
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Functional,
            Self::Ui,
            Self::Performance,
            Self::Security,
            Self::Usability,
        ]
    }
}

impl std::fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Functional => write!(f, "functional"),
            Self::Ui => write!(f, "ui"),
            Self::Performance => write!(f, "performance"),
            Self::Security => write!(f, "security"),
            Self::Usability => write!(f, "usability"),
        }
    }
}

/// Triage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefectStatus {
    /// Newly reported
    Open,
    /// Being worked on
    InProgress,
    /// Fixed, awaiting verification
    Resolved,
    /// Verified or dismissed
    Closed,
}

impl DefectStatus {
    /// Whether the lifecycle allows moving from `self` to `next`
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::InProgress | Self::Resolved | Self::Closed)
                | (Self::InProgress, Self::Open | Self::Resolved | Self::Closed)
                | (Self::Resolved, Self::Closed | Self::Open)
                | (Self::Closed, Self::Open)
        )
    }
}

impl std::fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// A classified issue derived from a failed result or a probe finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    /// Unique defect ID
    pub id: String,
    /// One-line title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Severity
    pub severity: Severity,
    /// Triage status
    pub status: DefectStatus,
    /// Category
    pub category: DefectCategory,
    /// Page the defect was observed on
    pub source_url: String,
    /// Element involved, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_ref: Option<String>,
    /// Screenshot, trace or diff image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<String>,
    /// Ordered reproduction steps
    pub repro_steps: Vec<String>,
    /// Expected behavior
    pub expected: String,
    /// Observed behavior
    pub actual: String,
    /// Failing specification; `None` for probe findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_id: Option<String>,
    /// External tracker key once a ticket exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_ref: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last change time
    pub updated_at: DateTime<Utc>,
    /// Who reported the defect
    pub reporter: String,
}

impl Defect {
    /// Move to `status`, returning the updated defect
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` when the lifecycle forbids the move.
    pub fn transition(&self, status: DefectStatus, at: DateTime<Utc>) -> Result<Self> {
        if !self.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: status,
            });
        }
        Ok(Self {
            status,
            updated_at: at,
            ..self.clone()
        })
    }

    /// Link to an external tracker ticket, returning the updated defect
    #[must_use]
    pub fn with_tracker_ref(&self, key: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            tracker_ref: Some(key.into()),
            updated_at: at,
            ..self.clone()
        }
    }

    /// Key used when collapsing defects that describe the same symptom
    #[must_use]
    pub fn dedupe_key(&self) -> (&str, Option<&str>, DefectCategory) {
        (
            self.source_url.as_str(),
            self.element_ref.as_deref(),
            self.category,
        )
    }

    /// Whether two defects have the same content, ignoring identifiers
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        Self {
            id: String::new(),
            ..self.clone()
        } == Self {
            id: String::new(),
            ..other.clone()
        }
    }
}

/// First defect of every `(sourceUrl, elementRef, category)` group, in input order
#[must_use]
pub fn dedupe_defects(defects: &[Defect]) -> Vec<&Defect> {
    let mut seen = HashSet::new();
    defects
        .iter()
        .filter(|d| seen.insert(d.dedupe_key()))
        .collect()
}

//! Probe findings
//!
//! Visual, performance and accessibility auditors are external. Their
//! measurements arrive as [`ProbeFinding`]s and are compared against the
//! classifier thresholds; they are never tied to a test specification.

use serde::{Deserialize, Serialize};

/// One measurement reported by an auditor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "probe", rename_all = "kebab-case")]
pub enum ProbeFinding {
    /// Fraction of pixels differing from the baseline screenshot
    #[serde(rename_all = "camelCase")]
    VisualDiff {
        /// Page that was compared
        url: String,
        /// Element the diff was scoped to, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_ref: Option<String>,
        /// Differing pixel ratio in `[0, 1]`
        diff_ratio: f64,
        /// Diff image reference
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact_ref: Option<String>,
    },
    /// Page load time
    #[serde(rename_all = "camelCase")]
    LoadTime {
        /// Page that was loaded
        url: String,
        /// Load time in milliseconds
        load_time_ms: u64,
    },
    /// Accessibility audit score
    #[serde(rename_all = "camelCase")]
    Accessibility {
        /// Page that was audited
        url: String,
        /// Score in `[0, 100]`
        score: f64,
        /// Rule violations reported by the auditor
        #[serde(default)]
        violations: Vec<String>,
    },
}

/// Which probe produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Visual regression
    Visual,
    /// Performance
    Performance,
    /// Accessibility
    Accessibility,
}

impl ProbeKind {
    /// Defect ID tag for findings of this kind
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Performance => "performance",
            Self::Accessibility => "a11y",
        }
    }
}

impl ProbeFinding {
    /// Probe kind
    #[must_use]
    pub const fn kind(&self) -> ProbeKind {
        match self {
            Self::VisualDiff { .. } => ProbeKind::Visual,
            Self::LoadTime { .. } => ProbeKind::Performance,
            Self::Accessibility { .. } => ProbeKind::Accessibility,
        }
    }

    /// Page the finding applies to
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::VisualDiff { url, .. }
            | Self::LoadTime { url, .. }
            | Self::Accessibility { url, .. } => url,
        }
    }
}

/// Deterministic stand-in for the external auditors
///
/// Each reading is derived from the URL so the same page always yields the
/// same findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedProbes;

impl SimulatedProbes {
    /// Produce one finding per probe kind for `url`
    #[must_use]
    pub fn audit(&self, url: &str) -> Vec<ProbeFinding> {
        let seed = url
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        vec![
            ProbeFinding::VisualDiff {
                url: url.to_string(),
                element_ref: None,
                diff_ratio: (seed % 100) as f64 / 1000.0,
                artifact_ref: Some("visual/diff.png".to_string()),
            },
            ProbeFinding::LoadTime {
                url: url.to_string(),
                load_time_ms: 800 + seed % 4_000,
            },
            ProbeFinding::Accessibility {
                url: url.to_string(),
                score: 70.0 + (seed % 31) as f64,
                violations: vec!["image-alt".to_string(), "color-contrast".to_string()],
            },
        ]
    }
}

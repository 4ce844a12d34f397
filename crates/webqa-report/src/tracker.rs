//! Issue tracker seam
//!
//! The HTTP client for the tracker is external; it sits behind
//! [`TrackerClient`]. This module owns the tracker configuration, its
//! validation and the request/response contract.

use crate::error::{Error, Result};
use crate::triage::TrackerPriority;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex};
use url::Url;
use webqa_gen::{Clock, SystemClock};

/// Environment variable that overrides `apiToken`
pub const TOKEN_ENV_VAR: &str = "WEBQA_TRACKER_TOKEN";

/// Loose `local@domain.tld` shape check
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Pattern is a literal, unwrap cannot fail
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// Tracker connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Tracker base URL
    #[serde(default)]
    pub base_url: String,
    /// Account email
    #[serde(default)]
    pub email: String,
    /// API token
    #[serde(default)]
    pub api_token: String,
    /// Project key, e.g. `WEB`
    #[serde(default)]
    pub project_key: String,
    /// Issue type, e.g. `Bug`
    #[serde(default)]
    pub issue_type: String,
    /// Labels added to every ticket
    #[serde(default)]
    pub labels: Vec<String>,
}

/// One problem with a tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigViolation {
    /// Offending field, in its serialized name
    pub field: String,
    /// What is wrong
    pub message: String,
}

impl ConfigViolation {
    /// Create a violation
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

impl TrackerConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Replace the API token when `token` is set
    #[must_use]
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token {
            self.api_token = token;
        }
        self
    }

    /// Every problem with this configuration; empty when valid
    #[must_use]
    pub fn violations(&self) -> Vec<ConfigViolation> {
        let mut violations = Vec::new();

        if self.base_url.trim().is_empty() {
            violations.push(ConfigViolation::new("baseUrl", "must not be empty"));
        } else {
            match Url::parse(&self.base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => violations.push(ConfigViolation::new(
                    "baseUrl",
                    format!("must use http or https, got {}", url.scheme()),
                )),
                Err(e) => violations.push(ConfigViolation::new(
                    "baseUrl",
                    format!("must be an absolute URL ({e})"),
                )),
            }
        }

        if self.email.trim().is_empty() {
            violations.push(ConfigViolation::new("email", "must not be empty"));
        } else if !EMAIL_REGEX.is_match(&self.email) {
            violations.push(ConfigViolation::new("email", "must be a valid email address"));
        }

        for (field, value) in [
            ("apiToken", &self.api_token),
            ("projectKey", &self.project_key),
            ("issueType", &self.issue_type),
        ] {
            if value.trim().is_empty() {
                violations.push(ConfigViolation::new(field, "must not be empty"));
            }
        }

        violations
    }

    /// Check the configuration, reporting every violation together
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` listing all violations.
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration { violations })
        }
    }

    /// Browse URL for an issue key
    #[must_use]
    pub fn issue_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url.trim_end_matches('/'))
    }
}

/// Ticket-creation request sent to the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    /// One-line summary
    pub summary: String,
    /// Markdown body
    pub body: String,
    /// Tracker priority
    pub priority: TrackerPriority,
    /// Issue type
    pub issue_type: String,
    /// Project key
    pub project_key: String,
    /// Labels
    pub labels: Vec<String>,
}

/// Tracker reply to a successful creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    /// Issue key, e.g. `WEB-12`
    pub external_key: String,
    /// Initial workflow status
    pub status: String,
    /// Creation time on the tracker side
    pub created_at: DateTime<Utc>,
    /// Browse URL
    pub url: String,
}

/// Failure of the tracker collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// Tracker could not be reached
    #[error("tracker unavailable: {0}")]
    Unavailable(String),

    /// Credentials were refused
    #[error("tracker refused credentials")]
    Unauthorized,

    /// Tracker rejected the request
    #[error("tracker rejected request: {0}")]
    Rejected(String),
}

/// Sink for ticket-creation requests
pub trait TrackerClient: Send + Sync {
    /// Create one issue
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` when the tracker cannot create the issue.
    fn create_issue(
        &self,
        config: &TrackerConfig,
        request: &TicketRequest,
    ) -> std::result::Result<TicketResponse, TrackerError>;
}

/// In-memory tracker issuing `<PROJECT>-<n>` keys
pub struct SimulatedTracker {
    next: AtomicUsize,
    failure: Option<TrackerError>,
    clock: Box<dyn Clock>,
    sent: Mutex<Vec<TicketRequest>>,
}

impl std::fmt::Debug for SimulatedTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedTracker")
            .field("next", &self.next)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTracker {
    /// Create a tracker whose first key is `<PROJECT>-1`
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(1),
            failure: None,
            clock: Box::new(SystemClock),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Make every call fail with `error`
    #[must_use]
    pub fn failing(mut self, error: TrackerError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Use a custom clock for `createdAt`
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Requests accepted so far
    #[must_use]
    pub fn sent(&self) -> Vec<TicketRequest> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl TrackerClient for SimulatedTracker {
    fn create_issue(
        &self,
        config: &TrackerConfig,
        request: &TicketRequest,
    ) -> std::result::Result<TicketResponse, TrackerError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let key = format!("{}-{n}", request.project_key);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
        Ok(TicketResponse {
            url: config.issue_url(&key),
            external_key: key,
            status: "Open".to_string(),
            created_at: self.clock.now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> TrackerConfig {
        TrackerConfig {
            base_url: "https://tracker.example.com/".to_string(),
            email: "qa@example.com".to_string(),
            api_token: "secret".to_string(),
            project_key: "WEB".to_string(),
            issue_type: "Bug".to_string(),
            labels: vec!["qa".to_string()],
        }
    }

    fn request() -> TicketRequest {
        TicketRequest {
            summary: "[Major] x".to_string(),
            body: "body".to_string(),
            priority: TrackerPriority::High,
            issue_type: "Bug".to_string(),
            project_key: "WEB".to_string(),
            labels: vec![],
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_base_url_and_token_report_both() {
        let config = TrackerConfig {
            base_url: String::new(),
            api_token: String::new(),
            ..valid_config()
        };
        let violations = config.violations();
        assert!(violations.len() >= 2);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"baseUrl"));
        assert!(fields.contains(&"apiToken"));
    }

    #[test]
    fn test_all_five_checks_reported() {
        let violations = TrackerConfig::default().violations();
        assert_eq!(violations.len(), 5);
    }

    #[test]
    fn test_invalid_email_and_relative_url() {
        let config = TrackerConfig {
            base_url: "tracker.example.com".to_string(),
            email: "not-an-email".to_string(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        match err {
            Error::Configuration { violations } => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].field, "baseUrl");
                assert_eq!(violations[1].field, "email");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_token_override() {
        let config = valid_config().with_token_override(Some("from-env".to_string()));
        assert_eq!(config.api_token, "from-env");
        let config = config.with_token_override(None);
        assert_eq!(config.api_token, "from-env");
    }

    #[test]
    fn test_config_yaml() {
        let yaml = "baseUrl: https://tracker.example.com\nemail: qa@example.com\napiToken: t\nprojectKey: WEB\nissueType: Bug\n";
        let config: TrackerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.labels.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulated_tracker_keys() {
        let tracker = SimulatedTracker::new();
        let config = valid_config();
        let a = tracker.create_issue(&config, &request()).unwrap();
        let b = tracker.create_issue(&config, &request()).unwrap();
        assert_eq!(a.external_key, "WEB-1");
        assert_eq!(b.external_key, "WEB-2");
        assert_eq!(a.url, "https://tracker.example.com/browse/WEB-1");
        assert_eq!(tracker.sent().len(), 2);
    }

    #[test]
    fn test_simulated_tracker_failure() {
        let tracker = SimulatedTracker::new().failing(TrackerError::Unauthorized);
        let err = tracker.create_issue(&valid_config(), &request()).unwrap_err();
        assert_eq!(err, TrackerError::Unauthorized);
        assert!(tracker.sent().is_empty());
    }
}

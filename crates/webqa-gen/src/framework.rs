//! Target automation frameworks

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Automation framework a specification body is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Playwright test runner (TypeScript)
    Playwright,
    /// Selenium WebDriver (Python, pytest)
    Selenium,
    /// Cypress (JavaScript)
    Cypress,
}

impl Framework {
    /// Get all frameworks
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Playwright, Self::Selenium, Self::Cypress]
    }

    /// File name for a specification body
    #[must_use]
    pub fn file_name(&self, spec_id: &str) -> String {
        match self {
            Self::Playwright => format!("{spec_id}.spec.ts"),
            Self::Selenium => format!("test_{}.py", python_identifier(spec_id)),
            Self::Cypress => format!("{spec_id}.cy.js"),
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Playwright => write!(f, "playwright"),
            Self::Selenium => write!(f, "selenium"),
            Self::Cypress => write!(f, "cypress"),
        }
    }
}

impl FromStr for Framework {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playwright" => Ok(Self::Playwright),
            "selenium" => Ok(Self::Selenium),
            "cypress" => Ok(Self::Cypress),
            _ => Err(Error::UnsupportedFramework(s.to_string())),
        }
    }
}

/// Lowercase identifier safe for Python function and module names
#[must_use]
pub fn python_identifier(raw: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

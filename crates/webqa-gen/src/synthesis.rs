//! Test synthesis
//!
//! Maps discovered elements to framework-specific test specifications.
//!
//! Per-element rules are applied independently and in input order:
//!
//! | Element | Specifications |
//! |---------|----------------|
//! | button  | click (functional, high) |
//! | input   | fill (functional, medium), plus fill-empty when negative tests are on |
//! | link    | navigate (functional, low) |
//! | form    | submit (integration, high) |
//! | other   | none, reported as an anomaly |
//!
//! When at least one form is present a single workflow specification
//! (integration, high) covering every input element is appended.

use crate::element::{Element, ElementId, ElementKind, duplicate_ids};
use crate::error::{Error, Result};
use crate::framework::{Framework, python_identifier};
use crate::ids::{IdGenerator, SCOPE_SPECIFICATION, SequentialIds};
use crate::template::{
    ERROR_INDICATOR, Lookup, SUCCESS_INDICATOR, TEST_EMAIL, TEST_PASSWORD, TestKind, click_checks,
    fill_checks, navigation_step, quote_literal, render_template, template,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Specification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Run first, failures matter most
    High,
    /// Default priority
    Medium,
    /// Nice to have
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Specification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCategory {
    /// Single-control behavior
    Functional,
    /// Visual/layout behavior
    Ui,
    /// Multi-control flows
    Integration,
}

impl std::fmt::Display for TestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Functional => write!(f, "functional"),
            Self::Ui => write!(f, "ui"),
            Self::Integration => write!(f, "integration"),
        }
    }
}

/// A generated, framework-specific executable test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSpecification {
    /// Unique specification ID
    pub id: String,
    /// Short name
    pub name: String,
    /// What the test checks
    pub description: String,
    /// Target framework
    pub framework: Framework,
    /// Kind of generated test
    pub kind: TestKind,
    /// Framework source text
    pub body: String,
    /// Elements the test exercises (never empty)
    pub covered_element_ids: BTreeSet<ElementId>,
    /// Priority
    pub priority: Priority,
    /// Category
    pub category: TestCategory,
}

impl TestSpecification {
    /// File name for the body when written to disk
    #[must_use]
    pub fn file_name(&self) -> String {
        self.framework.file_name(&self.id)
    }
}

/// Synthesis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisConfig {
    /// Target framework
    pub framework: Framework,
    /// Absolute URL of the page under test
    pub base_url: String,
    /// Add visibility/value assertions to click and fill tests
    #[serde(default = "default_true")]
    pub include_validation: bool,
    /// Add an empty-submit test for every input
    #[serde(default)]
    pub include_negative_tests: bool,
}

fn default_true() -> bool {
    true
}

impl SynthesisConfig {
    /// Create a configuration with validation on and negative tests off
    #[must_use]
    pub fn new(framework: Framework, base_url: impl Into<String>) -> Self {
        Self {
            framework,
            base_url: base_url.into(),
            include_validation: true,
            include_negative_tests: false,
        }
    }

    /// Set whether validation assertions are generated
    #[must_use]
    pub const fn with_validation(mut self, enabled: bool) -> Self {
        self.include_validation = enabled;
        self
    }

    /// Set whether negative input tests are generated
    #[must_use]
    pub const fn with_negative_tests(mut self, enabled: bool) -> Self {
        self.include_negative_tests = enabled;
        self
    }

    /// Load a configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Check the configuration, reporting every violation
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` listing all violations.
    pub fn validate(&self) -> Result<Url> {
        let mut violations = Vec::new();
        let parsed = if self.base_url.trim().is_empty() {
            violations.push("base_url is empty".to_string());
            None
        } else {
            match Url::parse(&self.base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
                Ok(url) => {
                    violations.push(format!(
                        "base_url must use http or https, got {}",
                        url.scheme()
                    ));
                    None
                }
                Err(e) => {
                    violations.push(format!("base_url is not an absolute URL: {e}"));
                    None
                }
            }
        };

        match parsed {
            Some(url) if violations.is_empty() => Ok(url),
            _ => Err(Error::Configuration { violations }),
        }
    }
}

/// Per-item issue found during synthesis; never fatal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SynthesisAnomaly {
    /// Element kind has no synthesis rule
    UnsupportedElement {
        /// Element ID
        element_id: ElementId,
        /// Element kind
        kind: ElementKind,
    },
    /// Element ID appears more than once in the input
    DuplicateElementId {
        /// Repeated ID
        element_id: ElementId,
    },
    /// Element has neither a selector nor a locator path
    MissingLocator {
        /// Element ID
        element_id: ElementId,
    },
}

impl std::fmt::Display for SynthesisAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedElement { element_id, kind } => {
                write!(f, "no synthesis rule for {kind} element '{element_id}'")
            }
            Self::DuplicateElementId { element_id } => {
                write!(f, "element id '{element_id}' is not unique")
            }
            Self::MissingLocator { element_id } => {
                write!(f, "element '{element_id}' has no selector or locator path")
            }
        }
    }
}

/// Specifications plus the anomalies found while producing them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisOutput {
    /// Generated specifications, in element order, workflow last
    pub specifications: Vec<TestSpecification>,
    /// Non-fatal issues
    pub anomalies: Vec<SynthesisAnomaly>,
}

/// Deterministic element → specification mapper
pub struct TestSynthesizer {
    ids: Box<dyn IdGenerator>,
}

impl std::fmt::Debug for TestSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestSynthesizer").finish_non_exhaustive()
    }
}

impl Default for TestSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Values shared by every specification rendered for one call
struct RenderContext<'a> {
    config: &'a SynthesisConfig,
    base_url: &'a Url,
}

impl TestSynthesizer {
    /// Create a synthesizer with sequential IDs
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(SequentialIds)
    }

    /// Create a synthesizer with a custom ID generator
    #[must_use]
    pub fn with_ids(ids: impl IdGenerator + 'static) -> Self {
        Self { ids: Box::new(ids) }
    }

    /// Generate specifications for `elements`
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` when the configuration is invalid.
    /// Per-element problems are reported in `SynthesisOutput::anomalies`.
    pub fn synthesize(
        &self,
        elements: &[Element],
        config: &SynthesisConfig,
    ) -> Result<SynthesisOutput> {
        let base_url = config.validate()?;
        let ctx = RenderContext {
            config,
            base_url: &base_url,
        };
        let mut output = SynthesisOutput::default();

        for element_id in duplicate_ids(elements) {
            tracing::warn!(%element_id, "duplicate element id in discovery input");
            output
                .anomalies
                .push(SynthesisAnomaly::DuplicateElementId { element_id });
        }

        for (index, element) in elements.iter().enumerate() {
            let supported = !matches!(element.kind, ElementKind::Select | ElementKind::Textarea);
            if supported && !element.has_locator() {
                tracing::warn!(element_id = %element.id, "element has no locator; skipped");
                output.anomalies.push(SynthesisAnomaly::MissingLocator {
                    element_id: element.id.clone(),
                });
                continue;
            }
            let kinds: &[TestKind] = match element.kind {
                ElementKind::Button => &[TestKind::Click],
                ElementKind::Input if config.include_negative_tests => {
                    &[TestKind::Fill, TestKind::FillEmpty]
                }
                ElementKind::Input => &[TestKind::Fill],
                ElementKind::Link => &[TestKind::Navigate],
                ElementKind::Form => &[TestKind::Submit],
                ElementKind::Select | ElementKind::Textarea => {
                    debug!(element_id = %element.id, kind = %element.kind, "skipping unsupported element");
                    output.anomalies.push(SynthesisAnomaly::UnsupportedElement {
                        element_id: element.id.clone(),
                        kind: element.kind,
                    });
                    continue;
                }
            };

            for &kind in kinds {
                let spec = self.element_specification(index, kind, element, &ctx);
                debug!(id = %spec.id, element_id = %element.id, kind = %kind, "synthesized specification");
                output.specifications.push(spec);
            }
        }

        if let Some(form) = elements
            .iter()
            .find(|e| e.kind == ElementKind::Form && e.has_locator())
        {
            output
                .specifications
                .push(self.workflow_specification(elements, form, &ctx));
        }

        info!(
            elements = elements.len(),
            specifications = output.specifications.len(),
            anomalies = output.anomalies.len(),
            framework = %config.framework,
            "synthesis complete"
        );
        Ok(output)
    }

    fn element_specification(
        &self,
        index: usize,
        kind: TestKind,
        element: &Element,
        ctx: &RenderContext<'_>,
    ) -> TestSpecification {
        let framework = ctx.config.framework;
        let label = element.label();
        let lookup = Lookup::for_element(element);
        let target = lookup.expression(framework);

        let (name, description, priority, category) = match kind {
            TestKind::Click => (
                format!("Click button: {label}"),
                format!("Verify that clicking the '{label}' button performs its action"),
                Priority::High,
                TestCategory::Functional,
            ),
            TestKind::Fill => (
                format!("Fill input: {label}"),
                format!("Verify that the '{label}' field accepts and keeps input"),
                Priority::Medium,
                TestCategory::Functional,
            ),
            TestKind::FillEmpty => (
                format!("Empty input validation: {label}"),
                format!("Verify that submitting the '{label}' field empty shows a validation error"),
                Priority::Medium,
                TestCategory::Functional,
            ),
            TestKind::Navigate => (
                format!("Navigate link: {label}"),
                format!("Verify that the '{label}' link navigates to its target"),
                Priority::Low,
                TestCategory::Functional,
            ),
            TestKind::Submit | TestKind::Workflow => (
                format!("Submit form: {label}"),
                format!("Verify that the '{label}' form submits valid credentials successfully"),
                Priority::High,
                TestCategory::Integration,
            ),
        };

        let id = self.ids.generate(SCOPE_SPECIFICATION, index, kind.tag());
        let mut fields = self.common_fields(&id, &name, ctx);
        match kind {
            TestKind::Click => {
                let checks = if ctx.config.include_validation {
                    click_checks(framework, &target)
                } else {
                    String::new()
                };
                fields.insert("checks", checks);
            }
            TestKind::Fill => {
                let value = fill_value(element);
                let checks = if ctx.config.include_validation {
                    fill_checks(framework, &target, value)
                } else {
                    String::new()
                };
                fields.insert("fill_value", quote_literal(value));
                fields.insert("checks", checks);
            }
            TestKind::FillEmpty => {
                fields.insert("error_indicator", quote_literal(ERROR_INDICATOR));
            }
            TestKind::Navigate => {
                fields.insert("href", quote_literal(&resolve_href(ctx.base_url, element)));
            }
            TestKind::Submit | TestKind::Workflow => {
                insert_form_fields(&mut fields, &lookup, framework);
            }
        }
        fields.insert("target", target);

        TestSpecification {
            id,
            name,
            description,
            framework,
            kind,
            body: render_template(template(kind, framework), &fields),
            covered_element_ids: BTreeSet::from([element.id.clone()]),
            priority,
            category,
        }
    }

    fn workflow_specification(
        &self,
        elements: &[Element],
        form: &Element,
        ctx: &RenderContext<'_>,
    ) -> TestSpecification {
        let framework = ctx.config.framework;
        let id = self
            .ids
            .generate(SCOPE_SPECIFICATION, elements.len(), TestKind::Workflow.tag());
        let name = format!("User workflow: {}", form.label());

        let link = elements
            .iter()
            .find(|e| e.kind == ElementKind::Link && e.has_locator());
        let link_lookup = link.map(Lookup::for_element);
        let link_href = link.map(|l| resolve_href(ctx.base_url, l));
        let nav = match (&link_lookup, &link_href) {
            (Some(lookup), Some(href)) => Some((lookup, href.as_str())),
            _ => None,
        };

        let mut fields = self.common_fields(&id, &name, ctx);
        insert_form_fields(&mut fields, &Lookup::for_element(form), framework);
        fields.insert(
            "nav_step",
            navigation_step(framework, nav, ctx.base_url.as_str()),
        );

        TestSpecification {
            id,
            description: "Verify the end-to-end flow: log in, assert the redirect, navigate, and assert page content".to_string(),
            name,
            framework,
            kind: TestKind::Workflow,
            body: render_template(template(TestKind::Workflow, framework), &fields),
            covered_element_ids: elements.iter().map(|e| e.id.clone()).collect(),
            priority: Priority::High,
            category: TestCategory::Integration,
        }
    }

    fn common_fields(
        &self,
        id: &str,
        name: &str,
        ctx: &RenderContext<'_>,
    ) -> BTreeMap<&'static str, String> {
        let mut fields = BTreeMap::new();
        fields.insert("title", quote_literal(name));
        fields.insert("summary", name.replace(['\r', '\n'], " "));
        fields.insert("fn_name", python_identifier(id));
        fields.insert("base_url", quote_literal(ctx.base_url.as_str()));
        fields
    }
}

fn insert_form_fields(fields: &mut BTreeMap<&'static str, String>, form: &Lookup, framework: Framework) {
    let email = form.descendant(r#"input[type="email"]"#, r#"input[@type="email"]"#);
    let password = form.descendant(r#"input[type="password"]"#, r#"input[@type="password"]"#);
    let submit = form.descendant(r#"[type="submit"]"#, r#"*[@type="submit"]"#);
    fields.insert("email_field", email.expression(framework));
    fields.insert("password_field", password.expression(framework));
    fields.insert("submit_button", submit.expression(framework));
    fields.insert("email", quote_literal(TEST_EMAIL));
    fields.insert("password", quote_literal(TEST_PASSWORD));
    fields.insert("success_indicator", quote_literal(SUCCESS_INDICATOR));
}

/// Value typed into an input, chosen from its `type` attribute
#[must_use]
pub fn fill_value(element: &Element) -> &'static str {
    match element.attribute("type").map(str::to_ascii_lowercase).as_deref() {
        Some("email") => TEST_EMAIL,
        Some("password") => TEST_PASSWORD,
        Some("number") => "42",
        Some("tel") => "5551234567",
        Some("url") => "https://example.com",
        _ => "Test input",
    }
}

/// Link target resolved against the base URL; unjoinable hrefs are kept verbatim
#[must_use]
pub fn resolve_href(base_url: &Url, element: &Element) -> String {
    let href = element.attribute("href").unwrap_or("");
    base_url
        .join(href)
        .map_or_else(|_| href.to_string(), |url| url.to_string())
}

/// Generate specifications with sequential IDs, discarding anomalies
///
/// # Errors
///
/// Returns an error when the configuration is invalid.
pub fn synthesize(elements: &[Element], config: &SynthesisConfig) -> Result<Vec<TestSpecification>> {
    TestSynthesizer::new()
        .synthesize(elements, config)
        .map(|output| output.specifications)
}

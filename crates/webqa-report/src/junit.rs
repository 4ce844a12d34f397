//! JUnit XML Report Generator
//!
//! Generates JUnit-compatible XML reports for CI/CD integration.
//! One `<testcase>` per test specification; specifications without a
//! recorded result are reported as skipped.

use std::collections::HashMap;
use std::fmt;
use webqa_gen::TestSpecification;
use webqa_runner::{ExecutionResult, ExecutionStatus};

use crate::error::Result;
use crate::summary::RunSummary;

/// Prefix the runner puts on errors raised by the execution backend itself
const BACKEND_ERROR_PREFIX: &str = "Execution backend error";

/// JUnit XML report generator
#[derive(Debug)]
pub struct JunitReport {
    /// Test suite name
    suite_name: String,
}

impl JunitReport {
    /// Create a new JUnit report generator
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
        }
    }

    /// Generate JUnit XML
    ///
    /// # Errors
    ///
    /// Returns an error if XML generation fails.
    pub fn generate(
        &self,
        specifications: &[TestSpecification],
        results: &[ExecutionResult],
        summary: &RunSummary,
    ) -> Result<String> {
        let by_spec: HashMap<&str, &ExecutionResult> = results
            .iter()
            .map(|r| (r.specification_id.as_str(), r))
            .collect();
        let cases: Vec<Case<'_>> = specifications
            .iter()
            .map(|spec| Case::new(spec, by_spec.get(spec.id.as_str()).copied()))
            .collect();
        let suite = Suite {
            name: &self.suite_name,
            totals: Totals::tally(&cases),
            cases,
            summary,
        };
        Ok(suite.to_string())
    }
}

impl Default for JunitReport {
    fn default() -> Self {
        Self::new("webqa")
    }
}

/// How a single specification ended up
enum Outcome<'a> {
    Passed,
    Skipped(&'static str),
    Failed {
        backend: bool,
        message: &'a str,
        artifact: Option<&'a str>,
    },
}

/// One `<testcase>` row
struct Case<'a> {
    class_name: String,
    name: &'a str,
    specification_id: &'a str,
    seconds: f64,
    outcome: Outcome<'a>,
}

impl<'a> Case<'a> {
    fn new(spec: &'a TestSpecification, result: Option<&'a ExecutionResult>) -> Self {
        let outcome = match result {
            None => Outcome::Skipped("No result recorded"),
            Some(r) => match r.status {
                ExecutionStatus::Passed => Outcome::Passed,
                ExecutionStatus::Skipped => Outcome::Skipped("Test skipped"),
                ExecutionStatus::Failed => Outcome::Failed {
                    backend: r
                        .error
                        .as_deref()
                        .is_some_and(|e| e.starts_with(BACKEND_ERROR_PREFIX)),
                    message: r.failure_message().unwrap_or_default(),
                    artifact: r.artifact_ref.as_deref(),
                },
            },
        };
        Self {
            class_name: format!("webqa.{}.{}", spec.framework, spec.category),
            name: &spec.name,
            specification_id: &spec.id,
            seconds: result.map_or(0.0, |r| r.duration_ms as f64 / 1000.0),
            outcome,
        }
    }
}

impl fmt::Display for Case<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
            Escaped(&self.class_name),
            Escaped(self.name),
            self.seconds
        )?;
        match &self.outcome {
            Outcome::Passed => {}
            Outcome::Skipped(message) => writeln!(f, r#"    <skipped message="{message}"/>"#)?,
            Outcome::Failed {
                backend,
                message,
                artifact,
            } => {
                let (tag, kind) = if *backend {
                    ("error", "BackendError")
                } else {
                    ("failure", "AssertionError")
                };
                writeln!(f, r#"    <{tag} message="{}" type="{kind}">"#, Escaped(message))?;
                writeln!(f, "Specification: {}", Escaped(self.specification_id))?;
                if let Some(artifact) = artifact {
                    writeln!(f, "Artifact: {}", Escaped(artifact))?;
                }
                writeln!(f, "    </{tag}>")?;
            }
        }
        writeln!(f, "  </testcase>")
    }
}

/// Suite-level counters
#[derive(Debug, Default, PartialEq)]
struct Totals {
    failures: usize,
    errors: usize,
    skipped: usize,
    seconds: f64,
}

impl Totals {
    fn tally(cases: &[Case<'_>]) -> Self {
        cases.iter().fold(Self::default(), |mut totals, case| {
            totals.seconds += case.seconds;
            match case.outcome {
                Outcome::Passed => {}
                Outcome::Skipped(_) => totals.skipped += 1,
                Outcome::Failed { backend: true, .. } => totals.errors += 1,
                Outcome::Failed { backend: false, .. } => totals.failures += 1,
            }
            totals
        })
    }
}

/// Whole `<testsuite>` document
struct Suite<'a> {
    name: &'a str,
    totals: Totals,
    cases: Vec<Case<'a>>,
    summary: &'a RunSummary,
}

impl fmt::Display for Suite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Totals {
            failures,
            errors,
            skipped,
            seconds,
        } = self.totals;
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<testsuite name="{}" tests="{}" failures="{failures}" errors="{errors}" skipped="{skipped}" time="{seconds:.3}">"#,
            Escaped(self.name),
            self.cases.len()
        )?;
        writeln!(f, "  <properties>")?;
        for (name, value) in [
            ("pass_rate_estimate", format!("{:.2}", self.summary.pass_rate_estimate)),
            ("total_defects", self.summary.total_defects.to_string()),
            ("open_defects", self.summary.open_count.to_string()),
        ] {
            writeln!(f, r#"    <property name="webqa.{name}" value="{value}"/>"#)?;
        }
        writeln!(f, "  </properties>")?;
        for case in &self.cases {
            write!(f, "{case}")?;
        }
        writeln!(f, "</testsuite>")
    }
}

/// Text escaped for XML attributes and character data
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                _ => fmt::Write::write_char(f, c)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;
    use crate::test_fixtures::specifications;
    use chrono::{DateTime, Utc};

    fn ts() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn generate(specs: &[TestSpecification], results: &[ExecutionResult]) -> String {
        JunitReport::new("Checkout")
            .generate(specs, results, &summarize(&[], specs))
            .expect("Failed to generate")
    }

    #[test]
    fn test_junit_basic() {
        let specs = specifications(1);
        let xml = generate(&specs, &[ExecutionResult::passed("r0", &specs[0].id, 1500, ts())]);

        assert!(xml.contains("<?xml"));
        assert!(xml.contains(r#"<testsuite name="Checkout" tests="1" failures="0" errors="0" skipped="0" time="1.500">"#));
        assert!(xml.contains(r#"classname="webqa.playwright.functional""#));
        assert!(xml.contains(r#"name="Click button: b0""#));
    }

    #[test]
    fn test_junit_with_failure() {
        let specs = specifications(1);
        let xml = generate(
            &specs,
            &[ExecutionResult::failed("r0", &specs[0].id, Some("expected <ok>".to_string()), 10, ts())
                .with_artifact("shots/0.png")],
        );

        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"<failure message="expected &lt;ok&gt;" type="AssertionError">"#));
        assert!(xml.contains("Artifact: shots/0.png"));
    }

    #[test]
    fn test_junit_with_backend_error() {
        let specs = specifications(1);
        let xml = generate(
            &specs,
            &[ExecutionResult::failed(
                "r0",
                &specs[0].id,
                Some("Execution backend error: backend unavailable: grid".to_string()),
                0,
                ts(),
            )],
        );

        assert!(xml.contains(r#"errors="1""#));
        assert!(xml.contains(r#"failures="0""#));
        assert!(xml.contains(r#"type="BackendError""#));
    }

    #[test]
    fn test_junit_missing_result_is_skipped() {
        let specs = specifications(2);
        let xml = generate(&specs, &[ExecutionResult::skipped("r0", &specs[0].id, ts())]);

        assert!(xml.contains(r#"skipped="2""#));
        assert!(xml.contains("No result recorded"));
        assert!(xml.contains("Test skipped"));
    }

    #[test]
    fn test_junit_properties() {
        let specs = specifications(4);
        let xml = generate(&specs, &[]);
        assert!(xml.contains(r#"<property name="webqa.pass_rate_estimate" value="100.00"/>"#));
        assert!(xml.contains(r#"<property name="webqa.total_defects" value="0"/>"#));
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(Escaped("<test>").to_string(), "&lt;test&gt;");
        assert_eq!(Escaped("a & b").to_string(), "a &amp; b");
        assert_eq!(Escaped("\"it's\"").to_string(), "&quot;it&apos;s&quot;");
    }

    #[test]
    fn test_totals_tally_each_outcome() {
        let specs = specifications(4);
        let results = [
            ExecutionResult::passed("r0", &specs[0].id, 250, ts()),
            ExecutionResult::failed("r1", &specs[1].id, Some("boom".to_string()), 500, ts()),
            ExecutionResult::failed(
                "r2",
                &specs[2].id,
                Some("Execution backend error: grid down".to_string()),
                0,
                ts(),
            ),
        ];
        let cases: Vec<Case<'_>> = specs
            .iter()
            .map(|s| Case::new(s, results.iter().find(|r| r.specification_id == s.id)))
            .collect();
        assert_eq!(
            Totals::tally(&cases),
            Totals {
                failures: 1,
                errors: 1,
                skipped: 1,
                seconds: 0.75,
            }
        );
    }
}

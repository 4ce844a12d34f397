//! Integration tests for webqa
//!
//! Tests the full pipeline from element discovery output through synthesis,
//! execution, classification, triage and reporting.

use webqa::{Error, QaRun};
use webqa_gen::{
    Element, ElementKind, FixedClock, Framework, Priority, SynthesisConfig, TestCategory,
    TestKind, TestSynthesizer, synthesize,
};
use webqa_report::{
    ExportDocument, JunitReport, SimulatedTracker, TicketMapper, TicketOutcome, TrackerConfig,
    TrackerError, TrackerPriority, map_priority, pass_rate_estimate, summarize,
};
use webqa_runner::{
    ClassifierConfig, DefectCategory, DefectClassifier, DefectStatus, ExecutionResult,
    ParallelConfig, ParallelRunner, Severity, SimulatedBackend, SimulatedProbes, classify,
};

const BASE_URL: &str = "https://shop.example.com/checkout";

fn checkout_elements() -> Vec<Element> {
    vec![
        Element::new("btn-pay", ElementKind::Button, "#pay").with_text("Pay now"),
        Element::new("in-email", ElementKind::Input, "#email").with_attribute("type", "email"),
        Element::new("lnk-terms", ElementKind::Link, "a.terms")
            .with_text("Terms")
            .with_attribute("href", "/terms"),
        Element::new("frm-checkout", ElementKind::Form, "form#checkout"),
        Element::new("sel-country", ElementKind::Select, "#country"),
    ]
}

fn tracker_config() -> TrackerConfig {
    TrackerConfig {
        base_url: "https://tracker.example.com".to_string(),
        email: "qa@example.com".to_string(),
        api_token: "token".to_string(),
        project_key: "SHOP".to_string(),
        issue_type: "Bug".to_string(),
        labels: vec!["checkout".to_string()],
    }
}

fn runner() -> ParallelRunner {
    ParallelRunner::new(ParallelConfig::default().with_workers(2)).with_clock(FixedClock::epoch())
}

fn classifier() -> DefectClassifier {
    DefectClassifier::new().with_clock(FixedClock::epoch())
}

/// Synthesize, execute with two scripted failures and classify
fn classified_run() -> QaRun {
    let mut run = QaRun::new();
    run.synthesize(
        &TestSynthesizer::new(),
        checkout_elements(),
        &SynthesisConfig::new(Framework::Playwright, BASE_URL),
    )
    .expect("synthesis failed");

    let pay = run.specifications()[0].id.clone();
    let email = run.specifications()[1].id.clone();
    let backend = SimulatedBackend::new()
        .with_failure(pay, "Timeout waiting for element #pay")
        .with_failure(email, "Assertion failed: expected value to equal test@example.com");
    run.execute(&runner(), &backend).expect("execution failed");

    run.classify(&classifier(), &ClassifierConfig::new(BASE_URL), &[])
        .expect("classification failed");
    run
}

#[test]
fn test_synthesis_pipeline() {
    let output = TestSynthesizer::new()
        .synthesize(
            &checkout_elements(),
            &SynthesisConfig::new(Framework::Selenium, BASE_URL).with_negative_tests(true),
        )
        .unwrap();

    // click + fill + empty fill + navigate + submit + workflow; select is reported
    assert_eq!(output.specifications.len(), 6);
    assert_eq!(output.anomalies.len(), 1);
    assert!(
        output
            .specifications
            .iter()
            .all(|s| s.framework == Framework::Selenium && s.body.contains("def test_"))
    );
    assert_eq!(
        output
            .specifications
            .iter()
            .filter(|s| s.kind == TestKind::Workflow)
            .count(),
        1
    );
}

#[test]
fn test_button_yields_one_high_priority_functional_spec() {
    for framework in Framework::all() {
        let specs = synthesize(
            &[Element::new("b", ElementKind::Button, "#b")],
            &SynthesisConfig::new(framework, BASE_URL),
        )
        .unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].priority, Priority::High);
        assert_eq!(specs[0].category, TestCategory::Functional);
        assert_eq!(
            specs[0].covered_element_ids.iter().collect::<Vec<_>>(),
            vec!["b"]
        );
    }
}

#[test]
fn test_form_yields_submit_and_workflow() {
    let specs = synthesize(
        &[Element::new("f", ElementKind::Form, "form")],
        &SynthesisConfig::new(Framework::Cypress, BASE_URL),
    )
    .unwrap();
    let kinds: Vec<TestKind> = specs.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![TestKind::Submit, TestKind::Workflow]);
}

#[test]
fn test_empty_elements_yield_nothing() {
    let specs = synthesize(&[], &SynthesisConfig::new(Framework::Playwright, BASE_URL)).unwrap();
    assert!(specs.is_empty());
}

#[test]
fn test_synthesis_is_deterministic() {
    let config = SynthesisConfig::new(Framework::Playwright, BASE_URL);
    let a = synthesize(&checkout_elements(), &config).unwrap();
    let b = synthesize(&checkout_elements(), &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_full_pipeline() {
    let mut run = classified_run();

    assert_eq!(run.results().len(), run.specifications().len());
    assert_eq!(run.defects().len(), 2);

    let timeout = &run.defects()[0];
    assert_eq!(timeout.severity, Severity::Critical);
    assert_eq!(timeout.category, DefectCategory::Functional);
    assert_eq!(timeout.element_ref.as_deref(), Some("btn-pay"));
    assert_eq!(timeout.source_url, BASE_URL);
    assert_eq!(timeout.status, DefectStatus::Open);

    // Fill specifications are medium priority
    assert_eq!(run.defects()[1].severity, Severity::Minor);

    let mapper = TicketMapper::new(SimulatedTracker::new().with_clock(FixedClock::epoch()))
        .with_clock(FixedClock::epoch());
    let report = run.create_tickets(&mapper, &tracker_config(), false).unwrap();
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(run.tickets().len(), 2);
    assert!(run.defects().iter().all(|d| d.tracker_ref.is_some()));

    let sent = mapper.client().sent();
    assert_eq!(sent[0].priority, TrackerPriority::Blocker);
    assert!(sent[0].summary.starts_with("[Critical] "));
    assert!(sent[0].labels.contains(&"checkout".to_string()));

    let summary = run.summary();
    assert_eq!(summary.total_defects, 2);
    assert_eq!(summary.open_count, 2);
    assert_eq!(summary.severity_count(Severity::Critical), 1);

    let export = run.export(FixedClock::epoch().0);
    let json = export.to_json().unwrap();
    assert_eq!(ExportDocument::from_json(&json).unwrap(), export);

    let xml = JunitReport::new("checkout")
        .generate(run.specifications(), run.results(), &summary)
        .unwrap();
    assert!(xml.contains(r#"failures="2""#));
}

#[test]
fn test_ticket_creation_is_idempotent() {
    let mut run = classified_run();
    let mapper = TicketMapper::new(SimulatedTracker::new());
    let id = run.defects()[0].id.clone();

    let first = run.create_ticket(&mapper, &id, &tracker_config()).unwrap();
    let second = run.create_ticket(&mapper, &id, &tracker_config()).unwrap();

    assert!(matches!(first, TicketOutcome::Created { .. }));
    assert!(matches!(second, TicketOutcome::AlreadyLinked { .. }));
    assert_eq!(first.tracker_ref(), second.tracker_ref());
    assert_eq!(mapper.client().sent().len(), 1);
    assert_eq!(run.tickets().len(), 1);
}

#[test]
fn test_tracker_failure_leaves_defect_untouched() {
    let mut run = classified_run();
    let before = run.defects()[0].clone();
    let mapper = TicketMapper::new(
        SimulatedTracker::new().failing(TrackerError::Unavailable("down".to_string())),
    );

    assert!(run.create_ticket(&mapper, &before.id, &tracker_config()).is_err());
    assert_eq!(run.defects()[0], before);
    assert!(run.tickets().is_empty());
}

#[test]
fn test_invalid_tracker_config_reports_every_violation() {
    let mut run = classified_run();
    let mapper = TicketMapper::new(SimulatedTracker::new());
    let config = TrackerConfig {
        base_url: String::new(),
        api_token: String::new(),
        ..tracker_config()
    };

    let id = run.defects()[0].id.clone();

    match run.create_ticket(&mapper, &id, &config) {
        Err(Error::Report(webqa_report::Error::Configuration { violations })) => {
            assert!(violations.len() >= 2);
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
    assert!(mapper.client().sent().is_empty());
}

#[test]
fn test_unknown_defect_reference() {
    let mut run = classified_run();
    let err = run
        .transition_defect("bug-missing", DefectStatus::Resolved, FixedClock::epoch().0)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownReference { kind: "defect", .. }));
}

#[test]
fn test_defect_lifecycle_through_store() {
    let mut run = classified_run();
    let id = run.defects()[0].id.clone();
    let at = FixedClock::at(2026, 3, 1, 12, 0, 0).0;

    run.transition_defect(&id, DefectStatus::InProgress, at).unwrap();
    run.transition_defect(&id, DefectStatus::Resolved, at).unwrap();

    let defect = run.defect(&id).unwrap();
    assert_eq!(defect.status, DefectStatus::Resolved);
    assert_eq!(defect.updated_at, at);
    assert_eq!(run.summary().resolved_count, 1);
}

#[test]
fn test_resynthesis_discards_derived_artifacts() {
    let mut run = classified_run();
    assert!(!run.defects().is_empty());

    run.synthesize(
        &TestSynthesizer::new(),
        vec![Element::new("b", ElementKind::Button, "#b")],
        &SynthesisConfig::new(Framework::Playwright, BASE_URL),
    )
    .unwrap();

    assert_eq!(run.specifications().len(), 1);
    assert!(run.results().is_empty());
    assert!(run.defects().is_empty());
    assert!(run.tickets().is_empty());
}

#[test]
fn test_probe_findings_become_defects() {
    let mut run = classified_run();
    let config = ClassifierConfig::new(BASE_URL).with_all_probes();
    let findings = SimulatedProbes.audit(BASE_URL);

    let defects = run.classify(&classifier(), &config, &findings).unwrap().to_vec();
    let failure_defects = defects.iter().filter(|d| d.specification_id.is_some()).count();
    assert_eq!(failure_defects, 2);
    assert!(
        defects
            .iter()
            .filter(|d| d.specification_id.is_none())
            .all(|d| d.source_url == BASE_URL)
    );
}

#[test]
fn test_classification_scenarios() {
    let elements = [Element::new("in-q", ElementKind::Input, "#q")];
    let mut specs = synthesize(&elements, &SynthesisConfig::new(Framework::Playwright, BASE_URL))
        .unwrap();
    let config = ClassifierConfig::new(BASE_URL);
    let at = FixedClock::epoch().0;

    specs[0].priority = Priority::High;
    let timeout = ExecutionResult::failed(
        "r0",
        &specs[0].id,
        Some("Timeout waiting for element".to_string()),
        30_000,
        at,
    );
    let defects = classify(&[timeout], &specs, &config, &[]).unwrap();
    assert_eq!(defects[0].severity, Severity::Critical);

    specs[0].priority = Priority::Medium;
    let assertion = ExecutionResult::failed(
        "r0",
        &specs[0].id,
        Some("Assertion failed: expected X".to_string()),
        20,
        at,
    );
    let defects = classify(&[assertion], &specs, &config, &[]).unwrap();
    assert_eq!(defects[0].severity, Severity::Minor);
}

#[test]
fn test_classification_is_idempotent_except_ids() {
    let specs = synthesize(
        &checkout_elements(),
        &SynthesisConfig::new(Framework::Playwright, BASE_URL),
    )
    .unwrap();
    let at = FixedClock::epoch().0;
    let results: Vec<ExecutionResult> = specs
        .iter()
        .enumerate()
        .map(|(i, s)| {
            ExecutionResult::failed(format!("r{i}"), &s.id, Some("element not found".to_string()), 5, at)
        })
        .collect();
    let config = ClassifierConfig::new(BASE_URL).with_all_probes();
    let findings = SimulatedProbes.audit(BASE_URL);

    let first = classifier().classify(&results, &specs, &config, &findings).unwrap();
    let second = classifier().classify(&results, &specs, &config, &findings).unwrap();
    assert_eq!(first.defects.len(), second.defects.len());
    for (a, b) in first.defects.iter().zip(&second.defects) {
        assert!(a.same_content(b));
    }
}

#[test]
fn test_priority_mapping_and_pass_rate() {
    assert_eq!(map_priority(Severity::Critical), TrackerPriority::Blocker);
    assert_eq!(map_priority(Severity::Trivial), TrackerPriority::Low);
    assert!((pass_rate_estimate(3, 10) - 70.0).abs() < f64::EPSILON);

    assert!((pass_rate_estimate(12, 10)).abs() < f64::EPSILON);
    assert!((summarize(&[], &[]).pass_rate_estimate).abs() < f64::EPSILON);
}

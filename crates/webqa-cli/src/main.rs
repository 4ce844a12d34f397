//! WebQA CLI
//!
//! Synthesizes web UI tests from discovered elements and triages the
//! results into defects, tickets and reports.

#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use webqa::QaRun;
use webqa_cli::{
    CliResult, WebQaConfig, apply_triage, build_export, classify_results, create_tickets,
    execute_specifications, format_summary, format_ticket_preview, generate_junit_report,
    generate_specifications, init_tracing, load_config, load_elements, load_specifications,
    probe_findings, read_json, simulated_backend, specifications_to_json, specifications_to_yaml,
    ticket_targets, write_json, write_test_files,
};
use webqa_gen::{Clock, SystemClock, TestSpecification, TestSynthesizer};
use webqa_report::{SimulatedTracker, TicketMapper, TicketOutcome, summarize};
use webqa_runner::{
    Defect, DefectClassifier, ExecutionResult, ParallelConfig, ParallelRunner, Severity,
};

#[derive(Parser)]
#[command(name = "webqa")]
#[command(about = "Web UI test synthesis and defect triage")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpecFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize test specifications from discovered elements
    Generate {
        /// Elements JSON file
        elements: PathBuf,

        /// Configuration YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Output file for the specification set
        #[arg(short, long, default_value = "specifications.yaml")]
        output: PathBuf,

        /// Specification set format
        #[arg(long, value_enum, default_value = "yaml")]
        format: SpecFormat,

        /// Directory for per-specification source files
        #[arg(long)]
        tests_dir: Option<PathBuf>,
    },

    /// Execute specifications on the simulated backend
    Execute {
        /// Specification set (YAML or JSON)
        specifications: PathBuf,

        /// Output file for results
        #[arg(short, long, default_value = "results.json")]
        output: PathBuf,

        /// Number of parallel workers
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Skip remaining specifications after the first failure
        #[arg(long)]
        stop_on_failure: bool,

        /// Specification IDs the simulated backend should fail
        #[arg(long = "fail")]
        failing: Vec<String>,

        /// Specification IDs for which the simulated backend is unavailable
        #[arg(long = "unavailable")]
        unavailable: Vec<String>,
    },

    /// Classify results and probe findings into defects
    Classify {
        /// Results JSON file
        results: PathBuf,

        /// Specification set (YAML or JSON)
        #[arg(short, long)]
        specifications: PathBuf,

        /// Configuration YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Output file for defects
        #[arg(short, long, default_value = "defects.json")]
        output: PathBuf,
    },

    /// Write the export document and JUnit XML
    Report {
        /// Defects JSON file
        defects: PathBuf,

        /// Specification set (YAML or JSON)
        #[arg(short, long)]
        specifications: PathBuf,

        /// Results JSON file, for JUnit test case status
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output/reports")]
        output: PathBuf,

        /// JUnit suite name
        #[arg(long, default_value = "webqa")]
        suite: String,
    },

    /// Create tracker tickets for defects
    Ticket {
        /// Defects JSON file
        defects: PathBuf,

        /// Configuration YAML file with a tracker section
        #[arg(short, long)]
        config: PathBuf,

        /// Tracker API token, overriding the configuration file
        #[arg(long, env = "WEBQA_TRACKER_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// One ticket per (page, element, category) group
        #[arg(long)]
        dedupe: bool,

        /// Print ticket bodies without calling the tracker
        #[arg(long)]
        dry_run: bool,

        /// Output file for linked defects
        #[arg(short, long, default_value = "defects.json")]
        output: PathBuf,
    },

    /// Run every stage end to end with simulated collaborators
    Pipeline {
        /// Elements JSON file
        elements: PathBuf,

        /// Configuration YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Number of parallel workers
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Specification IDs the simulated backend should fail
        #[arg(long = "fail")]
        failing: Vec<String>,

        /// Tracker API token, overriding the configuration file
        #[arg(long, env = "WEBQA_TRACKER_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Create tickets for the classified defects
        #[arg(long)]
        tickets: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: CliResult = match cli.command {
        Commands::Generate {
            elements,
            config,
            output,
            format,
            tests_dir,
        } => run_generate(&elements, &config, &output, format, tests_dir.as_deref()).into(),
        Commands::Execute {
            specifications,
            output,
            workers,
            stop_on_failure,
            failing,
            unavailable,
        } => run_execute(
            &specifications,
            &output,
            workers,
            stop_on_failure,
            &failing,
            &unavailable,
        )
        .into(),
        Commands::Classify {
            results,
            specifications,
            config,
            output,
        } => run_classify(&results, &specifications, &config, &output).into(),
        Commands::Report {
            defects,
            specifications,
            results,
            output,
            suite,
        } => run_report(&defects, &specifications, results.as_deref(), &output, &suite).into(),
        Commands::Ticket {
            defects,
            config,
            token,
            dedupe,
            dry_run,
            output,
        } => run_ticket(&defects, &config, token, dedupe, dry_run, &output).into(),
        Commands::Pipeline {
            elements,
            config,
            output,
            workers,
            failing,
            token,
            tickets,
        } => run_pipeline(&elements, &config, &output, workers, &failing, token, tickets).into(),
    };

    match result {
        CliResult::Success(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        CliResult::Error(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run_generate(
    elements_path: &Path,
    config_path: &Path,
    output: &Path,
    format: SpecFormat,
    tests_dir: Option<&Path>,
) -> Result<String, String> {
    let config = load_config(config_path)?;
    let elements = load_elements(elements_path)?;
    let synthesis = generate_specifications(&elements, &config.synthesis)?;

    let content = match format {
        SpecFormat::Yaml => specifications_to_yaml(&synthesis.specifications)?,
        SpecFormat::Json => specifications_to_json(&synthesis.specifications)?,
    };
    std::fs::write(output, content)
        .map_err(|e| format!("Error writing {}: {e}", output.display()))?;

    let mut lines = vec![format!(
        "Generated {} specifications ({}) from {} elements -> {}",
        synthesis.specifications.len(),
        config.synthesis.framework,
        elements.len(),
        output.display()
    )];
    for anomaly in &synthesis.anomalies {
        lines.push(format!("  anomaly: {anomaly}"));
    }
    if let Some(dir) = tests_dir {
        let written = write_test_files(&synthesis.specifications, dir)?;
        lines.push(format!("Wrote {} test files to {}", written.len(), dir.display()));
    }
    Ok(lines.join("\n"))
}

fn run_execute(
    specifications_path: &Path,
    output: &Path,
    workers: usize,
    stop_on_failure: bool,
    failing: &[String],
    unavailable: &[String],
) -> Result<String, String> {
    let specifications = load_specifications(specifications_path)?;
    let backend = simulated_backend(failing, unavailable);
    let report = execute_specifications(&specifications, &backend, workers, stop_on_failure)?;
    write_json(output, &report.results, "results")?;

    let mut message = format!(
        "Executed {} specifications: {} passed, {} failed, {} skipped ({}ms) -> {}",
        report.results.len(),
        report.passed,
        report.failed,
        report.skipped,
        report.duration_ms,
        output.display()
    );
    if report.stopped_early {
        message.push_str("\nStopped early after first failure");
    }
    Ok(message)
}

fn run_classify(
    results_path: &Path,
    specifications_path: &Path,
    config_path: &Path,
    output: &Path,
) -> Result<String, String> {
    let config = load_config(config_path)?;
    let results: Vec<ExecutionResult> = read_json(results_path, "results")?;
    let specifications = load_specifications(specifications_path)?;

    let classification =
        classify_results(&results, &specifications, &config.classifier_config())?;
    write_json(output, &classification.defects, "defects")?;

    let mut lines = vec![format!(
        "Classified {} results into {} defects -> {}",
        results.len(),
        classification.defects.len(),
        output.display()
    )];
    for anomaly in &classification.anomalies {
        lines.push(format!("  anomaly: {anomaly}"));
    }
    Ok(lines.join("\n"))
}

fn run_report(
    defects_path: &Path,
    specifications_path: &Path,
    results_path: Option<&Path>,
    output_dir: &Path,
    suite: &str,
) -> Result<String, String> {
    let defects: Vec<Defect> = read_json(defects_path, "defects")?;
    let specifications = load_specifications(specifications_path)?;
    let results: Vec<ExecutionResult> = match results_path {
        Some(path) => read_json(path, "results")?,
        None => Vec::new(),
    };
    write_reports(&defects, &specifications, &results, output_dir, suite)
}

fn write_reports(
    defects: &[Defect],
    specifications: &[TestSpecification],
    results: &[ExecutionResult],
    output_dir: &Path,
    suite: &str,
) -> Result<String, String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Error creating output directory: {e}"))?;

    let export = build_export(defects, specifications, SystemClock.now());
    let export_path = output_dir.join("export.json");
    export
        .write_to(&export_path)
        .map_err(|e| format!("Error writing export: {e}"))?;

    let junit = generate_junit_report(suite, specifications, results, &export.summary)?;
    let junit_path = output_dir.join("junit.xml");
    std::fs::write(&junit_path, junit).map_err(|e| format!("Error writing JUnit: {e}"))?;

    Ok(format!(
        "{}\n  Export: {}\n  JUnit: {}",
        format_summary(&export.summary),
        export_path.display(),
        junit_path.display()
    ))
}

fn run_ticket(
    defects_path: &Path,
    config_path: &Path,
    token: Option<String>,
    dedupe: bool,
    dry_run: bool,
    output: &Path,
) -> Result<String, String> {
    let config = load_config(config_path)?;
    let tracker = config.tracker_config(token)?;
    let defects: Vec<Defect> = read_json(defects_path, "defects")?;
    let targets = ticket_targets(&defects, dedupe);

    if dry_run {
        let previews: Vec<String> = targets
            .iter()
            .map(|d| format_ticket_preview(d, &tracker))
            .collect();
        return Ok(format!(
            "{}\nDry run: {} ticket(s) not sent",
            previews.join("\n"),
            targets.len()
        ));
    }

    let report = create_tickets(&targets, &tracker)?;
    let linked = apply_triage(&defects, &report);
    write_json(output, &linked, "defects")?;

    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            TicketOutcome::Created { ticket, defect } => {
                format!("  {} -> {} ({})", defect.id, ticket.external_key, ticket.external_url)
            }
            TicketOutcome::AlreadyLinked { tracker_ref } => {
                format!("  already linked: {tracker_ref}")
            }
        })
        .collect();
    for (defect_id, error) in &report.failures {
        lines.push(format!("  {defect_id} failed: {error}"));
    }
    lines.insert(
        0,
        format!(
            "Tickets: {} processed, {} failed -> {}",
            report.outcomes.len(),
            report.failures.len(),
            output.display()
        ),
    );
    Ok(lines.join("\n"))
}

fn run_pipeline(
    elements_path: &Path,
    config_path: &Path,
    output_dir: &Path,
    workers: usize,
    failing: &[String],
    token: Option<String>,
    tickets: bool,
) -> Result<String, String> {
    let config: WebQaConfig = load_config(config_path)?;
    let elements = load_elements(elements_path)?;
    let classifier_config = config.classifier_config();
    let mut run = QaRun::new();

    run.synthesize(&TestSynthesizer::new(), elements, &config.synthesis)
        .map_err(|e| format!("Error synthesizing tests: {e}"))?;
    info!(specifications = run.specifications().len(), "pipeline: synthesized");

    let runner = ParallelRunner::new(ParallelConfig::default().with_workers(workers));
    run.execute(&runner, &simulated_backend(failing, &[]))
        .map_err(|e| format!("Execution failed: {e}"))?;

    run.classify(
        &DefectClassifier::new(),
        &classifier_config,
        &probe_findings(&classifier_config),
    )
    .map_err(|e| format!("Error classifying results: {e}"))?;
    info!(defects = run.defects().len(), "pipeline: classified");

    let mut lines = Vec::new();
    if tickets {
        let tracker = config.tracker_config(token)?;
        let report = run
            .create_tickets(&TicketMapper::new(SimulatedTracker::new()), &tracker, true)
            .map_err(|e| format!("Error creating tickets: {e}"))?;
        lines.push(format!(
            "Tickets: {} created, {} failed",
            run.tickets().len(),
            report.failures.len()
        ));
    }

    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Error creating output directory: {e}"))?;
    write_test_files(run.specifications(), &output_dir.join("tests"))?;
    write_json(&output_dir.join("specifications.json"), run.specifications(), "specifications")?;
    write_json(&output_dir.join("results.json"), run.results(), "results")?;
    write_json(&output_dir.join("defects.json"), run.defects(), "defects")?;
    let reports = write_reports(
        run.defects(),
        run.specifications(),
        run.results(),
        output_dir,
        "webqa",
    )?;

    let summary = summarize(run.defects(), run.specifications());
    lines.insert(
        0,
        format!(
            "Pipeline complete: {} elements, {} specifications, {} results",
            run.elements().len(),
            run.specifications().len(),
            run.results().len()
        ),
    );
    lines.push(format!(
        "Critical defects: {}",
        summary.severity_count(Severity::Critical)
    ));
    lines.push(reports);
    Ok(lines.join("\n"))
}

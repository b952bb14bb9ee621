use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, info, info_span, warn};

use ilr_model::{Learner, validate_population_identity};
use ilr_reference::{AcademicYear, FileData, LookupGateways, load_lars_csv, load_snapshot};
use ilr_validate::{
    CancellationToken, DerivedDataRegistry, RuleEngine, RuleRegistry, ValidationOptions,
    default_registry, load_options,
};

use crate::cli::ValidateArgs;
use crate::summary::apply_table_style;
use crate::types::{LearnerFile, ValidateResult, ValidationReport};

pub fn run_rules() -> Result<()> {
    let registry = default_registry().context("build rule registry")?;
    let mut table = Table::new();
    table.set_header(vec!["Rule", "Severity"]);
    apply_table_style(&mut table);
    for rule in registry.iter() {
        table.add_row(vec![rule.rule_name(), rule.severity().label()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateResult> {
    let span = info_span!("validate", learners_file = %args.learners.display());
    let _guard = span.enter();
    let started = Instant::now();

    let learners = load_learners(&args.learners)?;
    let (gateways, academic_year) = load_gateways(args)?;

    let registry = default_registry().context("build rule registry")?;
    let mut options = build_options(args)?;
    warn_unknown_rules(&registry, &options);

    let progress = progress_bar(learners.len(), args.no_progress);
    let bar = progress.clone();
    options = options.with_progress(Arc::new(move |done: usize| {
        bar.set_position(done as u64);
    }));

    let engine = RuleEngine::new(registry, Arc::new(DerivedDataRegistry::with_builtin_facts()));
    let outcome = engine.run(&learners, &gateways, &options, &CancellationToken::new());
    progress.finish_and_clear();

    let fingerprint = outcome.fingerprint();
    info!(
        learners = learners.len(),
        errors = outcome.error_count(),
        warnings = outcome.warning_count(),
        diagnostics = outcome.diagnostics.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "validation finished"
    );

    let result = ValidateResult {
        academic_year: academic_year.code(),
        learners: learners.len(),
        outcome,
        fingerprint,
        report: args.output.clone(),
        fail_on_warnings: options.fail_on_warnings,
    };
    if let Some(path) = &args.output {
        write_report(path, &result)?;
    }
    Ok(result)
}

/// Read a learner file and check that learner and aim identities are unique.
pub fn load_learners(path: &Path) -> Result<Vec<Learner>> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let file: LearnerFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse learners from {}", path.display()))?;
    let learners = file.into_learners();
    validate_population_identity(&learners)
        .with_context(|| format!("invalid learner population in {}", path.display()))?;
    debug!(path = %path.display(), learners = learners.len(), "loaded learners");
    Ok(learners)
}

fn load_gateways(args: &ValidateArgs) -> Result<(LookupGateways, AcademicYear)> {
    let mut snapshot = load_snapshot(&args.reference).context("load reference snapshot")?;
    if let Some(path) = &args.lars_csv {
        let deliveries = load_lars_csv(path).context("load LARS extract")?;
        snapshot.extend_lars(deliveries);
    }
    let academic_year = match &args.academic_year {
        Some(code) => AcademicYear::parse(code).context("parse academic year")?,
        None => AcademicYear::containing(snapshot.file_preparation_date()),
    };
    debug!(
        academic_year = %academic_year.code(),
        lars = snapshot.lars_len(),
        "reference data ready"
    );
    Ok((
        LookupGateways::from_snapshot(snapshot, academic_year),
        academic_year,
    ))
}

/// Options from `--config`, with command-line flags layered on top.
pub fn build_options(args: &ValidateArgs) -> Result<ValidationOptions> {
    let mut options = match &args.config {
        Some(path) => load_options(path).context("load validation options")?,
        None => ValidationOptions::new(),
    };
    if let Some(threads) = args.threads {
        options = options.with_threads(threads);
    }
    for rule_name in &args.skip_rules {
        options = options.with_disabled_rule(rule_name.as_str());
    }
    for rule_name in &args.only_rules {
        options = options.with_only_rule(rule_name.as_str());
    }
    if args.fail_on_warnings {
        options = options.with_fail_on_warnings(true);
    }
    Ok(options)
}

fn warn_unknown_rules(registry: &RuleRegistry, options: &ValidationOptions) {
    let named = options
        .disabled_rules
        .iter()
        .chain(options.only_rules.iter().flatten());
    for rule_name in named {
        if registry.get(rule_name).is_none() {
            warn!(rule = %rule_name, "unknown rule name in options");
        }
    }
}

fn progress_bar(learners: usize, hidden: bool) -> ProgressBar {
    if hidden || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(learners as u64), ProgressDrawTarget::stderr());
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} learners")
    {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn write_report(path: &Path, result: &ValidateResult) -> Result<()> {
    let report = ValidationReport {
        academic_year: result.academic_year.clone(),
        learners: result.learners,
        errors: result.outcome.errors.clone(),
        diagnostics: result.outcome.diagnostics.clone(),
        fingerprint: result.fingerprint.clone(),
    };
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)
        .with_context(|| format!("write report to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("write report to {}", path.display()))?;
    debug!(path = %path.display(), "wrote validation report");
    Ok(())
}

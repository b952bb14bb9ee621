//! Evaluation of a rule set over a learner population.
//!
//! Learners are evaluated in parallel; the rules for one learner run in
//! registration order on a single worker. Every (learner, rule) pair is
//! isolated: a rule that errors or panics loses its partial findings and
//! leaves one [`RuleDiagnostic`] behind, and the run carries on.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{Span, debug, debug_span, info, warn};

use ilr_model::{
    Learner, RuleDiagnostic, Severity, ValidationError, validate_population_identity,
};
use ilr_reference::LookupGateways;

use crate::aggregator::ErrorAggregator;
use crate::derived::{DerivedDataCache, DerivedDataRegistry};
use crate::options::ValidationOptions;
use crate::redact::redact_value;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleContext};

/// Cooperative stop signal shared between a run and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop scheduling further (learner, rule) pairs.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    /// Findings in learner input order, then rule registration order.
    pub errors: Vec<ValidationError>,
    /// Rules that failed to execute, in the same order.
    pub diagnostics: Vec<RuleDiagnostic>,
    /// True when at least one learner's rule set was cut short by
    /// cancellation; `errors` holds what was collected.
    pub cancelled: bool,
    /// Learners whose full rule set ran.
    pub learners_evaluated: usize,
    /// (learner, rule) pairs executed, including failed ones.
    pub rules_evaluated: usize,
}

impl ValidationOutcome {
    /// Findings with a blocking severity.
    pub fn error_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|error| error.severity.is_blocking())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|error| error.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Whether the run should be reported as failed.
    pub fn is_failure(&self, fail_on_warnings: bool) -> bool {
        self.has_errors() || (fail_on_warnings && self.warning_count() > 0)
    }

    /// SHA-256 (hex) of the serialised error list, for comparing runs.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(&self.errors).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }
}

#[derive(Default)]
struct LearnerOutcome {
    errors: Vec<ValidationError>,
    diagnostics: Vec<RuleDiagnostic>,
    rules_evaluated: usize,
    completed: bool,
}

/// Runs a fixed rule set against learner populations.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    registry: RuleRegistry,
    derived: Arc<DerivedDataRegistry>,
}

impl RuleEngine {
    pub fn new(registry: RuleRegistry, derived: Arc<DerivedDataRegistry>) -> Self {
        Self { registry, derived }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Validate `learners` against the enabled rules.
    ///
    /// A fresh derived-data cache is created for the run and dropped when it
    /// returns, so nothing computed here is visible to a later run.
    pub fn run(
        &self,
        learners: &[Learner],
        gateways: &LookupGateways,
        options: &ValidationOptions,
        cancel: &CancellationToken,
    ) -> ValidationOutcome {
        let rules = self.registry.filtered(options);
        let run_span = debug_span!(
            "validation_run",
            learners = learners.len(),
            rules = rules.len()
        );
        let _guard = run_span.enter();

        if validate_population_identity(learners).is_err() {
            warn!("learner population has empty or repeated identities; facts stay per record");
        }

        let cache = DerivedDataCache::new(Arc::clone(&self.derived));
        let ctx = RuleContext::new(gateways, &cache);
        let finished = AtomicUsize::new(0);

        let evaluate_all = || -> Vec<LearnerOutcome> {
            learners
                .par_iter()
                .map(|learner| {
                    let outcome = evaluate_learner(learner, &rules, &ctx, cancel, &run_span);
                    options.report_progress(finished.fetch_add(1, Ordering::Relaxed) + 1);
                    outcome
                })
                .collect()
        };

        let per_learner = match options.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
            {
                Ok(pool) => pool.install(evaluate_all),
                Err(err) => {
                    warn!(threads, error = %err, "could not build worker pool, using global pool");
                    evaluate_all()
                }
            },
            None => evaluate_all(),
        };

        let mut outcome = ValidationOutcome::default();
        for learner in per_learner {
            outcome.errors.extend(learner.errors);
            outcome.diagnostics.extend(learner.diagnostics);
            outcome.rules_evaluated += learner.rules_evaluated;
            if learner.completed {
                outcome.learners_evaluated += 1;
            } else {
                outcome.cancelled = true;
            }
        }

        info!(
            learners = outcome.learners_evaluated,
            rule_evaluations = outcome.rules_evaluated,
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            diagnostics = outcome.diagnostics.len(),
            cancelled = outcome.cancelled,
            "validation run finished"
        );
        outcome
    }
}

fn evaluate_learner(
    learner: &Learner,
    rules: &[Arc<dyn Rule>],
    ctx: &RuleContext<'_>,
    cancel: &CancellationToken,
    parent: &Span,
) -> LearnerOutcome {
    let span = debug_span!(
        parent: parent,
        "learner",
        learn_ref = redact_value(&learner.learn_ref_number)
    );
    let _guard = span.enter();

    let mut outcome = LearnerOutcome::default();
    for rule in rules {
        if cancel.is_cancelled() {
            debug!("cancelled");
            return outcome;
        }
        let mut scratch = ErrorAggregator::with_severity(rule.severity());
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            rule.validate(learner, ctx, &mut scratch)
        }));
        outcome.rules_evaluated += 1;

        let failure = match result {
            Ok(Ok(())) => {
                outcome.errors.extend(scratch.into_errors());
                continue;
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("rule panicked: {}", panic_message(payload.as_ref())),
        };
        warn!(
            rule = rule.rule_name(),
            learn_ref = redact_value(&learner.learn_ref_number),
            error = %failure,
            "rule failed; its findings for this learner were discarded"
        );
        outcome.diagnostics.push(RuleDiagnostic {
            rule_name: rule.rule_name().to_string(),
            learn_ref_number: learner.learn_ref_number.clone(),
            error: failure,
        });
    }
    outcome.completed = true;
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Validate `learners` against `rules` with default options and the built-in
/// derived facts.
pub fn run_validation(
    learners: &[Learner],
    rules: &RuleRegistry,
    gateways: &LookupGateways,
) -> Vec<ValidationError> {
    let engine = RuleEngine::new(
        rules.clone(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    );
    engine
        .run(
            learners,
            gateways,
            &ValidationOptions::default(),
            &CancellationToken::new(),
        )
        .errors
}

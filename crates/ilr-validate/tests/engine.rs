//! Orchestration behaviour: isolation, ordering, caching and cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use ilr_model::{
    AppFinRecord, EmploymentStatusMonitoring, Learner, LearnerEmploymentStatus, LearningDelivery,
    LearningDeliveryFam, Severity,
};
use ilr_reference::{
    AcademicYear, ContractAllocation, LarsLearningDelivery, LookupGateways, ReferenceSnapshot,
};
use ilr_validate::{
    CancellationToken, DerivedDataCache, DerivedDataRegistry, ErrorAggregator, FactValue, Rule,
    RuleContext, RuleEngine, RuleError, RuleRegistry, ValidationOptions, default_rules,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn lars(aim: &str, level: &str) -> LarsLearningDelivery {
    LarsLearningDelivery {
        learn_aim_ref: aim.to_string(),
        notional_nvq_level: Some(level.to_string()),
        basic_skills_type: None,
        effective_from: d(2015, 8, 1),
        effective_to: None,
        categories: Vec::new(),
    }
}

fn gateways() -> LookupGateways {
    let snapshot = ReferenceSnapshot::new(10006341, d(2019, 10, 2))
        .with_contract_allocation(ContractAllocation {
            contract_allocation_number: "AEB-1920-01".to_string(),
            funding_stream_period_code: "AEB-AS".to_string(),
            start_date: Some(d(2019, 8, 1)),
            end_date: Some(d(2020, 7, 31)),
        })
        .with_lars(lars("60005105", "2"))
        .with_lars(lars("50086832", "3"))
        .with_lars(lars("ZPROG001", "3"));
    LookupGateways::from_snapshot(snapshot, AcademicYear::starting(2019))
}

/// A population where most learners trip at least one built-in rule.
fn population(size: usize) -> Vec<Learner> {
    (0..size)
        .map(|i| {
            let start = d(2019, 8, 1) + chrono::Days::new((i % 400) as u64 * 2);
            let mut delivery = LearningDelivery::new(1, "60005105", start);
            match i % 5 {
                0 => {
                    delivery.aim_type = 1;
                    delivery.fund_model = 81;
                    delivery.prog_type = Some(25);
                    delivery.learn_aim_ref = "ZPROG001".to_string();
                    delivery.app_fin_records =
                        Some(vec![AppFinRecord::new("TNP", 2, 500, start)]);
                }
                1 => {
                    delivery.fund_model = 35;
                    delivery.learning_delivery_fams = Some(
                        (1..=3)
                            .map(|code| LearningDeliveryFam::new("HHS", code.to_string()))
                            .collect(),
                    );
                }
                2 => {
                    delivery.fund_model = 35;
                    delivery.learn_act_end_date = Some(start - chrono::Days::new(1));
                    delivery.learning_delivery_fams =
                        Some(vec![LearningDeliveryFam::new("LDM", "318")]);
                }
                3 => {
                    delivery.fund_model = 35;
                    delivery.prog_type = Some(24);
                    delivery.aim_type = 3;
                    delivery.learn_aim_ref = "50086832".to_string();
                }
                _ => {
                    delivery.fund_model = 99;
                }
            }
            Learner {
                learner_employment_statuses: Some(vec![LearnerEmploymentStatus {
                    emp_stat: 11,
                    date_emp_stat_app: d(2019, 7, 1),
                    employment_status_monitorings: Some(vec![EmploymentStatusMonitoring {
                        esm_type: "BSI".to_string(),
                        esm_code: 3,
                    }]),
                }]),
                learning_deliveries: Some(vec![delivery]),
                ..Learner::new(format!("L{i:05}"))
            }
        })
        .collect()
}

fn default_engine() -> RuleEngine {
    RuleEngine::new(
        RuleRegistry::from_rules(default_rules()).unwrap(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    )
}

/// Emits one error, then misbehaves for learner `BAD`.
struct Faulty {
    name: &'static str,
    panics: bool,
}

impl Rule for Faulty {
    fn rule_name(&self) -> &'static str {
        self.name
    }

    fn validate(
        &self,
        learner: &Learner,
        _ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        errors.handle(self.name, &learner.learn_ref_number, None, Vec::new());
        if learner.learn_ref_number == "BAD" {
            if self.panics {
                panic!("planted failure");
            }
            return Err(RuleError::Other("planted failure".to_string()));
        }
        Ok(())
    }
}

/// Flags every learner; reads a derived fact first.
struct ReadsFact {
    name: &'static str,
    fact: &'static str,
}

impl Rule for ReadsFact {
    fn rule_name(&self) -> &'static str {
        self.name
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        ctx.derived().get(self.fact, learner, None)?;
        errors.handle(self.name, &learner.learn_ref_number, None, Vec::new());
        Ok(())
    }
}

fn counting_facts(counter: &Arc<AtomicUsize>) -> Arc<DerivedDataRegistry> {
    let counter = Arc::clone(counter);
    let mut registry = DerivedDataRegistry::with_builtin_facts();
    registry.register("COUNTED", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        FactValue::Bool(true)
    });
    Arc::new(registry)
}

#[test]
fn failing_rules_are_isolated() {
    let rules: Vec<Arc<dyn Rule>> = vec![
        Arc::new(Faulty {
            name: "Panics",
            panics: true,
        }),
        Arc::new(Faulty {
            name: "Errs",
            panics: false,
        }),
        Arc::new(ReadsFact {
            name: "Healthy",
            fact: "DD06",
        }),
    ];
    let engine = RuleEngine::new(
        RuleRegistry::from_rules(rules).unwrap(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    );
    let learners = vec![Learner::new("A"), Learner::new("BAD"), Learner::new("C")];

    let outcome = engine.run(
        &learners,
        &gateways(),
        &ValidationOptions::default(),
        &CancellationToken::new(),
    );

    let emitted: Vec<_> = outcome
        .errors
        .iter()
        .map(|e| (e.learn_ref_number.as_str(), e.rule_name.as_str()))
        .collect();
    assert_eq!(
        emitted,
        vec![
            ("A", "Panics"),
            ("A", "Errs"),
            ("A", "Healthy"),
            ("BAD", "Healthy"),
            ("C", "Panics"),
            ("C", "Errs"),
            ("C", "Healthy"),
        ]
    );
    assert_eq!(outcome.diagnostics.len(), 2);
    assert!(outcome.diagnostics.iter().all(|d| d.learn_ref_number == "BAD"));
    assert_eq!(outcome.diagnostics[0].rule_name, "Panics");
    assert!(outcome.diagnostics[0].error.contains("planted failure"));
    assert_eq!(outcome.diagnostics[1].rule_name, "Errs");
    assert_eq!(outcome.learners_evaluated, 3);
    assert_eq!(outcome.rules_evaluated, 9);
    assert_eq!(outcome.warning_count(), 3);
}

fn programme_learner(learn_ref_number: &str, date_of_birth: NaiveDate, prog_type: i32) -> Learner {
    Learner {
        date_of_birth: Some(date_of_birth),
        learning_deliveries: Some(vec![LearningDelivery {
            aim_type: 1,
            fund_model: 36,
            prog_type: Some(prog_type),
            std_code: Some(17),
            ..LearningDelivery::new(1, "ZPROG001", d(2019, 9, 1))
        }]),
        ..Learner::new(learn_ref_number)
    }
}

#[test]
fn learners_sharing_a_reference_do_not_share_facts() {
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(ilr_validate::rules::DateOfBirth38)];
    let engine = RuleEngine::new(
        RuleRegistry::from_rules(rules).unwrap(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    );
    let apprentice = programme_learner("DUP", d(2000, 1, 1), 25);
    let trainee = programme_learner("DUP", d(2010, 1, 1), 24);
    let options = ValidationOptions::new().with_threads(1);

    let alone = engine.run(
        std::slice::from_ref(&trainee),
        &gateways(),
        &options,
        &CancellationToken::new(),
    );
    let together = engine.run(
        &[apprentice, trainee],
        &gateways(),
        &options,
        &CancellationToken::new(),
    );

    assert!(alone.errors.is_empty());
    assert_eq!(together.errors, alone.errors);
    assert_eq!(together.learners_evaluated, 2);
    assert!(together.diagnostics.is_empty());
}

#[test]
fn unknown_fact_becomes_a_diagnostic() {
    let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(ReadsFact {
        name: "Misconfigured",
        fact: "DD99",
    })];
    let engine = RuleEngine::new(
        RuleRegistry::from_rules(rules).unwrap(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    );

    let outcome = engine.run(
        &[Learner::new("A")],
        &gateways(),
        &ValidationOptions::default(),
        &CancellationToken::new(),
    );

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].error.contains("DD99"));
}

#[test]
fn repeated_runs_are_identical() {
    let engine = default_engine();
    let learners = population(250);
    let gateways = gateways();
    let options = ValidationOptions::default();

    let first = engine.run(&learners, &gateways, &options, &CancellationToken::new());
    let second = engine.run(&learners, &gateways, &options, &CancellationToken::new());

    assert!(!first.errors.is_empty());
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn output_order_does_not_depend_on_thread_count() {
    let engine = default_engine();
    let learners = population(300);
    let gateways = gateways();

    let single = engine.run(
        &learners,
        &gateways,
        &ValidationOptions::new().with_threads(1),
        &CancellationToken::new(),
    );
    let many = engine.run(
        &learners,
        &gateways,
        &ValidationOptions::new().with_threads(8),
        &CancellationToken::new(),
    );

    assert_eq!(single.errors, many.errors);
    assert_eq!(single.fingerprint(), many.fingerprint());
    let positions: Vec<_> = single
        .errors
        .iter()
        .map(|e| learners.iter().position(|l| l.learn_ref_number == e.learn_ref_number))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn disabled_rules_are_skipped() {
    let engine = default_engine();
    let learners = population(20);
    let options = ValidationOptions::new().with_only_rule("LearnDelFAMType_14");

    let outcome = engine.run(&learners, &gateways(), &options, &CancellationToken::new());

    assert!(!outcome.errors.is_empty());
    assert!(
        outcome
            .errors
            .iter()
            .all(|e| e.rule_name == "LearnDelFAMType_14")
    );
    assert_eq!(outcome.rules_evaluated, learners.len());
}

#[test]
fn cancelled_before_start_yields_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = default_engine().run(
        &population(50),
        &gateways(),
        &ValidationOptions::default(),
        &cancel,
    );

    assert!(outcome.cancelled);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.learners_evaluated, 0);
    assert_eq!(outcome.rules_evaluated, 0);
}

/// Cancels the run when it reaches learner `STOP`.
struct CancelsAt(CancellationToken);

impl Rule for CancelsAt {
    fn rule_name(&self) -> &'static str {
        "CancelsAt"
    }

    fn validate(
        &self,
        learner: &Learner,
        _ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        if learner.learn_ref_number == "STOP" {
            self.0.cancel();
        }
        errors.handle("CancelsAt", &learner.learn_ref_number, None, Vec::new());
        Ok(())
    }
}

#[test]
fn cancellation_keeps_collected_errors() {
    let cancel = CancellationToken::new();
    let rules: Vec<Arc<dyn Rule>> = vec![
        Arc::new(CancelsAt(cancel.clone())),
        Arc::new(ReadsFact {
            name: "After",
            fact: "DD06",
        }),
    ];
    let engine = RuleEngine::new(
        RuleRegistry::from_rules(rules).unwrap(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    );
    let mut learners = vec![Learner::new("STOP")];
    learners.extend((0..50).map(|i| Learner::new(format!("L{i}"))));

    let outcome = engine.run(
        &learners,
        &gateways(),
        &ValidationOptions::new().with_threads(2),
        &cancel,
    );

    assert!(outcome.cancelled);
    assert!(outcome.learners_evaluated < learners.len());
    assert_eq!(outcome.errors[0].learn_ref_number, "STOP");
    assert_eq!(outcome.errors[0].rule_name, "CancelsAt");
    assert!(
        !outcome
            .errors
            .iter()
            .any(|e| e.learn_ref_number == "STOP" && e.rule_name == "After")
    );
}

#[test]
fn cancelling_after_the_last_learner_is_not_a_cancelled_run() {
    let cancel = CancellationToken::new();
    let learners = population(20);
    let total = learners.len();
    let hook = cancel.clone();
    let options = ValidationOptions::new()
        .with_threads(2)
        .with_progress(Arc::new(move |done: usize| {
            if done == total {
                hook.cancel();
            }
        }));

    let outcome = default_engine().run(&learners, &gateways(), &options, &cancel);

    assert!(cancel.is_cancelled());
    assert!(!outcome.cancelled);
    assert_eq!(outcome.learners_evaluated, total);
    assert!(!outcome.errors.is_empty());
}

#[test]
fn facts_are_computed_once_per_learner_per_run() {
    let counter = Arc::new(AtomicUsize::new(0));
    let rules: Vec<Arc<dyn Rule>> = vec![
        Arc::new(ReadsFact {
            name: "First",
            fact: "COUNTED",
        }),
        Arc::new(ReadsFact {
            name: "Second",
            fact: "COUNTED",
        }),
    ];
    let engine = RuleEngine::new(
        RuleRegistry::from_rules(rules).unwrap(),
        counting_facts(&counter),
    );
    let learners: Vec<_> = (0..40).map(|i| Learner::new(format!("L{i}"))).collect();
    let options = ValidationOptions::new().with_threads(4);

    engine.run(&learners, &gateways(), &options, &CancellationToken::new());
    assert_eq!(counter.load(Ordering::SeqCst), learners.len());

    // A second run starts from an empty cache.
    engine.run(&learners, &gateways(), &options, &CancellationToken::new());
    assert_eq!(counter.load(Ordering::SeqCst), 2 * learners.len());
}

#[test]
fn concurrent_first_access_computes_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let slow_counter = Arc::clone(&counter);
    let mut registry = DerivedDataRegistry::new();
    registry.register("SLOW", move |learner, _| {
        slow_counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        FactValue::Bool(learner.learn_ref_number.ends_with('1'))
    });
    let cache = DerivedDataCache::new(Arc::new(registry));
    let learner = Learner::new("L1");

    let values: Vec<FactValue> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.get("SLOW", &learner, None).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|value| *value == FactValue::Bool(true)));
    assert_eq!(cache.computed_len(), 1);
}

#[test]
fn progress_is_reported_per_learner() {
    let seen = Arc::new(Mutex::new(Vec::<usize>::new()));
    let sink = Arc::clone(&seen);
    let options = ValidationOptions::new()
        .with_threads(3)
        .with_progress(Arc::new(move |done: usize| sink.lock().unwrap().push(done)));
    let learners = population(30);

    default_engine().run(&learners, &gateways(), &options, &CancellationToken::new());

    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, (1..=learners.len()).collect::<Vec<_>>());
}

//! Property tests: results for a learner never depend on who else is in
//! the population, and repeated runs agree.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use ilr_model::{AppFinRecord, Learner, LearningDelivery, LearningDeliveryFam, ValidationError};
use ilr_reference::{AcademicYear, LookupGateways, ReferenceSnapshot};
use ilr_validate::{
    CancellationToken, DerivedDataRegistry, RuleEngine, RuleRegistry, ValidationOptions,
    default_rules,
};
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 8, 1).unwrap()
}

fn born() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn gateways() -> LookupGateways {
    LookupGateways::from_snapshot(
        ReferenceSnapshot::new(10006341, base_date()),
        AcademicYear::starting(2019),
    )
}

fn engine() -> RuleEngine {
    RuleEngine::new(
        RuleRegistry::from_rules(default_rules()).unwrap(),
        Arc::new(DerivedDataRegistry::with_builtin_facts()),
    )
}

fn fam_list() -> impl Strategy<Value = Option<Vec<LearningDeliveryFam>>> {
    let fam = (
        prop::sample::select(vec!["HHS", "FFI", "LDM", "ACT", "SOF"]),
        prop::sample::select(vec!["1", "2", "318"]),
    )
        .prop_map(|(fam_type, code)| LearningDeliveryFam::new(fam_type, code));
    prop::option::of(prop::collection::vec(fam, 0..5))
}

fn app_fin_list() -> impl Strategy<Value = Option<Vec<AppFinRecord>>> {
    let record = (prop::sample::select(vec!["TNP", "PMR", "XXX"]), 0..4i32)
        .prop_map(|(afin_type, code)| AppFinRecord::new(afin_type, code, 100, base_date()));
    prop::option::of(prop::collection::vec(record, 0..3))
}

fn delivery(aim_seq_number: i64) -> impl Strategy<Value = LearningDelivery> {
    (
        prop::sample::select(vec![35, 36, 81, 99]),
        prop::option::of(prop::sample::select(vec![2, 24, 25])),
        prop::sample::select(vec![1, 3]),
        0u64..1000,
        prop::option::of(0u64..400),
        fam_list(),
        app_fin_list(),
    )
        .prop_map(
            move |(fund_model, prog_type, aim_type, start_offset, duration, fams, records)| {
                let start = base_date() + Days::new(start_offset);
                LearningDelivery {
                    aim_type,
                    fund_model,
                    prog_type,
                    learn_act_end_date: duration.map(|days| start + Days::new(days)),
                    learning_delivery_fams: fams,
                    app_fin_records: records,
                    ..LearningDelivery::new(aim_seq_number, "ZPROG001", start)
                }
            },
        )
}

fn learner(learn_ref_number: String) -> impl Strategy<Value = Learner> {
    (
        prop::option::of(0u64..10_000),
        prop::option::of((delivery(1), prop::option::of(delivery(2)))),
    )
        .prop_map(move |(age_days, deliveries)| Learner {
            date_of_birth: age_days.map(|days| born() + Days::new(days)),
            learning_deliveries: deliveries.map(|(first, second)| {
                let mut all = vec![first];
                all.extend(second);
                all
            }),
            ..Learner::new(learn_ref_number.clone())
        })
}

fn population() -> impl Strategy<Value = Vec<Learner>> {
    (1usize..12).prop_flat_map(|size| {
        (0..size)
            .map(|i| learner(format!("P{i:03}")))
            .collect::<Vec<_>>()
    })
}

fn run(learners: &[Learner], threads: usize) -> Vec<ValidationError> {
    engine()
        .run(
            learners,
            &gateways(),
            &ValidationOptions::new().with_threads(threads),
            &CancellationToken::new(),
        )
        .errors
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn learner_results_do_not_depend_on_neighbours(learners in population()) {
        let together = run(&learners, 4);
        for learner in &learners {
            let alone = run(std::slice::from_ref(learner), 1);
            let from_population: Vec<_> = together
                .iter()
                .filter(|e| e.learn_ref_number == learner.learn_ref_number)
                .cloned()
                .collect();
            prop_assert_eq!(alone, from_population);
        }
    }

    #[test]
    fn repeated_runs_agree(learners in population()) {
        let options = ValidationOptions::default();
        let first = engine().run(&learners, &gateways(), &options, &CancellationToken::new());
        let second = engine().run(&learners, &gateways(), &options, &CancellationToken::new());
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
        prop_assert_eq!(first.errors, second.errors);
    }
}

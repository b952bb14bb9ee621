//! EmpStat_08: traineeship learners on other state benefits (DD28, DD29)
//! may not study aims above level 2.
//!
//! A learner whose employment status carries no benefit monitoring passes.

use chrono::NaiveDate;

use ilr_model::codes::{fund_model, prog_type};
use ilr_model::{ErrorMessageParameter, Learner};

use crate::aggregator::ErrorAggregator;
use crate::derived::{DD28, DD29};
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "EmpStat_08";

const MAXIMUM_LEVEL: u32 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmpStat08;

/// Adult skills funded traineeships; checked before any derived fact is read.
pub fn funding_condition_met(fund_model: i32, prog_type: Option<i32>) -> bool {
    fund_model == fund_model::ADULT_SKILLS && prog_type == Some(prog_type::TRAINEESHIP)
}

/// True for numeric levels above 2 and for the higher-level code `H`.
///
/// Entry level (`E`), mixed (`X`) and missing levels never trigger.
pub fn nvq_level_condition_met(notional_nvq_level: Option<&str>) -> bool {
    let Some(level) = notional_nvq_level.map(str::trim) else {
        return false;
    };
    if level.eq_ignore_ascii_case("H") {
        return true;
    }
    level
        .parse::<u32>()
        .is_ok_and(|level| level > MAXIMUM_LEVEL)
}

pub fn build_error_message_parameters(
    emp_stat: Option<i32>,
    fund_model: i32,
    prog_type: Option<i32>,
    learn_start_date: NaiveDate,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("EmpStat", emp_stat),
        ErrorAggregator::build_error_message_parameter("FundModel", fund_model),
        ErrorAggregator::build_error_message_parameter("ProgType", prog_type),
        ErrorAggregator::build_error_message_parameter("LearnStartDate", learn_start_date),
    ]
}

impl Rule for EmpStat08 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        let lars = ctx.gateways().lars.as_ref();
        for delivery in learner.learning_deliveries() {
            if !funding_condition_met(delivery.fund_model, delivery.prog_type)
                || !ctx.derived().get_bool(DD29, learner, Some(delivery))?
                || !ctx.derived().get_bool(DD28, learner, Some(delivery))?
                || !nvq_level_condition_met(lars.notional_nvq_level(&delivery.learn_aim_ref))
            {
                continue;
            }
            let emp_stat = learner
                .employment_status_on(delivery.learn_start_date)
                .map(|status| status.emp_stat);
            errors.handle(
                RULE_NAME,
                &learner.learn_ref_number,
                Some(delivery.aim_seq_number),
                build_error_message_parameters(
                    emp_stat,
                    delivery.fund_model,
                    delivery.prog_type,
                    delivery.learn_start_date,
                ),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ilr_model::{EmploymentStatusMonitoring, LearnerEmploymentStatus, LearningDelivery};
    use ilr_reference::{LarsLearningDelivery, ReferenceSnapshot};

    use std::sync::Arc;

    use super::*;
    use crate::derived::{DerivedDataCache, DerivedDataRegistry};
    use crate::rules::test_support::{d, gateways, run};

    fn trainee(monitorings: Option<Vec<EmploymentStatusMonitoring>>) -> Learner {
        Learner {
            learner_employment_statuses: Some(vec![LearnerEmploymentStatus {
                emp_stat: 11,
                date_emp_stat_app: d(2019, 8, 1),
                employment_status_monitorings: monitorings,
            }]),
            learning_deliveries: Some(vec![LearningDelivery {
                aim_type: 3,
                fund_model: 35,
                prog_type: Some(24),
                ..LearningDelivery::new(2, "50086832", d(2019, 9, 1))
            }]),
            ..Learner::new("L1")
        }
    }

    fn snapshot(level: &str) -> ReferenceSnapshot {
        ReferenceSnapshot::new(1, d(2019, 10, 2)).with_lars(LarsLearningDelivery {
            learn_aim_ref: "50086832".to_string(),
            notional_nvq_level: Some(level.to_string()),
            basic_skills_type: None,
            effective_from: d(2015, 8, 1),
            effective_to: None,
            categories: Vec::new(),
        })
    }

    fn universal_credit() -> Option<Vec<EmploymentStatusMonitoring>> {
        Some(vec![EmploymentStatusMonitoring {
            esm_type: "BSI".to_string(),
            esm_code: 4,
        }])
    }

    #[test]
    fn level_table() {
        let cases = [
            (None, false),
            (Some("E"), false),
            (Some("1"), false),
            (Some("2"), false),
            (Some("3"), true),
            (Some(" 4 "), true),
            (Some("h"), true),
            (Some("X"), false),
        ];
        for (level, expected) in cases {
            assert_eq!(nvq_level_condition_met(level), expected, "{level:?}");
        }
    }

    #[test]
    fn funding_table() {
        let cases = [
            (35, Some(24), true),
            (35, Some(25), false),
            (35, None, false),
            (36, Some(24), false),
            (99, Some(24), false),
        ];
        for (fund_model, prog_type, expected) in cases {
            assert_eq!(
                funding_condition_met(fund_model, prog_type),
                expected,
                "{fund_model} {prog_type:?}"
            );
        }
    }

    #[test]
    fn out_of_scope_deliveries_derive_nothing() {
        let mut learner = trainee(universal_credit());
        if let Some(deliveries) = learner.learning_deliveries.as_mut() {
            deliveries[0].fund_model = 36;
            deliveries[0].prog_type = Some(25);
        }
        let gateways = gateways(snapshot("3"));
        let cache = DerivedDataCache::new(Arc::new(DerivedDataRegistry::with_builtin_facts()));
        let ctx = RuleContext::new(&gateways, &cache);
        let mut errors = ErrorAggregator::with_severity(EmpStat08.severity());

        EmpStat08.validate(&learner, &ctx, &mut errors).unwrap();

        assert!(errors.into_errors().is_empty());
        assert_eq!(cache.computed_len(), 0);
    }

    #[test]
    fn level_three_trainee_on_benefits_is_reported() {
        let errors = run(&EmpStat08, &trainee(universal_credit()), &gateways(snapshot("3")))
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].parameter("EmpStat"), Some("11"));
        assert_eq!(errors[0].parameter("ProgType"), Some("24"));
    }

    #[test]
    fn level_two_passes() {
        let errors = run(&EmpStat08, &trainee(universal_credit()), &gateways(snapshot("2")))
            .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn no_monitoring_passes() {
        let errors = run(&EmpStat08, &trainee(None), &gateways(snapshot("3"))).unwrap();
        assert!(errors.is_empty());
    }
}

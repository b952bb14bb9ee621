//! AFinType_12: an apprenticeship standard programme aim funded under
//! "other adult" must carry a total negotiated price (TNP code 1 or 3).
//!
//! A delivery with no financial records triggers the rule.

use ilr_model::codes::{AppFinType, aim_type, fund_model, prog_type, tnp_code};
use ilr_model::{AppFinRecord, ErrorMessageParameter, Learner};
use ilr_reference::AppFinRecordQuery;

use crate::aggregator::ErrorAggregator;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "AFinType_12";

const TNP_PRICE_CODES: &[i32] = &[tnp_code::TRAINING_PRICE, tnp_code::RESIDUAL_TRAINING_PRICE];

#[derive(Debug, Clone, Copy, Default)]
pub struct AFinType12;

pub fn fund_model_condition_met(fund_model: i32) -> bool {
    fund_model == fund_model::OTHER_ADULT
}

pub fn prog_type_condition_met(prog_type: Option<i32>) -> bool {
    prog_type == Some(prog_type::APPRENTICESHIP_STANDARD)
}

pub fn aim_type_condition_met(aim_type: i32) -> bool {
    aim_type == aim_type::PROGRAMME_AIM
}

/// True when no TNP record with code 1 or 3 exists.
pub fn app_fin_condition_met(
    query: &dyn AppFinRecordQuery,
    records: Option<&[AppFinRecord]>,
) -> bool {
    !query.has_any_codes_for_type(records, AppFinType::Tnp, TNP_PRICE_CODES)
}

pub fn build_error_message_parameters(
    fund_model: i32,
    prog_type: Option<i32>,
    aim_type: i32,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("FundModel", fund_model),
        ErrorAggregator::build_error_message_parameter("ProgType", prog_type),
        ErrorAggregator::build_error_message_parameter("AimType", aim_type),
    ]
}

impl Rule for AFinType12 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        let app_fin = ctx.gateways().app_fin.as_ref();
        for delivery in learner.learning_deliveries() {
            if fund_model_condition_met(delivery.fund_model)
                && prog_type_condition_met(delivery.prog_type)
                && aim_type_condition_met(delivery.aim_type)
                && app_fin_condition_met(app_fin, delivery.app_fin_records.as_deref())
            {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(
                        delivery.fund_model,
                        delivery.prog_type,
                        delivery.aim_type,
                    ),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ilr_model::LearningDelivery;
    use ilr_reference::AppFinQueryService;

    use super::*;
    use crate::rules::test_support::{d, empty_gateways, run};

    #[test]
    fn local_predicates() {
        assert!(fund_model_condition_met(81));
        assert!(!fund_model_condition_met(36));
        assert!(prog_type_condition_met(Some(25)));
        assert!(!prog_type_condition_met(None));
        assert!(aim_type_condition_met(1));
        assert!(!aim_type_condition_met(3));
    }

    #[test]
    fn app_fin_condition_table() {
        let query = AppFinQueryService;
        let tnp = |code| AppFinRecord::new("TNP", code, 1500, d(2019, 8, 1));
        let cases = [
            (None, true),
            (Some(vec![]), true),
            (Some(vec![AppFinRecord::new("XXX", 0, 0, d(2019, 8, 1))]), true),
            (Some(vec![tnp(2)]), true),
            (Some(vec![tnp(1)]), false),
            (Some(vec![tnp(2), tnp(3)]), false),
        ];
        for (records, expected) in cases {
            assert_eq!(
                app_fin_condition_met(&query, records.as_deref()),
                expected,
                "{records:?}"
            );
        }
    }

    #[test]
    fn emits_one_error_per_matching_delivery() {
        let delivery = LearningDelivery {
            aim_type: 1,
            fund_model: 81,
            prog_type: Some(25),
            ..LearningDelivery::new(4, "ZPROG001", d(2019, 9, 1))
        };
        let other = LearningDelivery {
            fund_model: 36,
            ..delivery.clone()
        };
        let learner = Learner {
            learning_deliveries: Some(vec![delivery, other]),
            ..Learner::new("0fm8101")
        };

        let errors = run(&AFinType12, &learner, &empty_gateways()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].aim_seq_number, Some(4));
        assert_eq!(errors[0].parameter("ProgType"), Some("25"));
    }
}

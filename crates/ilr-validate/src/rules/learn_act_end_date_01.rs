//! LearnActEndDate_01: the actual end date must not precede the start date.

use chrono::NaiveDate;

use ilr_model::{ErrorMessageParameter, Learner};

use crate::aggregator::ErrorAggregator;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "LearnActEndDate_01";

#[derive(Debug, Clone, Copy, Default)]
pub struct LearnActEndDate01;

/// False while the delivery is still open.
pub fn condition_met(learn_start_date: NaiveDate, learn_act_end_date: Option<NaiveDate>) -> bool {
    learn_act_end_date.is_some_and(|end| end < learn_start_date)
}

pub fn build_error_message_parameters(
    learn_start_date: NaiveDate,
    learn_act_end_date: Option<NaiveDate>,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("LearnStartDate", learn_start_date),
        ErrorAggregator::build_error_message_parameter("LearnActEndDate", learn_act_end_date),
    ]
}

impl Rule for LearnActEndDate01 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        _ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        for delivery in learner.learning_deliveries() {
            if condition_met(delivery.learn_start_date, delivery.learn_act_end_date) {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(
                        delivery.learn_start_date,
                        delivery.learn_act_end_date,
                    ),
                );
            }
        }
        Ok(())
    }
}

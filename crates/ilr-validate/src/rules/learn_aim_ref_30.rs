//! LearnAimRef_30: an adult skills aim must be valid in LARS on its
//! start date.
//!
//! An aim reference LARS does not know cannot be judged; the rule fails for
//! that learner and a diagnostic is raised instead of a finding.

use chrono::NaiveDate;

use ilr_model::codes::fund_model;
use ilr_model::{ErrorMessageParameter, Learner};
use ilr_reference::LarsLearningDelivery;

use crate::aggregator::ErrorAggregator;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "LearnAimRef_30";

#[derive(Debug, Clone, Copy, Default)]
pub struct LearnAimRef30;

pub fn fund_model_condition_met(fund_model: i32) -> bool {
    fund_model == fund_model::ADULT_SKILLS
}

pub fn lars_condition_met(lars: &LarsLearningDelivery, learn_start_date: NaiveDate) -> bool {
    !lars.is_valid_on(learn_start_date)
}

pub fn build_error_message_parameters(
    learn_aim_ref: &str,
    learn_start_date: NaiveDate,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("LearnAimRef", learn_aim_ref),
        ErrorAggregator::build_error_message_parameter("LearnStartDate", learn_start_date),
    ]
}

impl Rule for LearnAimRef30 {
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
            if !fund_model_condition_met(delivery.fund_model) {
                continue;
            }
            let aim = lars
                .learning_delivery_for(&delivery.learn_aim_ref)
                .ok_or_else(|| {
                    RuleError::missing_reference(format!(
                        "LARS learning delivery {}",
                        delivery.learn_aim_ref
                    ))
                })?;
            if lars_condition_met(aim, delivery.learn_start_date) {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(
                        &delivery.learn_aim_ref,
                        delivery.learn_start_date,
                    ),
                );
            }
        }
        Ok(())
    }
}

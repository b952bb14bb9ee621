//! DateOfBirth_38: an apprentice must be at least 16 on the day their
//! programme started (DD04).
//!
//! A learner without a date of birth passes, as does a delivery whose
//! programme start cannot be derived.

use chrono::NaiveDate;

use ilr_model::codes::aim_type;
use ilr_model::dates::age_at;
use ilr_model::{ErrorMessageParameter, Learner};

use crate::aggregator::ErrorAggregator;
use crate::derived::{DD04, DD07};
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "DateOfBirth_38";

pub const MINIMUM_AGE: i32 = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct DateOfBirth38;

pub fn aim_type_condition_met(aim_type: i32) -> bool {
    aim_type == aim_type::PROGRAMME_AIM
}

pub fn age_condition_met(
    date_of_birth: Option<NaiveDate>,
    programme_start_date: Option<NaiveDate>,
) -> bool {
    match (date_of_birth, programme_start_date) {
        (Some(date_of_birth), Some(start)) => age_at(date_of_birth, start) < MINIMUM_AGE,
        _ => false,
    }
}

pub fn build_error_message_parameters(
    date_of_birth: Option<NaiveDate>,
    programme_start_date: Option<NaiveDate>,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("DateOfBirth", date_of_birth),
        ErrorAggregator::build_error_message_parameter("LearnStartDate", programme_start_date),
    ]
}

impl Rule for DateOfBirth38 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        if learner.date_of_birth.is_none() {
            return Ok(());
        }
        for delivery in learner.learning_deliveries() {
            if !aim_type_condition_met(delivery.aim_type)
                || !ctx.derived().get_bool(DD07, learner, Some(delivery))?
            {
                continue;
            }
            let programme_start = ctx.derived().get_date(DD04, learner, Some(delivery))?;
            if age_condition_met(learner.date_of_birth, programme_start) {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(learner.date_of_birth, programme_start),
                );
            }
        }
        Ok(())
    }
}

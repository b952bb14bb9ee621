//! LearnStartDate_12: a delivery may not start more than one year after
//! the end of the academic year being returned.

use chrono::NaiveDate;

use ilr_model::dates::add_years;
use ilr_model::{ErrorMessageParameter, Learner};
use ilr_reference::AcademicYearQuery;

use crate::aggregator::ErrorAggregator;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "LearnStartDate_12";

#[derive(Debug, Clone, Copy, Default)]
pub struct LearnStartDate12;

pub fn condition_met(academic_year: &dyn AcademicYearQuery, learn_start_date: NaiveDate) -> bool {
    learn_start_date > add_years(academic_year.end(), 1)
}

pub fn build_error_message_parameters(learn_start_date: NaiveDate) -> Vec<ErrorMessageParameter> {
    vec![ErrorAggregator::build_error_message_parameter(
        "LearnStartDate",
        learn_start_date,
    )]
}

impl Rule for LearnStartDate12 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        let academic_year = ctx.gateways().academic_year.as_ref();
        for delivery in learner.learning_deliveries() {
            if condition_met(academic_year, delivery.learn_start_date) {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(delivery.learn_start_date),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ilr_reference::AcademicYear;

    use super::*;
    use crate::rules::test_support::d;

    #[test]
    fn boundary_is_one_year_after_year_end() {
        let year = AcademicYear::starting(2019);
        assert!(!condition_met(&year, d(2019, 8, 1)));
        assert!(!condition_met(&year, d(2021, 7, 31)));
        assert!(condition_met(&year, d(2021, 8, 1)));
    }
}

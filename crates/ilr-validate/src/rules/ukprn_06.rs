//! UKPRN_06: an adult skills delivery needs an adult skills contract
//! allocation open on its start date.
//!
//! Deliveries under an employer contract (ACT) or flagged as a restart (RES)
//! are exempt. A delivery with no FAMs is not exempt.

use chrono::NaiveDate;

use ilr_model::codes::{LearnDelFamType, fund_model, funding_stream, learn_del_fam_code};
use ilr_model::{ErrorMessageParameter, Learner, LearningDeliveryFam};
use ilr_reference::{FcsData, LearningDeliveryFamQuery};

use crate::aggregator::ErrorAggregator;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "UKPRN_06";

#[derive(Debug, Clone, Copy, Default)]
pub struct Ukprn06;

pub fn fund_model_condition_met(fund_model: i32) -> bool {
    fund_model == fund_model::ADULT_SKILLS
}

pub fn is_excluded(
    query: &dyn LearningDeliveryFamQuery,
    fams: Option<&[LearningDeliveryFam]>,
) -> bool {
    query.has_code_for_type(
        fams,
        LearnDelFamType::Act,
        learn_del_fam_code::ACT_EMPLOYER_CONTRACT,
    ) || query.has_code_for_type(fams, LearnDelFamType::Res, learn_del_fam_code::RES_RESTART)
}

/// True when no adult skills allocation covers the start date.
pub fn fcs_condition_met(fcs: &dyn FcsData, learn_start_date: NaiveDate) -> bool {
    !fcs.has_contract_allocation_covering(funding_stream::ADULT_SKILLS, learn_start_date)
}

pub fn build_error_message_parameters(
    ukprn: i64,
    fund_model: i32,
    learn_start_date: NaiveDate,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("UKPRN", ukprn),
        ErrorAggregator::build_error_message_parameter("FundModel", fund_model),
        ErrorAggregator::build_error_message_parameter("LearnStartDate", learn_start_date),
    ]
}

impl Rule for Ukprn06 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        let gateways = ctx.gateways();
        for delivery in learner.learning_deliveries() {
            if fund_model_condition_met(delivery.fund_model)
                && !is_excluded(
                    gateways.fams.as_ref(),
                    delivery.learning_delivery_fams.as_deref(),
                )
                && fcs_condition_met(gateways.fcs.as_ref(), delivery.learn_start_date)
            {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(
                        gateways.file_data.ukprn(),
                        delivery.fund_model,
                        delivery.learn_start_date,
                    ),
                );
            }
        }
        Ok(())
    }
}

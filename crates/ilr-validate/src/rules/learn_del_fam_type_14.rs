//! LearnDelFAMType_14: a delivery may record at most two household
//! situation (HHS) FAMs.
//!
//! A delivery with no FAMs passes.

use ilr_model::codes::LearnDelFamType;
use ilr_model::{ErrorMessageParameter, Learner, LearningDeliveryFam};
use ilr_reference::LearningDeliveryFamQuery;

use crate::aggregator::ErrorAggregator;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "LearnDelFAMType_14";

const MAX_HOUSEHOLD_SITUATIONS: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct LearnDelFamType14;

pub fn condition_met(
    query: &dyn LearningDeliveryFamQuery,
    fams: Option<&[LearningDeliveryFam]>,
) -> bool {
    query.count_by_type(fams, LearnDelFamType::Hhs) > MAX_HOUSEHOLD_SITUATIONS
}

pub fn build_error_message_parameters() -> Vec<ErrorMessageParameter> {
    vec![ErrorAggregator::build_error_message_parameter(
        "LearnDelFAMType",
        LearnDelFamType::Hhs.as_str(),
    )]
}

impl Rule for LearnDelFamType14 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        let fams = ctx.gateways().fams.as_ref();
        for delivery in learner.learning_deliveries() {
            if condition_met(fams, delivery.learning_delivery_fams.as_deref()) {
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(),
                );
            }
        }
        Ok(())
    }
}

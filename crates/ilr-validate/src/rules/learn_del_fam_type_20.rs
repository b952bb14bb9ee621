//! LearnDelFAMType_20: adult skills learners who are unemployed and on
//! benefits (DD21) must be recorded as fully funded (FFI 1).
//!
//! A delivery with no FAMs, or no FFI, triggers the rule.

use ilr_model::codes::{LearnDelFamType, fund_model, learn_del_fam_code};
use ilr_model::{ErrorMessageParameter, Learner, LearningDeliveryFam};
use ilr_reference::LearningDeliveryFamQuery;

use crate::aggregator::ErrorAggregator;
use crate::derived::DD21;
use crate::error::RuleError;
use crate::rule::{Rule, RuleContext};

pub const RULE_NAME: &str = "LearnDelFAMType_20";

#[derive(Debug, Clone, Copy, Default)]
pub struct LearnDelFamType20;

pub fn fund_model_condition_met(fund_model: i32) -> bool {
    fund_model == fund_model::ADULT_SKILLS
}

/// True unless an FFI record with the fully funded code exists.
pub fn fam_condition_met(
    query: &dyn LearningDeliveryFamQuery,
    fams: Option<&[LearningDeliveryFam]>,
) -> bool {
    !query.has_code_for_type(
        fams,
        LearnDelFamType::Ffi,
        learn_del_fam_code::FFI_FULLY_FUNDED,
    )
}

pub fn build_error_message_parameters(
    fund_model: i32,
    ffi_code: Option<&str>,
) -> Vec<ErrorMessageParameter> {
    vec![
        ErrorAggregator::build_error_message_parameter("FundModel", fund_model),
        ErrorAggregator::build_error_message_parameter(
            "LearnDelFAMType",
            LearnDelFamType::Ffi.as_str(),
        ),
        ErrorAggregator::build_error_message_parameter("LearnDelFAMCode", ffi_code),
    ]
}

impl Rule for LearnDelFamType20 {
    fn rule_name(&self) -> &'static str {
        RULE_NAME
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError> {
        let query = ctx.gateways().fams.as_ref();
        for delivery in learner.learning_deliveries() {
            let fams = delivery.learning_delivery_fams.as_deref();
            if fund_model_condition_met(delivery.fund_model)
                && fam_condition_met(query, fams)
                && ctx.derived().get_bool(DD21, learner, Some(delivery))?
            {
                let ffi_code = query
                    .fams_for_type(fams, LearnDelFamType::Ffi)
                    .first()
                    .map(|fam| fam.learn_del_fam_code.as_str());
                errors.handle(
                    RULE_NAME,
                    &learner.learn_ref_number,
                    Some(delivery.aim_seq_number),
                    build_error_message_parameters(delivery.fund_model, ffi_code),
                );
            }
        }
        Ok(())
    }
}

//! Built-in derived facts.
//!
//! Each fact is a pure function of a learner (and optionally one delivery)
//! that answers its documented default when the data it needs is absent.

use chrono::NaiveDate;

use ilr_model::codes::{
    EsmType, LearnDelFamType, aim_type, benefit_status, emp_stat, fund_model, learn_del_fam_code,
    prog_type,
};
use ilr_model::{Learner, LearningDelivery};

use super::{DerivedDataRegistry, FactValue};

/// Earliest start date of the programme aim this delivery belongs to.
pub const DD04: &str = "DD04";
/// Earliest learning start date of the learner.
pub const DD06: &str = "DD06";
/// Delivery is part of an apprenticeship.
pub const DD07: &str = "DD07";
/// Adult skills funded, unemployed and claiming JSA/ESA or mandated to training.
pub const DD21: &str = "DD21";
/// Adult skills funded, unemployed and claiming other state benefits.
pub const DD28: &str = "DD28";
/// Delivery is part of a traineeship.
pub const DD29: &str = "DD29";

/// `None` when the delivery has no programme type or no matching programme aim.
pub fn earliest_programme_start(
    learner: &Learner,
    delivery: &LearningDelivery,
) -> Option<NaiveDate> {
    let programme = delivery.prog_type?;
    learner
        .learning_deliveries()
        .iter()
        .filter(|candidate| {
            candidate.aim_type == aim_type::PROGRAMME_AIM
                && candidate.prog_type == Some(programme)
                && candidate.std_code == delivery.std_code
        })
        .map(|candidate| candidate.learn_start_date)
        .min()
}

/// `None` for a learner without deliveries.
pub fn earliest_learning_start(learner: &Learner) -> Option<NaiveDate> {
    learner
        .learning_deliveries()
        .iter()
        .map(|delivery| delivery.learn_start_date)
        .min()
}

/// `false` when no programme type is recorded.
pub fn is_apprenticeship(prog_type: Option<i32>) -> bool {
    prog_type.is_some_and(|value| prog_type::APPRENTICESHIPS.contains(&value))
}

/// `false` when no programme type is recorded.
pub fn is_traineeship(prog_type: Option<i32>) -> bool {
    prog_type == Some(prog_type::TRAINEESHIP)
}

/// `false` for non adult-skills deliveries and for learners with no
/// employment status applicable on the start date (unless mandated by LDM 318).
pub fn is_adult_funded_unemployed_with_benefits(
    learner: &Learner,
    delivery: &LearningDelivery,
) -> bool {
    if delivery.fund_model != fund_model::ADULT_SKILLS {
        return false;
    }
    let mandated = delivery.fams().iter().any(|fam| {
        LearnDelFamType::Ldm.matches(&fam.learn_del_fam_type)
            && fam.learn_del_fam_code.trim() == learn_del_fam_code::LDM_MANDATION_TO_SKILLS_TRAINING
    });
    if mandated {
        return true;
    }
    learner
        .employment_status_on(delivery.learn_start_date)
        .is_some_and(|status| {
            status.has_monitoring(
                EsmType::Bsi.as_str(),
                &[
                    benefit_status::JOB_SEEKERS_ALLOWANCE,
                    benefit_status::EMPLOYMENT_AND_SUPPORT_ALLOWANCE_WRAG,
                ],
            )
        })
}

/// `false` for non adult-skills deliveries and for learners with no
/// employment status applicable on the start date.
pub fn is_adult_funded_unemployed_with_other_benefits(
    learner: &Learner,
    delivery: &LearningDelivery,
) -> bool {
    if delivery.fund_model != fund_model::ADULT_SKILLS {
        return false;
    }
    learner
        .employment_status_on(delivery.learn_start_date)
        .is_some_and(|status| {
            emp_stat::NOT_EMPLOYED.contains(&status.emp_stat)
                && status.has_monitoring(
                    EsmType::Bsi.as_str(),
                    &[
                        benefit_status::OTHER_STATE_BENEFIT,
                        benefit_status::UNIVERSAL_CREDIT,
                    ],
                )
        })
}

pub(super) fn register_builtin(registry: &mut DerivedDataRegistry) {
    registry
        .register(DD04, |learner, delivery| {
            FactValue::Date(delivery.and_then(|d| earliest_programme_start(learner, d)))
        })
        .register(DD06, |learner, _| {
            FactValue::Date(earliest_learning_start(learner))
        })
        .register(DD07, |_, delivery| {
            FactValue::Bool(delivery.is_some_and(|d| is_apprenticeship(d.prog_type)))
        })
        .register(DD21, |learner, delivery| {
            FactValue::Bool(
                delivery.is_some_and(|d| is_adult_funded_unemployed_with_benefits(learner, d)),
            )
        })
        .register(DD28, |learner, delivery| {
            FactValue::Bool(delivery.is_some_and(|d| {
                is_adult_funded_unemployed_with_other_benefits(learner, d)
            }))
        })
        .register(DD29, |_, delivery| {
            FactValue::Bool(delivery.is_some_and(|d| is_traineeship(d.prog_type)))
        });
}

//! The learner root entity and its learner-level children.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::delivery::LearningDelivery;
use crate::error::{ModelError, Result};

/// One learner in a submission: the root of the record graph.
///
/// Optional collections distinguish "not returned" (`None`) from "returned
/// empty" (`Some(vec![])`). Accessors flatten both to an empty slice; rules
/// that need the distinction read the field directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Learner {
    pub learn_ref_number: String,
    #[serde(rename = "ULN")]
    pub uln: Option<i64>,
    pub date_of_birth: Option<NaiveDate>,
    pub prior_attain: Option<i32>,
    #[serde(rename = "LearnerFAMs")]
    pub learner_fams: Option<Vec<LearnerFam>>,
    pub learner_employment_statuses: Option<Vec<LearnerEmploymentStatus>>,
    pub learning_deliveries: Option<Vec<LearningDelivery>>,
}

impl Learner {
    pub fn new(learn_ref_number: impl Into<String>) -> Self {
        Self {
            learn_ref_number: learn_ref_number.into(),
            ..Self::default()
        }
    }

    pub fn learning_deliveries(&self) -> &[LearningDelivery] {
        self.learning_deliveries.as_deref().unwrap_or(&[])
    }

    pub fn learner_fams(&self) -> &[LearnerFam] {
        self.learner_fams.as_deref().unwrap_or(&[])
    }

    pub fn employment_statuses(&self) -> &[LearnerEmploymentStatus] {
        self.learner_employment_statuses.as_deref().unwrap_or(&[])
    }

    /// Find a delivery by its aim sequence number.
    pub fn delivery(&self, aim_seq_number: i64) -> Option<&LearningDelivery> {
        self.learning_deliveries()
            .iter()
            .find(|delivery| delivery.aim_seq_number == aim_seq_number)
    }

    /// The employment status that applies on `date`: the latest one whose
    /// `DateEmpStatApp` is on or before it.
    pub fn employment_status_on(&self, date: NaiveDate) -> Option<&LearnerEmploymentStatus> {
        self.employment_statuses()
            .iter()
            .filter(|status| status.date_emp_stat_app <= date)
            .max_by_key(|status| status.date_emp_stat_app)
    }

    /// Check the identity invariants: a non-empty reference number and
    /// aim sequence numbers unique within the learner.
    pub fn validate_identity(&self) -> Result<()> {
        if self.learn_ref_number.trim().is_empty() {
            return Err(ModelError::EmptyLearnRefNumber);
        }
        let mut seen = HashSet::new();
        for delivery in self.learning_deliveries() {
            if !seen.insert(delivery.aim_seq_number) {
                return Err(ModelError::DuplicateAimSeqNumber {
                    learn_ref_number: self.learn_ref_number.clone(),
                    aim_seq_number: delivery.aim_seq_number,
                });
            }
        }
        Ok(())
    }
}

/// Check identity invariants across a whole population, including
/// uniqueness of `LearnRefNumber` within the run.
pub fn validate_population_identity(learners: &[Learner]) -> Result<()> {
    let mut seen = HashSet::new();
    for learner in learners {
        learner.validate_identity()?;
        if !seen.insert(learner.learn_ref_number.as_str()) {
            return Err(ModelError::DuplicateLearnRefNumber(
                learner.learn_ref_number.clone(),
            ));
        }
    }
    Ok(())
}

/// Learner-level funding and monitoring record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerFam {
    #[serde(rename = "LearnFAMType")]
    pub learn_fam_type: String,
    #[serde(rename = "LearnFAMCode")]
    pub learn_fam_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LearnerEmploymentStatus {
    pub emp_stat: i32,
    pub date_emp_stat_app: NaiveDate,
    #[serde(rename = "EmploymentStatusMonitorings")]
    pub employment_status_monitorings: Option<Vec<EmploymentStatusMonitoring>>,
}

impl LearnerEmploymentStatus {
    pub fn monitorings(&self) -> &[EmploymentStatusMonitoring] {
        self.employment_status_monitorings.as_deref().unwrap_or(&[])
    }

    /// True when a monitoring of `esm_type` carries any of `codes`.
    pub fn has_monitoring(&self, esm_type: &str, codes: &[i32]) -> bool {
        self.monitorings().iter().any(|monitoring| {
            monitoring.esm_type.trim().eq_ignore_ascii_case(esm_type)
                && codes.contains(&monitoring.esm_code)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentStatusMonitoring {
    #[serde(rename = "ESMType")]
    pub esm_type: String,
    #[serde(rename = "ESMCode")]
    pub esm_code: i32,
}

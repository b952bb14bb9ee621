//! Learning deliveries and the records attached to them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One learning aim a learner is enrolled on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LearningDelivery {
    pub aim_seq_number: i64,
    pub learn_aim_ref: String,
    pub aim_type: i32,
    pub fund_model: i32,
    pub prog_type: Option<i32>,
    pub std_code: Option<i32>,
    pub learn_start_date: NaiveDate,
    pub learn_plan_end_date: NaiveDate,
    pub learn_act_end_date: Option<NaiveDate>,
    #[serde(rename = "LearningDeliveryFAMs")]
    pub learning_delivery_fams: Option<Vec<LearningDeliveryFam>>,
    pub app_fin_records: Option<Vec<AppFinRecord>>,
}

impl LearningDelivery {
    /// A delivery with the given identity and dates, no optional fields, and
    /// no attached records.
    pub fn new(
        aim_seq_number: i64,
        learn_aim_ref: impl Into<String>,
        learn_start_date: NaiveDate,
    ) -> Self {
        Self {
            aim_seq_number,
            learn_aim_ref: learn_aim_ref.into(),
            aim_type: 0,
            fund_model: 0,
            prog_type: None,
            std_code: None,
            learn_start_date,
            learn_plan_end_date: learn_start_date,
            learn_act_end_date: None,
            learning_delivery_fams: None,
            app_fin_records: None,
        }
    }

    pub fn fams(&self) -> &[LearningDeliveryFam] {
        self.learning_delivery_fams.as_deref().unwrap_or(&[])
    }

    pub fn app_fin_records(&self) -> &[AppFinRecord] {
        self.app_fin_records.as_deref().unwrap_or(&[])
    }
}

/// A (type, code) funding and monitoring annotation on a delivery.
///
/// The same pair may legitimately appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningDeliveryFam {
    #[serde(rename = "LearnDelFAMType")]
    pub learn_del_fam_type: String,
    #[serde(rename = "LearnDelFAMCode")]
    pub learn_del_fam_code: String,
    #[serde(rename = "LearnDelFAMDateFrom")]
    pub date_from: Option<NaiveDate>,
    #[serde(rename = "LearnDelFAMDateTo")]
    pub date_to: Option<NaiveDate>,
}

impl LearningDeliveryFam {
    pub fn new(fam_type: impl Into<String>, fam_code: impl Into<String>) -> Self {
        Self {
            learn_del_fam_type: fam_type.into(),
            learn_del_fam_code: fam_code.into(),
            date_from: None,
            date_to: None,
        }
    }
}

/// Apprenticeship financial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFinRecord {
    #[serde(rename = "AFinType")]
    pub afin_type: String,
    #[serde(rename = "AFinCode")]
    pub afin_code: i32,
    #[serde(rename = "AFinAmount")]
    pub afin_amount: i32,
    #[serde(rename = "AFinDate")]
    pub afin_date: NaiveDate,
}

impl AppFinRecord {
    pub fn new(
        afin_type: impl Into<String>,
        afin_code: i32,
        afin_amount: i32,
        afin_date: NaiveDate,
    ) -> Self {
        Self {
            afin_type: afin_type.into(),
            afin_code,
            afin_amount,
            afin_date,
        }
    }
}

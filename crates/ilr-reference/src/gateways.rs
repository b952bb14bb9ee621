//! Query contracts rules use to reach reference data.
//!
//! Every gateway answers from an immutable snapshot loaded before the run
//! starts, so all of them are safe to share across threads without locking.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use ilr_model::codes::{AppFinType, LearnDelFamType};
use ilr_model::dates::add_years;
use ilr_model::{AppFinRecord, LearningDeliveryFam};

use crate::snapshot::{ContractAllocation, LarsLearningDelivery};

/// Date arithmetic relative to the academic year being validated.
pub trait AcademicYearQuery: Send + Sync {
    /// First day of the academic year (1 August).
    fn start(&self) -> NaiveDate;

    /// Last day of the academic year (31 July).
    fn end(&self) -> NaiveDate;

    /// 31 August of the first calendar year of the academic year.
    fn august_thirty_first(&self) -> NaiveDate;

    /// 1 August on or before `date`: the start of the academic year `date` falls in.
    fn academic_year_start_for(&self, date: NaiveDate) -> NaiveDate;

    fn is_in_current_academic_year(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    fn date_is_in_previous_academic_year(&self, date: NaiveDate) -> bool {
        let previous_start = add_years(self.start(), -1);
        date >= previous_start && date < self.start()
    }
}

/// Membership and counting over a delivery's FAM records.
///
/// A `None` collection is "no records": every query answers `false`, `0`, or empty.
pub trait LearningDeliveryFamQuery: Send + Sync {
    fn has_type(&self, fams: Option<&[LearningDeliveryFam]>, fam_type: LearnDelFamType) -> bool;

    fn has_code_for_type(
        &self,
        fams: Option<&[LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
        code: &str,
    ) -> bool;

    fn has_any_codes_for_type(
        &self,
        fams: Option<&[LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
        codes: &[&str],
    ) -> bool;

    fn count_by_type(
        &self,
        fams: Option<&[LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
    ) -> usize;

    fn fams_for_type<'a>(
        &self,
        fams: Option<&'a [LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
    ) -> Vec<&'a LearningDeliveryFam>;
}

/// Membership and counting over a delivery's apprenticeship financial records.
pub trait AppFinRecordQuery: Send + Sync {
    fn has_code_for_type(
        &self,
        records: Option<&[AppFinRecord]>,
        afin_type: AppFinType,
        code: i32,
    ) -> bool;

    fn has_any_codes_for_type(
        &self,
        records: Option<&[AppFinRecord]>,
        afin_type: AppFinType,
        codes: &[i32],
    ) -> bool;

    fn count_by_type(&self, records: Option<&[AppFinRecord]>, afin_type: AppFinType) -> usize;

    fn latest_date_for_type(
        &self,
        records: Option<&[AppFinRecord]>,
        afin_type: AppFinType,
    ) -> Option<NaiveDate>;
}

/// Funding contract allocations held by the provider.
pub trait FcsData: Send + Sync {
    /// True when any allocation exists for one of the funding stream period codes.
    fn funding_relationship_exists(&self, funding_stream_period_codes: &[&str]) -> bool;

    fn contract_allocation_for(
        &self,
        contract_allocation_number: &str,
    ) -> Option<&ContractAllocation>;

    /// True when an allocation for one of the codes is open on `date`.
    fn has_contract_allocation_covering(
        &self,
        funding_stream_period_codes: &[&str],
        date: NaiveDate,
    ) -> bool;
}

/// Learning aim reference metadata.
pub trait LarsData: Send + Sync {
    fn learning_delivery_for(&self, learn_aim_ref: &str) -> Option<&LarsLearningDelivery>;

    fn notional_nvq_level(&self, learn_aim_ref: &str) -> Option<&str> {
        self.learning_delivery_for(learn_aim_ref)
            .and_then(|delivery| delivery.notional_nvq_level.as_deref())
    }

    fn is_valid_on(&self, learn_aim_ref: &str, date: NaiveDate) -> bool {
        self.learning_delivery_for(learn_aim_ref)
            .is_some_and(|delivery| delivery.is_valid_on(date))
    }

    fn is_basic_skills(&self, learn_aim_ref: &str, date: NaiveDate) -> bool {
        self.learning_delivery_for(learn_aim_ref)
            .is_some_and(|delivery| delivery.is_basic_skills() && delivery.is_valid_on(date))
    }

    fn has_any_category_for(&self, learn_aim_ref: &str, categories: &[i32]) -> bool {
        self.learning_delivery_for(learn_aim_ref).is_some_and(|delivery| {
            delivery
                .categories
                .iter()
                .any(|category| categories.contains(category))
        })
    }
}

/// Static facts about providers.
pub trait OrganisationData: Send + Sync {
    fn legal_org_type(&self, ukprn: i64) -> Option<&str>;

    fn ukprn_exists(&self, ukprn: i64) -> bool {
        self.legal_org_type(ukprn).is_some()
    }

    fn is_legal_org_type(&self, ukprn: i64, legal_org_types: &[&str]) -> bool {
        self.legal_org_type(ukprn).is_some_and(|org_type| {
            legal_org_types
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(org_type))
        })
    }
}

/// Facts about the submission file being validated.
pub trait FileData: Send + Sync {
    fn ukprn(&self) -> i64;
    fn file_preparation_date(&self) -> NaiveDate;
}

/// The full set of gateways handed to rules.
#[derive(Clone)]
pub struct LookupGateways {
    pub academic_year: Arc<dyn AcademicYearQuery>,
    pub fams: Arc<dyn LearningDeliveryFamQuery>,
    pub app_fin: Arc<dyn AppFinRecordQuery>,
    pub fcs: Arc<dyn FcsData>,
    pub lars: Arc<dyn LarsData>,
    pub organisation: Arc<dyn OrganisationData>,
    pub file_data: Arc<dyn FileData>,
}

impl fmt::Debug for LookupGateways {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupGateways")
            .field("academic_year_start", &self.academic_year.start())
            .field("ukprn", &self.file_data.ukprn())
            .finish_non_exhaustive()
    }
}

//! Stateless queries over the records attached to a delivery.

use chrono::NaiveDate;

use ilr_model::codes::{AppFinType, LearnDelFamType};
use ilr_model::{AppFinRecord, LearningDeliveryFam};

use crate::gateways::{AppFinRecordQuery, LearningDeliveryFamQuery};

/// FAM queries. Type and code comparisons ignore case and surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamQueryService;

fn of_type<'a>(
    fams: Option<&'a [LearningDeliveryFam]>,
    fam_type: LearnDelFamType,
) -> impl Iterator<Item = &'a LearningDeliveryFam> {
    fams.unwrap_or(&[])
        .iter()
        .filter(move |fam| fam_type.matches(&fam.learn_del_fam_type))
}

fn code_matches(fam: &LearningDeliveryFam, code: &str) -> bool {
    fam.learn_del_fam_code.trim().eq_ignore_ascii_case(code.trim())
}

impl LearningDeliveryFamQuery for FamQueryService {
    fn has_type(&self, fams: Option<&[LearningDeliveryFam]>, fam_type: LearnDelFamType) -> bool {
        of_type(fams, fam_type).next().is_some()
    }

    fn has_code_for_type(
        &self,
        fams: Option<&[LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
        code: &str,
    ) -> bool {
        of_type(fams, fam_type).any(|fam| code_matches(fam, code))
    }

    fn has_any_codes_for_type(
        &self,
        fams: Option<&[LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
        codes: &[&str],
    ) -> bool {
        of_type(fams, fam_type).any(|fam| codes.iter().any(|code| code_matches(fam, code)))
    }

    fn count_by_type(
        &self,
        fams: Option<&[LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
    ) -> usize {
        of_type(fams, fam_type).count()
    }

    fn fams_for_type<'a>(
        &self,
        fams: Option<&'a [LearningDeliveryFam]>,
        fam_type: LearnDelFamType,
    ) -> Vec<&'a LearningDeliveryFam> {
        of_type(fams, fam_type).collect()
    }
}

/// Apprenticeship financial record queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppFinQueryService;

fn records_of_type(
    records: Option<&[AppFinRecord]>,
    afin_type: AppFinType,
) -> impl Iterator<Item = &AppFinRecord> {
    records
        .unwrap_or(&[])
        .iter()
        .filter(move |record| afin_type.matches(&record.afin_type))
}

impl AppFinRecordQuery for AppFinQueryService {
    fn has_code_for_type(
        &self,
        records: Option<&[AppFinRecord]>,
        afin_type: AppFinType,
        code: i32,
    ) -> bool {
        records_of_type(records, afin_type).any(|record| record.afin_code == code)
    }

    fn has_any_codes_for_type(
        &self,
        records: Option<&[AppFinRecord]>,
        afin_type: AppFinType,
        codes: &[i32],
    ) -> bool {
        records_of_type(records, afin_type).any(|record| codes.contains(&record.afin_code))
    }

    fn count_by_type(&self, records: Option<&[AppFinRecord]>, afin_type: AppFinType) -> usize {
        records_of_type(records, afin_type).count()
    }

    fn latest_date_for_type(
        &self,
        records: Option<&[AppFinRecord]>,
        afin_type: AppFinType,
    ) -> Option<NaiveDate> {
        records_of_type(records, afin_type)
            .map(|record| record.afin_date)
            .max()
    }
}

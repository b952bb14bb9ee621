//! Immutable in-memory reference data for one validation run.
//!
//! A snapshot is loaded once (JSON, optionally topped up with a LARS CSV
//! extract) and then only read. It answers the FCS, LARS, organisation and
//! file-level gateways.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReferenceError;
use crate::gateways::{FcsData, FileData, LarsData, OrganisationData};

/// LARS basic skills types counted as English or maths basic skills.
pub const BASIC_SKILLS_TYPES: &[i32] = &[
    1, 2, 11, 19, 20, 21, 23, 24, 25, 29, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContractAllocation {
    pub contract_allocation_number: String,
    pub funding_stream_period_code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ContractAllocation {
    /// Open-ended on either side when the bound is absent.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| start <= date)
            && self.end_date.is_none_or(|end| date <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LarsLearningDelivery {
    pub learn_aim_ref: String,
    #[serde(rename = "NotionalNVQLevel")]
    pub notional_nvq_level: Option<String>,
    pub basic_skills_type: Option<i32>,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    #[serde(default)]
    pub categories: Vec<i32>,
}

impl LarsLearningDelivery {
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| date <= to)
    }

    pub fn is_basic_skills(&self) -> bool {
        self.basic_skills_type
            .is_some_and(|skills_type| BASIC_SKILLS_TYPES.contains(&skills_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Organisation {
    pub ukprn: i64,
    pub legal_org_type: String,
}

/// On-disk layout of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotFile {
    pub ukprn: i64,
    pub file_preparation_date: NaiveDate,
    #[serde(default)]
    pub organisations: Vec<Organisation>,
    #[serde(default)]
    pub contract_allocations: Vec<ContractAllocation>,
    #[serde(default)]
    pub lars_learning_deliveries: Vec<LarsLearningDelivery>,
}

/// Indexed, read-only reference data.
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    ukprn: i64,
    file_preparation_date: NaiveDate,
    organisations: HashMap<i64, String>,
    contract_allocations: Vec<ContractAllocation>,
    lars: HashMap<String, LarsLearningDelivery>,
}

impl From<SnapshotFile> for ReferenceSnapshot {
    fn from(file: SnapshotFile) -> Self {
        let mut snapshot = Self {
            ukprn: file.ukprn,
            file_preparation_date: file.file_preparation_date,
            organisations: file
                .organisations
                .into_iter()
                .map(|org| (org.ukprn, org.legal_org_type))
                .collect(),
            contract_allocations: file.contract_allocations,
            lars: HashMap::new(),
        };
        snapshot.extend_lars(file.lars_learning_deliveries);
        snapshot
    }
}

impl ReferenceSnapshot {
    /// An empty snapshot for a provider and file date.
    pub fn new(ukprn: i64, file_preparation_date: NaiveDate) -> Self {
        Self::from(SnapshotFile {
            ukprn,
            file_preparation_date,
            organisations: Vec::new(),
            contract_allocations: Vec::new(),
            lars_learning_deliveries: Vec::new(),
        })
    }

    pub fn with_organisation(mut self, ukprn: i64, legal_org_type: impl Into<String>) -> Self {
        self.organisations.insert(ukprn, legal_org_type.into());
        self
    }

    pub fn with_contract_allocation(mut self, allocation: ContractAllocation) -> Self {
        self.contract_allocations.push(allocation);
        self
    }

    pub fn with_lars(mut self, delivery: LarsLearningDelivery) -> Self {
        self.extend_lars([delivery]);
        self
    }

    /// Add LARS records; a later record for the same aim replaces an earlier one.
    pub fn extend_lars(&mut self, deliveries: impl IntoIterator<Item = LarsLearningDelivery>) {
        for delivery in deliveries {
            self.lars
                .insert(delivery.learn_aim_ref.trim().to_uppercase(), delivery);
        }
    }

    pub fn lars_len(&self) -> usize {
        self.lars.len()
    }

    pub fn contract_allocations(&self) -> &[ContractAllocation] {
        &self.contract_allocations
    }
}

impl FcsData for ReferenceSnapshot {
    fn funding_relationship_exists(&self, funding_stream_period_codes: &[&str]) -> bool {
        self.contract_allocations.iter().any(|allocation| {
            funding_stream_period_codes
                .iter()
                .any(|code| code.eq_ignore_ascii_case(&allocation.funding_stream_period_code))
        })
    }

    fn contract_allocation_for(
        &self,
        contract_allocation_number: &str,
    ) -> Option<&ContractAllocation> {
        self.contract_allocations.iter().find(|allocation| {
            allocation
                .contract_allocation_number
                .eq_ignore_ascii_case(contract_allocation_number)
        })
    }

    fn has_contract_allocation_covering(
        &self,
        funding_stream_period_codes: &[&str],
        date: NaiveDate,
    ) -> bool {
        self.contract_allocations.iter().any(|allocation| {
            allocation.covers(date)
                && funding_stream_period_codes
                    .iter()
                    .any(|code| code.eq_ignore_ascii_case(&allocation.funding_stream_period_code))
        })
    }
}

impl LarsData for ReferenceSnapshot {
    fn learning_delivery_for(&self, learn_aim_ref: &str) -> Option<&LarsLearningDelivery> {
        self.lars.get(&learn_aim_ref.trim().to_uppercase())
    }
}

impl OrganisationData for ReferenceSnapshot {
    fn legal_org_type(&self, ukprn: i64) -> Option<&str> {
        self.organisations.get(&ukprn).map(String::as_str)
    }
}

impl FileData for ReferenceSnapshot {
    fn ukprn(&self) -> i64 {
        self.ukprn
    }

    fn file_preparation_date(&self) -> NaiveDate {
        self.file_preparation_date
    }
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<ReferenceSnapshot, ReferenceError> {
    let bytes = fs::read(path).map_err(|source| ReferenceError::io(path, source))?;
    let file: SnapshotFile =
        serde_json::from_slice(&bytes).map_err(|source| ReferenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    let snapshot = ReferenceSnapshot::from(file);
    debug!(
        path = %path.display(),
        lars = snapshot.lars_len(),
        allocations = snapshot.contract_allocations.len(),
        "loaded reference snapshot"
    );
    Ok(snapshot)
}

#[derive(Debug, Deserialize)]
struct LarsCsvRow {
    #[serde(rename = "LearnAimRef")]
    learn_aim_ref: String,
    #[serde(rename = "NotionalNVQLevel")]
    notional_nvq_level: Option<String>,
    #[serde(rename = "BasicSkillsType")]
    basic_skills_type: Option<i32>,
    #[serde(rename = "EffectiveFrom")]
    effective_from: NaiveDate,
    #[serde(rename = "EffectiveTo")]
    effective_to: Option<NaiveDate>,
    #[serde(rename = "Categories", default)]
    categories: Option<String>,
}

impl From<LarsCsvRow> for LarsLearningDelivery {
    fn from(row: LarsCsvRow) -> Self {
        let categories = row
            .categories
            .as_deref()
            .unwrap_or("")
            .split(';')
            .filter_map(|value| value.trim().parse().ok())
            .collect();
        Self {
            learn_aim_ref: row.learn_aim_ref.trim().to_string(),
            notional_nvq_level: row
                .notional_nvq_level
                .map(|level| level.trim().to_string())
                .filter(|level| !level.is_empty()),
            basic_skills_type: row.basic_skills_type,
            effective_from: row.effective_from,
            effective_to: row.effective_to,
            categories,
        }
    }
}

/// Read a LARS extract CSV.
///
/// Expected headers: `LearnAimRef`, `NotionalNVQLevel`, `BasicSkillsType`,
/// `EffectiveFrom`, `EffectiveTo`, `Categories` (semicolon separated).
pub fn load_lars_csv(path: &Path) -> Result<Vec<LarsLearningDelivery>, ReferenceError> {
    let csv_error = |source| ReferenceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let mut deliveries = Vec::new();
    for row in reader.deserialize::<LarsCsvRow>() {
        deliveries.push(LarsLearningDelivery::from(row.map_err(csv_error)?));
    }
    debug!(path = %path.display(), rows = deliveries.len(), "loaded LARS extract");
    Ok(deliveries)
}

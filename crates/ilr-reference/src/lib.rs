//! Reference data gateways for ILR validation.
//!
//! Rules never load reference data themselves. They query the traits in
//! [`gateways`], which are answered from snapshots built before a run:
//!
//! - [`AcademicYear`] for academic-year date arithmetic
//! - [`FamQueryService`] / [`AppFinQueryService`] for record membership and counting
//! - [`ReferenceSnapshot`] for FCS, LARS, organisation and file data

#![deny(unsafe_code)]

pub mod academic_year;
pub mod error;
pub mod gateways;
pub mod query;
pub mod snapshot;

use std::sync::Arc;

pub use crate::academic_year::AcademicYear;
pub use crate::error::ReferenceError;
pub use crate::gateways::{
    AcademicYearQuery, AppFinRecordQuery, FcsData, FileData, LarsData, LearningDeliveryFamQuery,
    LookupGateways, OrganisationData,
};
pub use crate::query::{AppFinQueryService, FamQueryService};
pub use crate::snapshot::{
    ContractAllocation, LarsLearningDelivery, Organisation, ReferenceSnapshot, SnapshotFile,
    load_lars_csv, load_snapshot,
};

impl LookupGateways {
    /// Gateways backed by a single snapshot and the stateless record queries.
    pub fn from_snapshot(snapshot: ReferenceSnapshot, academic_year: AcademicYear) -> Self {
        let snapshot = Arc::new(snapshot);
        Self {
            academic_year: Arc::new(academic_year),
            fams: Arc::new(FamQueryService),
            app_fin: Arc::new(AppFinQueryService),
            fcs: snapshot.clone(),
            lars: snapshot.clone(),
            organisation: snapshot.clone(),
            file_data: snapshot,
        }
    }
}

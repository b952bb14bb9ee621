//! Individualised Learner Record (ILR) data model.
//!
//! Read-only snapshots of learner records as supplied to a validation run,
//! the shared code tables rules compare against, and the error records a
//! run produces.

#![deny(unsafe_code)]

pub mod codes;
pub mod dates;
pub mod delivery;
pub mod error;
pub mod learner;
pub mod validation;

pub use delivery::{AppFinRecord, LearningDelivery, LearningDeliveryFam};
pub use error::{ModelError, Result};
pub use learner::{
    EmploymentStatusMonitoring, Learner, LearnerEmploymentStatus, LearnerFam,
    validate_population_identity,
};
pub use validation::{
    ErrorMessageParameter, ParameterValue, RuleDiagnostic, Severity, ValidationError,
};

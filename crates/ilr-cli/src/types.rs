use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use ilr_model::{Learner, RuleDiagnostic, ValidationError};
use ilr_validate::ValidationOutcome;

/// Accepted shapes of a learner file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LearnerFile {
    Bare(Vec<Learner>),
    Message {
        #[serde(rename = "Learners")]
        learners: Vec<Learner>,
    },
}

impl LearnerFile {
    pub fn into_learners(self) -> Vec<Learner> {
        match self {
            LearnerFile::Bare(learners) | LearnerFile::Message { learners } => learners,
        }
    }
}

#[derive(Debug)]
pub struct ValidateResult {
    pub academic_year: String,
    pub learners: usize,
    pub outcome: ValidationOutcome,
    pub fingerprint: String,
    pub report: Option<PathBuf>,
    pub fail_on_warnings: bool,
}

impl ValidateResult {
    pub fn is_failure(&self) -> bool {
        self.outcome.cancelled || self.outcome.is_failure(self.fail_on_warnings)
    }
}

/// JSON report written by `validate --output`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub academic_year: String,
    pub learners: usize,
    pub errors: Vec<ValidationError>,
    pub diagnostics: Vec<RuleDiagnostic>,
    pub fingerprint: String,
}

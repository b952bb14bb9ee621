use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("learner has an empty LearnRefNumber")]
    EmptyLearnRefNumber,
    #[error("learner {learn_ref_number} repeats AimSeqNumber {aim_seq_number}")]
    DuplicateAimSeqNumber {
        learn_ref_number: String,
        aim_seq_number: i64,
    },
    #[error("LearnRefNumber {0} appears more than once in the population")]
    DuplicateLearnRefNumber(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

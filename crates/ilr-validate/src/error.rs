use std::path::PathBuf;

use thiserror::Error;

/// Failure computing a derived fact.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DerivedDataError {
    #[error("no derived fact registered under {0}")]
    UnknownFact(String),
    #[error("derived fact {fact} is a {actual}, not a {expected}")]
    TypeMismatch {
        fact: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Failure inside a rule. Reported as a diagnostic, never as a validation error.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error(transparent)]
    DerivedData(#[from] DerivedDataError),
    #[error("missing reference data: {what}")]
    MissingReference { what: String },
    #[error("{0}")]
    Other(String),
}

impl RuleError {
    pub fn missing_reference(what: impl Into<String>) -> Self {
        Self::MissingReference { what: what.into() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule {0} is registered more than once")]
    DuplicateRule(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

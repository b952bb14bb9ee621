//! Validation output records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::format_date;

/// Severity a rule declares for the errors it emits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Severity {
    /// The learner record is rejected.
    #[default]
    Error,
    /// Reported but does not block funding.
    Warning,
    /// The whole submission fails.
    Fail,
}

impl Severity {
    /// Parse severity from its single-letter or long form.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "e" | "error" => Some(Self::Error),
            "w" | "warning" => Some(Self::Warning),
            "f" | "fail" => Some(Self::Fail),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Fail => "Fail",
        }
    }

    /// True for severities that stop a learner being funded.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error | Self::Fail)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value destined for an error message parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(value) => f.write_str(value),
            ParameterValue::Integer(value) => write!(f, "{value}"),
            ParameterValue::Decimal(value) => write!(f, "{value}"),
            ParameterValue::Bool(value) => write!(f, "{value}"),
            ParameterValue::Date(value) => f.write_str(&format_date(*value)),
            ParameterValue::Null => Ok(()),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParameterValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for ParameterValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A named value attached to a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessageParameter {
    #[serde(rename = "name")]
    pub property_name: String,
    pub value: String,
}

impl ErrorMessageParameter {
    pub fn new(property_name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            property_name: property_name.into(),
            value: value.into().to_string(),
        }
    }
}

/// One business-rule finding against a learner (and optionally one aim).
///
/// Errors are never deduplicated: a rule may emit several identical ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub rule_name: String,
    pub learn_ref_number: String,
    pub aim_seq_number: Option<i64>,
    pub severity: Severity,
    pub parameters: Vec<ErrorMessageParameter>,
}

impl ValidationError {
    /// Look up a parameter value by name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|parameter| parameter.property_name == name)
            .map(|parameter| parameter.value.as_str())
    }
}

/// A rule that failed to execute for one learner.
///
/// Kept apart from [`ValidationError`]: this is an operational finding about
/// the rule, not a finding about the learner's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDiagnostic {
    pub rule_name: String,
    pub learn_ref_number: String,
    pub error: String,
}

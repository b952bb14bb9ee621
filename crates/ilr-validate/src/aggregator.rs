//! Construction and collection of validation errors.

use ilr_model::{ErrorMessageParameter, ParameterValue, Severity, ValidationError};

/// Ordered collector of validation errors.
///
/// Every call to [`handle`](Self::handle) appends one entry. Nothing is
/// deduplicated and earlier entries are never touched.
#[derive(Debug, Clone, Default)]
pub struct ErrorAggregator {
    severity: Severity,
    errors: Vec<ValidationError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector that stamps `severity` on each error it builds.
    pub fn with_severity(severity: Severity) -> Self {
        Self {
            severity,
            errors: Vec::new(),
        }
    }

    /// Build a named parameter, rendering dates as `dd/MM/yyyy` and nulls as empty.
    pub fn build_error_message_parameter(
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> ErrorMessageParameter {
        ErrorMessageParameter::new(name, value)
    }

    /// Append one error.
    pub fn handle(
        &mut self,
        rule_name: &str,
        learn_ref_number: &str,
        aim_seq_number: Option<i64>,
        parameters: Vec<ErrorMessageParameter>,
    ) {
        self.errors.push(ValidationError {
            rule_name: rule_name.to_string(),
            learn_ref_number: learn_ref_number.to_string(),
            aim_seq_number,
            severity: self.severity,
            parameters,
        });
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Move every error from `other` onto the end of this collector.
    pub fn append(&mut self, other: &mut ErrorAggregator) {
        self.errors.append(&mut other.errors);
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

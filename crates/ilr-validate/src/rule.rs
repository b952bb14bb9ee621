//! The contract every validation rule implements.

use ilr_model::{Learner, Severity};
use ilr_reference::LookupGateways;

use crate::aggregator::ErrorAggregator;
use crate::derived::DerivedDataCache;
use crate::error::RuleError;

/// Collaborators a rule may consult while validating one learner.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    gateways: &'a LookupGateways,
    derived: &'a DerivedDataCache,
}

impl<'a> RuleContext<'a> {
    pub fn new(gateways: &'a LookupGateways, derived: &'a DerivedDataCache) -> Self {
        Self { gateways, derived }
    }

    pub fn gateways(&self) -> &'a LookupGateways {
        self.gateways
    }

    pub fn derived(&self) -> &'a DerivedDataCache {
        self.derived
    }
}

/// A named business rule evaluated against a single learner.
///
/// Implementations are stateless and must not mutate the learner. Findings
/// go to `errors`; an `Err` means the rule could not run and is reported as
/// a diagnostic instead.
pub trait Rule: Send + Sync {
    fn rule_name(&self) -> &'static str;

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn validate(
        &self,
        learner: &Learner,
        ctx: &RuleContext<'_>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), RuleError>;
}

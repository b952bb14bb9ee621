//! Rule evaluation and error aggregation for ILR learner records.
//!
//! A [`RuleEngine`] runs every enabled [`Rule`] against every learner and
//! returns the findings as [`ValidationError`](ilr_model::ValidationError)s.
//! Rules that fail to execute are reported separately as diagnostics.
//!
//! Shared, expensive facts (programme start dates, benefit status and the
//! like) are computed once per run through the [`DerivedDataCache`].

#![deny(unsafe_code)]

pub mod aggregator;
pub mod derived;
pub mod engine;
pub mod error;
pub mod options;
pub mod redact;
pub mod registry;
pub mod rule;
pub mod rules;

pub use aggregator::ErrorAggregator;
pub use derived::{DerivedDataCache, DerivedDataRegistry, FactFn, FactValue};
pub use engine::{CancellationToken, RuleEngine, ValidationOutcome, run_validation};
pub use error::{ConfigError, DerivedDataError, RegistryError, RuleError};
pub use options::{ProgressFn, ValidationOptions, load_options};
pub use registry::RuleRegistry;
pub use rule::{Rule, RuleContext};
pub use rules::{default_registry, default_rules};

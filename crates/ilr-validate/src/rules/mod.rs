//! Business rule catalogue.
//!
//! One module per rule. Each module exposes its predicates as free functions
//! so they can be checked without building a learner, plus the unit struct
//! that wires them to the [`Rule`](crate::rule::Rule) trait.

pub mod afin_type_12;
pub mod date_of_birth_38;
pub mod emp_stat_08;
pub mod learn_act_end_date_01;
pub mod learn_aim_ref_30;
pub mod learn_del_fam_type_14;
pub mod learn_del_fam_type_20;
pub mod learn_start_date_12;
pub mod ukprn_06;

use std::sync::Arc;

use crate::error::RegistryError;
use crate::registry::RuleRegistry;
use crate::rule::Rule;

pub use afin_type_12::AFinType12;
pub use date_of_birth_38::DateOfBirth38;
pub use emp_stat_08::EmpStat08;
pub use learn_act_end_date_01::LearnActEndDate01;
pub use learn_aim_ref_30::LearnAimRef30;
pub use learn_del_fam_type_14::LearnDelFamType14;
pub use learn_del_fam_type_20::LearnDelFamType20;
pub use learn_start_date_12::LearnStartDate12;
pub use ukprn_06::Ukprn06;

/// Every built-in rule, in evaluation order.
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(AFinType12),
        Arc::new(DateOfBirth38),
        Arc::new(EmpStat08),
        Arc::new(LearnActEndDate01),
        Arc::new(LearnAimRef30),
        Arc::new(LearnDelFamType14),
        Arc::new(LearnDelFamType20),
        Arc::new(LearnStartDate12),
        Arc::new(Ukprn06),
    ]
}

/// A registry holding [`default_rules`].
pub fn default_registry() -> Result<RuleRegistry, RegistryError> {
    RuleRegistry::from_rules(default_rules())
}

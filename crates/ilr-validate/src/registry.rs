//! Ordered registry of validation rules.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::options::ValidationOptions;
use crate::rule::Rule;

/// Rules in registration order, indexed by name.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    by_name: HashMap<&'static str, usize>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from rules, rejecting duplicate names.
    pub fn from_rules(
        rules: impl IntoIterator<Item = Arc<dyn Rule>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    /// Append a rule. Names must be unique.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let name = rule.rule_name();
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateRule(name.to_string()));
        }
        self.by_name.insert(name, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Get rule by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.by_name.get(name).map(|&index| &self.rules[index])
    }

    /// Number of rules in the registry.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.rule_name()).collect()
    }

    /// The rules the options enable, in registration order.
    pub fn filtered(&self, options: &ValidationOptions) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|rule| options.is_enabled(rule.rule_name()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ilr_model::Learner;

    use super::*;
    use crate::aggregator::ErrorAggregator;
    use crate::error::RuleError;
    use crate::rule::RuleContext;

    struct Named(&'static str);

    impl Rule for Named {
        fn rule_name(&self) -> &'static str {
            self.0
        }

        fn validate(
            &self,
            _learner: &Learner,
            _ctx: &RuleContext<'_>,
            _errors: &mut ErrorAggregator,
        ) -> Result<(), RuleError> {
            Ok(())
        }
    }

    fn rule(name: &'static str) -> Arc<dyn Rule> {
        Arc::new(Named(name))
    }

    #[test]
    fn keeps_registration_order() {
        let registry = RuleRegistry::from_rules([rule("B"), rule("A"), rule("C")]).unwrap();
        assert_eq!(registry.names(), vec!["B", "A", "C"]);
        assert_eq!(registry.get("A").map(|r| r.rule_name()), Some("A"));
        assert!(registry.get("Z").is_none());
    }

    #[test]
    fn rejects_duplicates() {
        let err = RuleRegistry::from_rules([rule("A"), rule("A")]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRule("A".to_string()));
    }

    #[test]
    fn filters_by_options() {
        let registry = RuleRegistry::from_rules([rule("A"), rule("B"), rule("C")]).unwrap();
        let options = ValidationOptions::new().with_disabled_rule("B");
        let names: Vec<_> = registry
            .filtered(&options)
            .iter()
            .map(|r| r.rule_name())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}

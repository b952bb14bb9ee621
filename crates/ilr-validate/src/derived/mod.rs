//! Derived facts and the per-run cache that computes each one at most once.
//!
//! A fact is a named pure function of a learner and, for delivery-level
//! facts, one of its deliveries. The cache is keyed by the fact name and the
//! identity of the records it was computed from, and lives for exactly one
//! run.

mod facts;

use std::collections::HashMap;
use std::fmt;
use std::ptr;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::NaiveDate;

use ilr_model::{Learner, LearningDelivery};

use crate::error::DerivedDataError;

pub use facts::{
    DD04, DD06, DD07, DD21, DD28, DD29, earliest_learning_start, earliest_programme_start,
    is_adult_funded_unemployed_with_benefits, is_adult_funded_unemployed_with_other_benefits,
    is_apprenticeship, is_traineeship,
};

/// Value of a derived fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactValue {
    Bool(bool),
    Date(Option<NaiveDate>),
}

impl FactValue {
    fn kind(&self) -> &'static str {
        match self {
            FactValue::Bool(_) => "bool",
            FactValue::Date(_) => "date",
        }
    }
}

/// Computation behind a derived fact.
pub type FactFn = Arc<dyn Fn(&Learner, Option<&LearningDelivery>) -> FactValue + Send + Sync>;

/// Named derived-fact computations.
#[derive(Clone, Default)]
pub struct DerivedDataRegistry {
    facts: HashMap<String, FactFn>,
}

impl fmt::Debug for DerivedDataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedDataRegistry")
            .field("facts", &self.names())
            .finish()
    }
}

impl DerivedDataRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding DD04, DD06, DD07, DD21, DD28 and DD29.
    pub fn with_builtin_facts() -> Self {
        let mut registry = Self::new();
        facts::register_builtin(&mut registry);
        registry
    }

    /// Register (or replace) a fact.
    pub fn register<F>(&mut self, name: impl Into<String>, compute: F) -> &mut Self
    where
        F: Fn(&Learner, Option<&LearningDelivery>) -> FactValue + Send + Sync + 'static,
    {
        self.facts.insert(name.into(), Arc::new(compute));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Registered fact names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.facts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn get(&self, name: &str) -> Option<&FactFn> {
        self.facts.get(name)
    }
}

/// Records are identified by address as well as by natural key: two learners
/// sharing a LearnRefNumber (or two deliveries sharing an AimSeqNumber) must
/// never read each other's facts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fact: String,
    learner: usize,
    delivery: Option<usize>,
    learn_ref_number: String,
    aim_seq_number: Option<i64>,
}

impl CacheKey {
    fn new(fact: &str, learner: &Learner, delivery: Option<&LearningDelivery>) -> Self {
        Self {
            fact: fact.to_string(),
            learner: ptr::from_ref(learner).addr(),
            delivery: delivery.map(|d| ptr::from_ref(d).addr()),
            learn_ref_number: learner.learn_ref_number.clone(),
            aim_seq_number: delivery.map(|d| d.aim_seq_number),
        }
    }
}

/// Compute-once store of derived facts for a single validation run.
///
/// Concurrent first requests for the same key block on one computation;
/// every caller then sees the same value. A cache must not outlive the
/// population it serves.
pub struct DerivedDataCache {
    registry: Arc<DerivedDataRegistry>,
    cells: Mutex<HashMap<CacheKey, Arc<OnceLock<FactValue>>>>,
}

impl fmt::Debug for DerivedDataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedDataCache")
            .field("registry", &self.registry)
            .field("computed", &self.computed_len())
            .finish()
    }
}

impl DerivedDataCache {
    pub fn new(registry: Arc<DerivedDataRegistry>) -> Self {
        Self {
            registry,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Value of `fact` for the learner (and delivery, when given).
    pub fn get(
        &self,
        fact: &str,
        learner: &Learner,
        delivery: Option<&LearningDelivery>,
    ) -> Result<FactValue, DerivedDataError> {
        let compute = self
            .registry
            .get(fact)
            .ok_or_else(|| DerivedDataError::UnknownFact(fact.to_string()))?;
        let key = CacheKey::new(fact, learner, delivery);
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(key).or_default())
        };
        Ok(*cell.get_or_init(|| compute(learner, delivery)))
    }

    pub fn get_bool(
        &self,
        fact: &str,
        learner: &Learner,
        delivery: Option<&LearningDelivery>,
    ) -> Result<bool, DerivedDataError> {
        match self.get(fact, learner, delivery)? {
            FactValue::Bool(value) => Ok(value),
            other => Err(mismatch(fact, "bool", other)),
        }
    }

    pub fn get_date(
        &self,
        fact: &str,
        learner: &Learner,
        delivery: Option<&LearningDelivery>,
    ) -> Result<Option<NaiveDate>, DerivedDataError> {
        match self.get(fact, learner, delivery)? {
            FactValue::Date(value) => Ok(value),
            other => Err(mismatch(fact, "date", other)),
        }
    }

    /// Forget every computed value.
    pub fn clear(&self) {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of keys with a finished computation.
    pub fn computed_len(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }
}

fn mismatch(fact: &str, expected: &'static str, actual: FactValue) -> DerivedDataError {
    DerivedDataError::TypeMismatch {
        fact: fact.to_string(),
        expected,
        actual: actual.kind(),
    }
}

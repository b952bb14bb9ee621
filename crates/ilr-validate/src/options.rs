//! Options controlling a validation run.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Callback invoked with the number of learners finished so far.
pub type ProgressFn = Arc<dyn Fn(usize) + Send + Sync>;

/// Options for one run of the rule engine.
///
/// Loadable from TOML:
///
/// ```toml
/// threads = 4
/// disabled_rules = ["UKPRN_06"]
/// fail_on_warnings = false
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Worker threads. `None` uses the global rayon pool.
    pub threads: Option<usize>,

    /// Rules that are never evaluated.
    pub disabled_rules: BTreeSet<String>,

    /// When set, only these rules are evaluated.
    pub only_rules: Option<BTreeSet<String>>,

    /// Treat warnings as failures when deciding the exit status.
    pub fail_on_warnings: bool,

    #[serde(skip)]
    progress: Option<ProgressFn>,
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("threads", &self.threads)
            .field("disabled_rules", &self.disabled_rules)
            .field("only_rules", &self.only_rules)
            .field("fail_on_warnings", &self.fail_on_warnings)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_disabled_rule(mut self, rule_name: impl Into<String>) -> Self {
        self.disabled_rules.insert(rule_name.into());
        self
    }

    pub fn with_only_rule(mut self, rule_name: impl Into<String>) -> Self {
        self.only_rules
            .get_or_insert_with(BTreeSet::new)
            .insert(rule_name.into());
        self
    }

    pub fn with_fail_on_warnings(mut self, enable: bool) -> Self {
        self.fail_on_warnings = enable;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Whether a rule takes part in the run.
    pub fn is_enabled(&self, rule_name: &str) -> bool {
        !self.disabled_rules.contains(rule_name)
            && self
                .only_rules
                .as_ref()
                .is_none_or(|only| only.contains(rule_name))
    }

    pub(crate) fn report_progress(&self, completed: usize) {
        if let Some(progress) = &self.progress {
            progress(completed);
        }
    }
}

/// Load options from a TOML file.
pub fn load_options(path: &Path) -> Result<ValidationOptions, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

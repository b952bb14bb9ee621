//! CLI argument definitions for the ILR validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ilr-validate",
    version,
    about = "Validate ILR learner files against funding business rules",
    long_about = "Validate Individualised Learner Record (ILR) learner data against the \
                  business-rule catalogue.\n\n\
                  Reference data (LARS, FCS allocations, organisations) is read from a \
                  JSON snapshot, optionally extended with a LARS CSV extract."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include learner reference numbers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a learner file and report rule findings.
    Validate(ValidateArgs),

    /// List the registered rules.
    Rules,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Learner data as JSON (an array of learners or `{"Learners": [...]}`).
    #[arg(value_name = "LEARNERS_JSON")]
    pub learners: PathBuf,

    /// Reference data snapshot (JSON).
    #[arg(long = "reference", value_name = "SNAPSHOT_JSON")]
    pub reference: PathBuf,

    /// LARS extract merged into the snapshot.
    #[arg(long = "lars-csv", value_name = "PATH")]
    pub lars_csv: Option<PathBuf>,

    /// Academic year code such as 1920 (default: the year of the file preparation date).
    #[arg(long = "academic-year", value_name = "YEAR")]
    pub academic_year: Option<String>,

    /// Validation options (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write errors, diagnostics and the fingerprint as JSON.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Worker threads (default: one per core).
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Skip a rule by name. May be repeated.
    #[arg(long = "skip-rule", value_name = "RULE")]
    pub skip_rules: Vec<String>,

    /// Run only the named rule. May be repeated.
    #[arg(long = "rule", value_name = "RULE")]
    pub only_rules: Vec<String>,

    /// Exit with a failure status when warnings are reported.
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

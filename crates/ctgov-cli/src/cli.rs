//! CLI argument definitions for the NDJSON converter.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ctgov-ndjson",
    version,
    about = "Parse ClinicalTrials.gov XML and emit NDJSON summaries",
    long_about = "Parse ClinicalTrials.gov XML study records and emit one flat JSON object \
                  per study.\n\n\
                  Documents that fail to parse are logged and skipped; the run always \
                  completes unless the index or output cannot be opened."
)]
pub struct Cli {
    /// File that lists XML paths, one per line.
    #[arg(long = "index-file", value_name = "PATH", default_value = "data/all_xml")]
    pub index_file: PathBuf,

    /// NDJSON output path.
    #[arg(
        long = "output",
        value_name = "PATH",
        default_value = "data/trials_summary.ndjson"
    )]
    pub output: PathBuf,

    /// Optional cap on number of records to write (useful for smoke tests).
    #[arg(long = "max-records", value_name = "N")]
    pub max_records: Option<usize>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, ignore_case = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING", alias = "WARN")]
    Warning,
    #[value(name = "ERROR")]
    Error,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

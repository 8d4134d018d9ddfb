//! CLI argument definitions for the CLIF QC runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "clif-qc",
    version,
    about = "CLIF QC - data quality checks for critical-care datasets",
    long_about = "Validate CLIF datasets against their table schemas.\n\n\
                  Checks column types, missingness, controlled vocabularies,\n\
                  clinically plausible value ranges, and admission-interval overlaps."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Run QC checks over a directory of CLIF table files.
    Check(CheckArgs),

    /// List the CLIF tables with embedded schemas.
    Tables,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Directory containing clif_<table>.csv or clif_<table>.parquet files.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Check a single table instead of everything discovered.
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Fraction of rows to sample before validation (bounds latency on
    /// large datasets).
    #[arg(long = "sample-frac", value_name = "FRACTION", default_value_t = 1.0)]
    pub sample_fraction: f64,

    /// Seed for the sampling mask.
    #[arg(long = "seed", value_name = "SEED", default_value_t = 42)]
    pub seed: u64,

    /// Directory of <table>_outlier_thresholds.csv reference files.
    #[arg(long = "thresholds-dir", value_name = "DIR")]
    pub thresholds_dir: Option<PathBuf>,

    /// Write CSV/JSON artifacts to this directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also export the revised dataset (coercions and outlier-nulling
    /// applied). Requires --output-dir.
    #[arg(long = "export-revised")]
    pub export_revised: bool,

    /// Show all columns in the missingness table, not only those with
    /// missing values.
    #[arg(long = "all-missingness")]
    pub show_all_missingness: bool,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

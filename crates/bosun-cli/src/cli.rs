//! Command-line argument parsing with clap.

use std::path::PathBuf;

use bosun_pool::DEFAULT_WORKERS;
use clap::{Parser, Subcommand, ValueEnum};

/// bosun - release tooling for the deployment director.
#[derive(Parser, Debug, Clone)]
#[command(name = "bosun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, global = true, value_enum, env = "BOSUN_FORMAT", default_value_t = Format::Table)]
    pub format: Format,

    /// Maximum number of release archives processed at once.
    #[arg(
        short,
        long,
        global = true,
        env = "BOSUN_PARALLEL",
        default_value_t = DEFAULT_WORKERS,
        value_parser = parse_parallel
    )]
    pub parallel: usize,

    /// Log debug output to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Merge two compiled builds of the same release into one archive.
    MergeReleases(MergeReleasesArgs),

    /// Summarize one or more release archives.
    InspectReleases(InspectReleasesArgs),
}

/// Arguments for the merge-releases command.
#[derive(Parser, Debug, Clone)]
pub struct MergeReleasesArgs {
    /// First release archive. Its metadata and license are kept.
    pub first: PathBuf,

    /// Second release archive.
    pub second: PathBuf,

    /// Where to write the merged archive.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the inspect-releases command.
#[derive(Parser, Debug, Clone)]
pub struct InspectReleasesArgs {
    /// Release archives to inspect.
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,
}

fn parse_parallel(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

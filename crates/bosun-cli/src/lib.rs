//! # bosun-cli
//!
//! Command-line interface for bosun release tooling.
//!
//! Provides commands for:
//! - Merging two compiled builds of a release into one archive
//! - Summarizing release archives
//!
//! Archives are read concurrently through a [`bosun_pool::WorkerPool`]
//! sized by `--parallel`. A failure in any archive stops new reads, and
//! every failure collected is reported together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, InspectReleasesArgs, MergeReleasesArgs};
pub use error::CliError;
pub use output::OutputFormat;

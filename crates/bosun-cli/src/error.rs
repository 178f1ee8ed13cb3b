//! CLI error types.

use bosun_pool::{AggregateError, PoolError};
use bosun_release::ReleaseError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading, merging or writing a release failed.
    #[error(transparent)]
    Release(#[from] ReleaseError),

    /// One or more parallel tasks failed.
    #[error(transparent)]
    Tasks(#[from] AggregateError),

    /// Invalid pool configuration.
    #[error("configuration error: {0}")]
    Config(#[from] PoolError),

    /// Command execution failed.
    #[error("command error: {0}")]
    Command(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Error types for the worker pool.

use std::fmt;

use thiserror::Error;

/// Result type alias for pool construction.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors raised while configuring a pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Worker count below one.
    #[error("invalid worker count: {0}, at least one worker is required")]
    InvalidWorkerCount(usize),
}

/// Every task error received during one [`crate::WorkerPool::run`] call.
///
/// Errors are kept in arrival order. The rendered message lists each error
/// together with its cause chain.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<anyhow::Error>,
}

impl AggregateError {
    /// Builds an aggregate from at least one error.
    ///
    /// Returns `None` when `errors` is empty.
    #[must_use]
    pub fn from_errors(errors: Vec<anyhow::Error>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Number of folded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; an aggregate holds at least one error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The folded errors in arrival order.
    #[must_use]
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }

    /// Consumes the aggregate, returning the folded errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<anyhow::Error> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task(s) failed: ", self.errors.len())?;
        for (idx, err) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors.first().map(|e| {
            let source: &(dyn std::error::Error + 'static) = e.as_ref();
            source
        })
    }
}

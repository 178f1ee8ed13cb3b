//! # bosun-pool
//!
//! Bounded worker pool used by bosun to run independent, blocking jobs such
//! as release uploads in parallel.
//!
//! ## Example
//!
//! ```rust
//! use bosun_pool::{task, WorkerPool};
//!
//! let pool = WorkerPool::new(2).expect("valid worker count");
//! let mut results = pool
//!     .run(vec![task(|| Ok(1)), task(|| Ok(2)), task(|| Ok(3))])
//!     .expect("all tasks succeed");
//! results.sort_unstable();
//! assert_eq!(results, vec![1, 2, 3]);
//! ```
//!
//! ## Modules
//!
//! - [`pool`]: the worker pool and task type
//! - [`error`]: pool configuration and aggregate task errors

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod pool;

pub use error::{AggregateError, PoolError, PoolResult};
pub use pool::{task, Task, WorkerPool, DEFAULT_WORKERS};

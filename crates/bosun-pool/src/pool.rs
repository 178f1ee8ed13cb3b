//! Fixed-size worker pool.
//!
//! The calling thread acts as the dispatcher. It hands tasks one at a time
//! through a rendezvous channel to `W` long-lived workers, which run them
//! sequentially and report into result and error channels sized to the task
//! count. A run moves through these phases:
//!
//! ```text
//! Idle ─► Dispatching ─┬─► AllSucceeded ─┐
//!                      └─► Aborting ─────┴─► Draining ─► Done
//! ```
//!
//! `Aborting` starts when the dispatcher observes the first error. From then
//! on no further task is handed out, but tasks already running are allowed to
//! finish and their errors are folded into the returned [`AggregateError`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, warn};

use crate::error::{AggregateError, PoolError, PoolResult};

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 5;

/// A unit of work run at most once by the pool.
///
/// Tasks may borrow from the caller because workers run on scoped threads.
pub type Task<'a, T> = Box<dyn FnOnce() -> anyhow::Result<T> + Send + 'a>;

/// Boxes a closure into a [`Task`].
pub fn task<'a, T, F>(f: F) -> Task<'a, T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'a,
{
    Box::new(f)
}

/// Runs independent tasks on a bounded number of worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool that runs at most `workers` tasks concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidWorkerCount`] if `workers` is zero.
    pub const fn new(workers: usize) -> PoolResult<Self> {
        if workers == 0 {
            return Err(PoolError::InvalidWorkerCount(workers));
        }
        Ok(Self { workers })
    }

    /// Number of worker threads spawned per run.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every task and returns their results in completion order.
    ///
    /// Dispatch stops once an error is visible to the dispatcher. The check
    /// races with handing out the next task, so a few more tasks may still be
    /// dispatched after an error was produced. Tasks that were never
    /// dispatched are dropped without running.
    ///
    /// # Errors
    ///
    /// Returns an [`AggregateError`] holding every error reported by a task
    /// that ran, in arrival order.
    pub fn run<'a, T, I>(&self, tasks: I) -> Result<Vec<T>, AggregateError>
    where
        T: Send,
        I: IntoIterator<Item = Task<'a, T>>,
    {
        let tasks: Vec<Task<'a, T>> = tasks.into_iter().collect();
        let total = tasks.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        debug!(workers = self.workers, tasks = total, "dispatching tasks");

        let (task_tx, task_rx) = bounded::<Task<'a, T>>(0);
        let (result_tx, result_rx) = bounded::<T>(total);
        let (error_tx, error_rx) = bounded::<anyhow::Error>(total);
        let (done_tx, done_rx) = bounded::<()>(self.workers);

        let mut errors = Vec::new();

        thread::scope(|scope| {
            let mut spawned = 0;
            for id in 0..self.workers {
                let worker = Worker {
                    id,
                    tasks: task_rx.clone(),
                    results: result_tx.clone(),
                    errors: error_tx.clone(),
                    done: done_tx.clone(),
                };
                match thread::Builder::new()
                    .name(format!("bosun-worker-{id}"))
                    .spawn_scoped(scope, move || worker.run())
                {
                    Ok(_) => spawned += 1,
                    Err(e) => {
                        warn!(worker = id, error = %e, "failed to spawn worker");
                        errors.push(anyhow::Error::new(e).context("spawning worker thread"));
                        break;
                    }
                }
            }
            drop((task_rx, result_tx, error_tx, done_tx));

            if spawned > 0 && errors.is_empty() {
                dispatch(tasks, &task_tx, &error_rx, &mut errors);
            }
            drop(task_tx);

            for _ in 0..spawned {
                if done_rx.recv().is_err() {
                    break;
                }
            }
        });

        errors.extend(error_rx.try_iter());
        if let Some(aggregate) = AggregateError::from_errors(errors) {
            warn!(failed = aggregate.len(), tasks = total, "worker pool run failed");
            return Err(aggregate);
        }

        let results: Vec<T> = result_rx.try_iter().collect();
        debug!(results = results.len(), "all tasks succeeded");
        Ok(results)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Hands tasks to workers until the list is exhausted or an error arrives.
fn dispatch<'a, T>(
    tasks: Vec<Task<'a, T>>,
    queue: &Sender<Task<'a, T>>,
    error_rx: &Receiver<anyhow::Error>,
    errors: &mut Vec<anyhow::Error>,
) {
    let total = tasks.len();
    for (index, task) in tasks.into_iter().enumerate() {
        select! {
            send(queue, task) -> sent => {
                if sent.is_err() {
                    debug!(index, "all workers exited, stopping dispatch");
                    return;
                }
            }
            recv(error_rx) -> received => {
                if let Ok(err) = received {
                    errors.push(err);
                }
                debug!(undispatched = total - index, "error observed, stopping dispatch");
                return;
            }
        }
    }
}

struct Worker<'a, T> {
    id: usize,
    tasks: Receiver<Task<'a, T>>,
    results: Sender<T>,
    errors: Sender<anyhow::Error>,
    done: Sender<()>,
}

impl<T> Worker<'_, T> {
    fn run(self) {
        for task in &self.tasks {
            match execute(task) {
                Ok(value) => {
                    let _ = self.results.send(value);
                }
                Err(err) => {
                    warn!(worker = self.id, error = %format!("{err:#}"), "task failed");
                    let _ = self.errors.send(err);
                    break;
                }
            }
        }
        debug!(worker = self.id, "worker done");
        let _ = self.done.send(());
    }
}

fn execute<T>(task: Task<'_, T>) -> anyhow::Result<T> {
    panic::catch_unwind(AssertUnwindSafe(task))
        .unwrap_or_else(|payload| Err(anyhow::anyhow!("task panicked: {}", panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}

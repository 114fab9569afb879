//! Parallel Execution Coordinator
//!
//! A fixed-size worker pool, built once per run, that executes one
//! simulation phase at a time.
//!
//! # Partitioning
//!
//! A phase over `len` items is split across `min(threads, len)` workers by
//! striding: worker `t` handles `t, t + workers, t + 2 * workers, ...`. The
//! assignment is static, so no work-stealing or queueing is involved.
//!
//! # Barrier
//!
//! [`WorkerPool::run_phase`] returns only after every worker of the phase
//! has finished (the end of a rayon scope). That join is the only
//! synchronization between phases and between iterations.
//!
//! # Failures
//!
//! A panic inside a worker is caught on that worker, the first one is kept,
//! and the phase returns [`LayoutError::WorkerFailed`] once the remaining
//! workers have drained.

use std::any::Any;
use std::iter::StepBy;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::Phase;
use crate::error::{LayoutError, Result};

/// The slice of a phase assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// This worker's index.
    pub worker: usize,
    /// Number of workers in the phase.
    pub workers: usize,
    /// Number of items in the phase.
    pub len: usize,
}

impl Partition {
    /// Item indices owned by this worker.
    pub fn indices(&self) -> StepBy<Range<usize>> {
        (self.worker..self.len).step_by(self.workers)
    }
}

/// Worker pool shared by every phase of one run.
///
/// With a single thread no pool is created and phases run inline on the
/// calling thread; the partitioning (and therefore the numerics) is the same.
pub struct WorkerPool {
    threads: usize,
    pool: Option<ThreadPool>,
}

impl WorkerPool {
    /// Create a pool with `threads` workers.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(LayoutError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }

        let pool = if threads > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("frlayout-worker-{i}"))
                .build()
                .map_err(|e| LayoutError::PoolBuild(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self { threads, pool })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Execute `task` once per partition of `len` items and wait for all of
    /// them to finish.
    pub fn run_phase<F>(&self, phase: Phase, len: usize, task: F) -> Result<()>
    where
        F: Fn(Partition) + Sync,
    {
        if len == 0 {
            return Ok(());
        }

        let workers = self.threads.min(len);
        let failure: Mutex<Option<LayoutError>> = Mutex::new(None);

        let run = |worker: usize| {
            let partition = Partition {
                worker,
                workers,
                len,
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task(partition))) {
                let mut slot = failure.lock();
                if slot.is_none() {
                    *slot = Some(LayoutError::WorkerFailed {
                        phase,
                        worker,
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        };

        match &self.pool {
            Some(pool) => pool.scope(|scope| {
                let run = &run;
                for worker in 0..workers {
                    scope.spawn(move |_| run(worker));
                }
            }),
            None => (0..workers).for_each(run),
        }

        match failure.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

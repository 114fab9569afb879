//! Progress and Cancellation
//!
//! A layout run reports progress to, and polls cancellation from, a
//! [`ProgressListener`]. The listener is shared with worker threads (the
//! repulsion phase polls it between nodes), so every method takes `&self`
//! and implementations use interior mutability.
//!
//! Two implementations are provided:
//!
//! - [`ProgressSilent`]: ignores everything and never cancels. This is what
//!   runs use when the caller does not care about progress.
//! - [`ProgressCounter`]: records maximum and progress in atomics and can be
//!   cancelled from any thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{LayoutError, Result};

/// Receives progress updates and answers cancellation polls.
pub trait ProgressListener: Send + Sync {
    /// Set the number of steps that make up the whole task.
    fn set_maximum(&self, maximum: u64);

    /// Set the number of completed steps.
    fn set_progress(&self, progress: u64);

    /// Record one more completed step.
    fn increment_progress(&self);

    /// Number of completed steps.
    fn progress(&self) -> u64;

    /// Whether cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Name the task being performed.
    fn set_tasks(&self, _task: &str, _subtask: &str) {}

    /// Return [`LayoutError::Cancelled`] if cancellation has been requested.
    fn check_for_cancel(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(LayoutError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A listener that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSilent;

impl ProgressListener for ProgressSilent {
    fn set_maximum(&self, _maximum: u64) {}

    fn set_progress(&self, _progress: u64) {}

    fn increment_progress(&self) {}

    fn progress(&self) -> u64 {
        0
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A thread-safe counting listener.
///
/// Share it behind an `Arc` to cancel a run from another thread:
///
/// ```rust
/// use std::sync::Arc;
/// use frlayout_core::{ProgressCounter, ProgressListener};
///
/// let progress = Arc::new(ProgressCounter::new());
/// let handle = Arc::clone(&progress);
/// handle.cancel();
/// assert!(progress.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct ProgressCounter {
    maximum: AtomicU64,
    progress: AtomicU64,
    cancelled: AtomicBool,
    tasks: RwLock<(String, String)>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The run stops at its next poll.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn maximum(&self) -> u64 {
        self.maximum.load(Ordering::SeqCst)
    }

    /// Task and subtask names last set by the run.
    pub fn tasks(&self) -> (String, String) {
        self.tasks.read().clone()
    }
}

impl ProgressListener for ProgressCounter {
    fn set_maximum(&self, maximum: u64) {
        self.maximum.store(maximum, Ordering::SeqCst);
    }

    fn set_progress(&self, progress: u64) {
        self.progress.store(progress, Ordering::SeqCst);
    }

    fn increment_progress(&self) {
        self.progress.fetch_add(1, Ordering::SeqCst);
    }

    fn progress(&self) -> u64 {
        self.progress.load(Ordering::SeqCst)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn set_tasks(&self, task: &str, subtask: &str) {
        *self.tasks.write() = (task.to_string(), subtask.to_string());
    }
}

//! Layout Errors
//!
//! Every way a layout run can end other than with a complete position map.
//! Numeric edge cases (coincident nodes, a node sitting on the origin) are
//! absorbed by the force kernels and never show up here.

use thiserror::Error;

use crate::layout::RunState;
use crate::simulation::Phase;

/// Errors produced while configuring or running a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The progress sink requested cancellation.
    ///
    /// This is the expected way for a caller to stop a run early and is kept
    /// apart from [`LayoutError::WorkerFailed`] so "user stopped" and "bug"
    /// can be told apart.
    #[error("layout run was cancelled")]
    Cancelled,

    /// A worker task panicked while executing a simulation phase.
    #[error("worker {worker} failed during the {phase} phase: {message}")]
    WorkerFailed {
        /// Phase that was executing.
        phase: Phase,
        /// Index of the worker within the phase's partition.
        worker: usize,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),

    /// The run already reached a terminal state; build a new layout instead.
    #[error("layout run already finished ({state:?})")]
    RunFinished {
        /// Terminal state the run ended in.
        state: RunState,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse layout configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LayoutError {
    /// True for the caller-triggered cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LayoutError::Cancelled)
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

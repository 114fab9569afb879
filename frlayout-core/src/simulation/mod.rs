//! Force Simulation
//!
//! One iteration of the Fruchterman-Reingold simulation, split into five
//! phases that always run in this order:
//!
//! 1. Repulsion: every ordered node pair pushes apart by `k² / dist`.
//! 2. Attraction: every edge pulls its endpoints together by `dist² / k`.
//! 3. Gravity: every node is pulled toward the origin.
//! 4. Speed: every accumulated force is scaled by `speed / 800`.
//! 5. Displacement: every non-fixed node moves along its force, clamped by
//!    the cooling-scaled maximum step.
//!
//! Each phase is dispatched to the [`WorkerPool`] and must finish on every
//! worker before the next phase starts, because later phases read what
//! earlier ones wrote. Displacement is the only phase that writes
//! positions, so an iteration abandoned before it (cancellation, failure)
//! leaves the coordinates exactly as the previous iteration left them.

pub mod forces;
mod pool;

use std::fmt;

pub use forces::StepParams;
pub use pool::{Partition, WorkerPool};

use crate::error::Result;
use crate::progress::ProgressListener;
use crate::store::CoordinateStore;

/// The phases of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Repulsion,
    Attraction,
    Gravity,
    Speed,
    Displacement,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 5] = [
        Phase::Repulsion,
        Phase::Attraction,
        Phase::Gravity,
        Phase::Speed,
        Phase::Displacement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Repulsion => "repulsion",
            Phase::Attraction => "attraction",
            Phase::Gravity => "gravity",
            Phase::Speed => "speed",
            Phase::Displacement => "displacement",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge endpoints as dense ids.
#[derive(Debug, Clone, Copy)]
pub struct Edges<'a> {
    pub sources: &'a [usize],
    pub targets: &'a [usize],
}

impl Edges<'_> {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Run one full iteration on `store`.
///
/// Cancellation is polled inside the repulsion phase and after every phase
/// except displacement; the caller polls once more after the iteration.
pub fn step(
    pool: &WorkerPool,
    store: &CoordinateStore,
    edges: Edges<'_>,
    fixed: &[bool],
    params: &StepParams,
    progress: &dyn ProgressListener,
) -> Result<()> {
    let n = store.len();
    store.clear_forces();

    pool.run_phase(Phase::Repulsion, n, |partition| {
        forces::repulsion(store, &partition, params.k, || progress.is_cancelled());
    })?;
    progress.check_for_cancel()?;

    pool.run_phase(Phase::Attraction, edges.len(), |partition| {
        forces::attraction(store, edges.sources, edges.targets, &partition, params.k);
    })?;
    progress.check_for_cancel()?;

    pool.run_phase(Phase::Gravity, n, |partition| {
        forces::gravity(store, &partition, params.k, params.gravity);
    })?;
    progress.check_for_cancel()?;

    pool.run_phase(Phase::Speed, n, |partition| {
        forces::speed(store, &partition, params.speed);
    })?;
    progress.check_for_cancel()?;

    let limit = params.displacement_limit();
    pool.run_phase(Phase::Displacement, n, |partition| {
        forces::displacement(store, fixed, &partition, limit);
    })
}

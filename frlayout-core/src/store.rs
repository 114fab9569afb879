//! Coordinate Store
//!
//! Flat per-node arrays for positions and force accumulators, indexed by
//! dense node id and shared by every worker for the length of a run.
//!
//! # Thread Safety
//!
//! Each slot is an [`AtomicF32`]: an `f32` stored as its bit pattern in an
//! `AtomicU32`. Plain loads and stores use `Relaxed` ordering; the phase
//! barrier in the coordinator provides the happens-before edge between one
//! phase's writes and the next phase's reads. Phases whose writes are
//! disjoint by partition use load/store, the attraction phase (which writes
//! both endpoints of an edge) uses [`AtomicF32::fetch_add`] so concurrent
//! contributions to the same node are never lost.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::graph::Point;

/// An `f32` that can be shared between threads.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Atomically add `delta`, returning the previous value.
    #[inline]
    pub fn fetch_add(&self, delta: f32) -> f32 {
        let previous = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f32::from_bits(bits) + delta).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        f32::from_bits(previous)
    }
}

/// Positions and force accumulators for every node of one run.
///
/// All four arrays always have exactly `len()` entries.
#[derive(Debug)]
pub struct CoordinateStore {
    pub(crate) x: Vec<AtomicF32>,
    pub(crate) y: Vec<AtomicF32>,
    pub(crate) fx: Vec<AtomicF32>,
    pub(crate) fy: Vec<AtomicF32>,
}

impl CoordinateStore {
    /// Allocate a store seeded with the given positions and zero forces.
    pub fn new(initial: &[Point]) -> Self {
        Self {
            x: initial.iter().map(|p| AtomicF32::new(p.x)).collect(),
            y: initial.iter().map(|p| AtomicF32::new(p.y)).collect(),
            fx: zeroed(initial.len()),
            fy: zeroed(initial.len()),
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Current position of node `v`.
    pub fn position(&self, v: usize) -> Point {
        Point::new(self.x[v].load(), self.y[v].load())
    }

    /// Current force accumulated on node `v`.
    pub fn force(&self, v: usize) -> Point {
        Point::new(self.fx[v].load(), self.fy[v].load())
    }

    /// Reset every force accumulator to zero.
    pub fn clear_forces(&self) {
        for slot in self.fx.iter().chain(self.fy.iter()) {
            slot.store(0.0);
        }
    }

    /// Copy all positions out in dense-id order.
    pub fn positions(&self) -> Vec<Point> {
        (0..self.len()).map(|v| self.position(v)).collect()
    }
}

fn zeroed(len: usize) -> Vec<AtomicF32> {
    (0..len).map(|_| AtomicF32::new(0.0)).collect()
}

//! Run Controller
//!
//! Drives a Fruchterman-Reingold run over one [`TopologySnapshot`]: applies
//! the cooling schedule, dispatches each iteration to the worker pool,
//! reports progress and honors cancellation.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --apply--> Running --+--> Completed
//!                           +--> Cancelled
//!                           +--> Failed
//! ```
//!
//! The three end states are terminal. A run owns its snapshot and
//! coordinate arrays exclusively; laying the graph out again means building
//! a new [`FruchtermanReingold`].

use std::hash::Hash;
use std::time::Instant;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::graph::{NodeSet, Positions, StartPositions, Topology};
use crate::progress::{ProgressListener, ProgressSilent};
use crate::simulation::{self, Edges, StepParams, WorkerPool};
use crate::snapshot::TopologySnapshot;
use crate::store::CoordinateStore;

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Built, not yet applied.
    #[default]
    Idle,
    /// Iterating.
    Running,
    /// Finished every iteration and produced positions.
    Completed,
    /// Stopped by the progress sink.
    Cancelled,
    /// Stopped by a worker failure.
    Failed,
}

impl RunState {
    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }
}

/// Cooling-schedule speed for 0-indexed `iteration` out of `iterations`.
///
/// Starts at 100 and falls linearly toward zero; the last iteration runs at
/// `100 / iterations`.
pub fn cooling_speed(iteration: usize, iterations: usize) -> f64 {
    if iterations == 0 {
        return 0.0;
    }
    100.0 * (1.0 - iteration as f64 / iterations as f64)
}

/// A multi-threaded Fruchterman-Reingold layout of one graph.
///
/// # Example
///
/// ```rust
/// use frlayout_core::{FruchtermanReingold, Graph, ProgressSilent};
///
/// let graph = Graph::from_edges([("a", "b"), ("b", "c"), ("c", "a")]);
/// let mut layout = FruchtermanReingold::new(&graph);
/// let positions = layout.apply(200, &ProgressSilent, 2).unwrap();
/// assert_eq!(positions.len(), 3);
/// ```
#[derive(Debug)]
pub struct FruchtermanReingold<K> {
    snapshot: TopologySnapshot<K>,
    store: CoordinateStore,
    area: f32,
    gravity: f64,
    speed: f64,
    config: LayoutConfig,
    state: RunState,
}

impl<K> FruchtermanReingold<K>
where
    K: Clone + Eq + Hash,
{
    /// Snapshot `graph` with no fixed nodes, circle placement and default
    /// parameters.
    pub fn new<G>(graph: &G) -> Self
    where
        G: Topology<Node = K>,
    {
        Self::from_snapshot(
            TopologySnapshot::build(graph, None, None),
            LayoutConfig::default(),
        )
    }

    /// Start building a layout with fixed nodes, starting coordinates or a
    /// custom configuration.
    pub fn builder<G>(graph: &G) -> LayoutBuilder<'_, G>
    where
        G: Topology<Node = K>,
    {
        LayoutBuilder::new(graph)
    }

    /// Create a layout over an existing snapshot.
    ///
    /// Configuration is checked when the run is applied.
    pub fn from_snapshot(snapshot: TopologySnapshot<K>, config: LayoutConfig) -> Self {
        let store = CoordinateStore::new(snapshot.initial_positions());
        Self {
            snapshot,
            store,
            area: config.area,
            gravity: config.gravity,
            speed: 1.0,
            config,
            state: RunState::Idle,
        }
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn set_area(&mut self, area: f32) {
        self.area = area;
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f64) {
        self.gravity = gravity;
    }

    /// Current cooling-schedule speed. After a run this is the speed of the
    /// last iteration executed.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed. The cooling schedule overwrites it on every iteration.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn snapshot(&self) -> &TopologySnapshot<K> {
        &self.snapshot
    }

    /// Run with the configured iteration and thread counts and no progress
    /// reporting.
    pub fn run(&mut self) -> Result<Positions<K>> {
        let iterations = self.config.iterations;
        let threads = self.config.resolved_threads();
        self.apply(iterations, &ProgressSilent, threads)
    }

    /// Run `iterations` iterations on `threads` workers.
    ///
    /// Returns the final positions keyed by node identity on completion,
    /// [`LayoutError::Cancelled`] if `progress` requested cancellation, or
    /// [`LayoutError::WorkerFailed`] if a worker panicked. Invalid
    /// parameters are rejected before the run starts and leave it idle.
    pub fn apply(
        &mut self,
        iterations: usize,
        progress: &dyn ProgressListener,
        threads: usize,
    ) -> Result<Positions<K>> {
        if self.state.is_terminal() {
            return Err(LayoutError::RunFinished { state: self.state });
        }

        let parameters = LayoutConfig {
            area: self.area,
            gravity: self.gravity,
            iterations,
            threads: Some(threads),
        };
        parameters.validate()?;
        let pool = WorkerPool::new(threads)?;

        self.state = RunState::Running;
        tracing::debug!(
            nodes = self.snapshot.node_count(),
            edges = self.snapshot.edge_count(),
            threads,
            iterations,
            "starting layout run"
        );
        let started = Instant::now();

        progress.set_tasks("Graph layout", "Fruchterman-Reingold");
        progress.set_maximum(iterations as u64);
        progress.set_progress(0);

        match self.iterate(iterations, progress, &pool) {
            Ok(()) => {
                self.state = RunState::Completed;
                tracing::debug!(elapsed = ?started.elapsed(), "layout run completed");
                Ok(self.positions())
            }
            Err(err) => {
                self.state = if err.is_cancelled() {
                    RunState::Cancelled
                } else {
                    RunState::Failed
                };
                tracing::debug!(state = ?self.state, error = %err, "layout run stopped");
                Err(err)
            }
        }
    }

    fn iterate(
        &mut self,
        iterations: usize,
        progress: &dyn ProgressListener,
        pool: &WorkerPool,
    ) -> Result<()> {
        let n = self.snapshot.node_count();
        if n <= 1 {
            // Nothing can exert a force on a lone node.
            progress.set_progress(iterations as u64);
            return Ok(());
        }

        let edges = Edges {
            sources: self.snapshot.sources(),
            targets: self.snapshot.targets(),
        };
        let fixed = self.snapshot.fixed_mask();

        for i in 0..iterations {
            self.speed = cooling_speed(i, iterations);
            let params = StepParams::new(self.area, self.gravity, self.speed, n);
            tracing::trace!(iteration = i, speed = self.speed, "layout iteration");

            simulation::step(pool, &self.store, edges, fixed, &params, progress)?;

            progress.increment_progress();
            progress.check_for_cancel()?;
        }

        Ok(())
    }

    fn positions(&self) -> Positions<K> {
        self.snapshot
            .nodes()
            .enumerate()
            .map(|(v, node)| (node.clone(), self.store.position(v)))
            .collect()
    }
}

/// Builder for a [`FruchtermanReingold`] layout.
pub struct LayoutBuilder<'a, G>
where
    G: Topology,
{
    graph: &'a G,
    fixed: Option<&'a dyn NodeSet<G::Node>>,
    start: Option<&'a dyn StartPositions<G::Node>>,
    config: LayoutConfig,
}

impl<'a, G> LayoutBuilder<'a, G>
where
    G: Topology,
{
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            fixed: None,
            start: None,
            config: LayoutConfig::default(),
        }
    }

    /// Nodes that must not move.
    pub fn fixed(mut self, fixed: &'a dyn NodeSet<G::Node>) -> Self {
        self.fixed = Some(fixed);
        self
    }

    /// Starting coordinates. Nodes without an entry use circle placement.
    pub fn start_positions(mut self, start: &'a dyn StartPositions<G::Node>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn area(mut self, area: f32) -> Self {
        self.config.area = area;
        self
    }

    pub fn gravity(mut self, gravity: f64) -> Self {
        self.config.gravity = gravity;
        self
    }

    /// Validate the configuration and snapshot the graph.
    pub fn build(self) -> Result<FruchtermanReingold<G::Node>> {
        self.config.validate()?;
        let snapshot = TopologySnapshot::build(self.graph, self.fixed, self.start);
        Ok(FruchtermanReingold::from_snapshot(snapshot, self.config))
    }
}

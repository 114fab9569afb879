//! FR Layout Core
//!
//! This crate computes 2D node positions for a graph with a multi-threaded
//! Fruchterman-Reingold force simulation. It implements:
//!
//! - A one-time topology snapshot mapping node identities to dense ids
//! - A lock-free coordinate store shared by every worker
//! - Repulsion, attraction, gravity, speed-scaling and displacement phases
//! - A fixed worker pool with a barrier between phases
//! - A run controller with linear cooling, progress and cancellation
//!
//! The graph itself is not owned here. Anything implementing
//! [`Topology`] can be laid out; [`Graph`] is a small ready-made one.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: collaborator traits and the in-memory graph
//! - `snapshot`: dense-id topology and initial placement
//! - `store`: shared position and force arrays
//! - `simulation`: force kernels and the parallel coordinator
//! - `layout`: the run controller
//! - `progress`: progress reporting and cancellation
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use frlayout_core::{FruchtermanReingold, Graph, ProgressCounter, ProgressListener};
//!
//! let graph = Graph::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)]);
//! let fixed: HashSet<i32> = [0].into_iter().collect();
//!
//! let mut layout = FruchtermanReingold::builder(&graph)
//!     .fixed(&fixed)
//!     .build()
//!     .unwrap();
//!
//! let progress = ProgressCounter::new();
//! let positions = layout.apply(100, &progress, 4).unwrap();
//! assert_eq!(positions.len(), 4);
//! assert_eq!(progress.progress(), 100);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod progress;
pub mod simulation;
pub mod snapshot;
pub mod store;

pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use graph::{Graph, NodeSet, Point, Positions, StartPositions, Topology};
pub use layout::{cooling_speed, FruchtermanReingold, LayoutBuilder, RunState};
pub use progress::{ProgressCounter, ProgressListener, ProgressSilent};
pub use snapshot::TopologySnapshot;

/// Lay out `graph` in one call using `config`.
///
/// Equivalent to building a [`FruchtermanReingold`] with the configuration
/// and calling [`FruchtermanReingold::run`].
pub fn layout<G>(graph: &G, config: LayoutConfig) -> Result<Positions<G::Node>>
where
    G: Topology,
{
    FruchtermanReingold::builder(graph).config(config).build()?.run()
}

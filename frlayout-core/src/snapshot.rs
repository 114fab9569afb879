//! Topology Snapshot
//!
//! An immutable, index-based copy of a graph's structure taken once at the
//! start of a layout run. After the snapshot is built the engine never
//! touches the input graph again; every array is indexed by the dense
//! node id assigned here.
//!
//! # Initial Placement
//!
//! Without starting coordinates, nodes are walked one connected component at
//! a time with an explicit stack, and the k-th node popped (counting across
//! the whole graph) is placed at `(100 sin(2πk/N), 100 cos(2πk/N))`. Nodes
//! in the same component therefore end up next to each other on the circle.
//! With starting coordinates, a node is seeded at ten times its supplied
//! position.

use std::f64::consts::PI;
use std::hash::Hash;

use indexmap::IndexSet;

use crate::graph::{NodeSet, Point, StartPositions, Topology};

/// Radius of the initial placement circle.
const PLACEMENT_RADIUS: f64 = 100.0;

/// Scale applied to caller-supplied starting coordinates.
const START_SCALE: f32 = 10.0;

/// Dense-id view of one graph, owned by a single layout run.
#[derive(Debug, Clone)]
pub struct TopologySnapshot<K> {
    /// Bijection between node identity and dense id (the set position).
    nodes: IndexSet<K>,

    /// Source node id of each edge.
    sources: Vec<usize>,

    /// Target node id of each edge.
    targets: Vec<usize>,

    /// Nodes that are never displaced.
    fixed: Vec<bool>,

    /// Seed coordinates.
    initial: Vec<Point>,
}

impl<K> TopologySnapshot<K>
where
    K: Clone + Eq + Hash,
{
    /// Snapshot a topology.
    ///
    /// Edges whose endpoints were not enumerated as nodes are skipped.
    pub fn build<G>(
        graph: &G,
        fixed: Option<&dyn NodeSet<K>>,
        start: Option<&dyn StartPositions<K>>,
    ) -> Self
    where
        G: Topology<Node = K>,
    {
        let nodes: IndexSet<K> = graph.nodes().collect();

        let mut sources = Vec::new();
        let mut targets = Vec::new();
        for (source, target) in graph.edges() {
            match (nodes.get_index_of(&source), nodes.get_index_of(&target)) {
                (Some(s), Some(t)) => {
                    sources.push(s);
                    targets.push(t);
                }
                _ => {
                    tracing::warn!(
                        edge = sources.len(),
                        "skipping edge with an endpoint missing from the node list"
                    );
                }
            }
        }

        let fixed = match fixed {
            Some(set) => nodes.iter().map(|v| set.contains_node(v)).collect(),
            None => vec![false; nodes.len()],
        };

        let mut initial = circle_placement(graph, &nodes);
        if let Some(start) = start {
            for (v, node) in nodes.iter().enumerate() {
                if let Some(p) = start.start_position(node) {
                    initial[v] = Point::new(START_SCALE * p.x, START_SCALE * p.y);
                }
            }
        }

        Self {
            nodes,
            sources,
            targets,
            fixed,
            initial,
        }
    }

    /// Number of nodes (N).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges (M).
    pub fn edge_count(&self) -> usize {
        self.sources.len()
    }

    /// Identity of the node with dense id `v`.
    pub fn node(&self, v: usize) -> Option<&K> {
        self.nodes.get_index(v)
    }

    /// Dense id of a node identity.
    pub fn index_of(&self, node: &K) -> Option<usize> {
        self.nodes.get_index_of(node)
    }

    /// All node identities in dense-id order.
    pub fn nodes(&self) -> impl Iterator<Item = &K> + '_ {
        self.nodes.iter()
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn is_fixed(&self, v: usize) -> bool {
        self.fixed[v]
    }

    /// Fixed-node mask, one entry per dense id.
    pub fn fixed_mask(&self) -> &[bool] {
        &self.fixed
    }

    /// Seed coordinates in dense-id order.
    pub fn initial_positions(&self) -> &[Point] {
        &self.initial
    }
}

/// Component-by-component stack traversal placing nodes on a circle.
fn circle_placement<G, K>(graph: &G, nodes: &IndexSet<K>) -> Vec<Point>
where
    G: Topology<Node = K>,
    K: Clone + Eq + Hash,
{
    let n = nodes.len();
    let mut coordinates = vec![Point::default(); n];
    let mut seen = vec![false; n];
    let mut stack = Vec::new();
    let mut count = 0;

    for root in 0..n {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        stack.push(root);

        while let Some(w) = stack.pop() {
            coordinates[w] = circle_point(count, n);
            count += 1;

            let Some(node) = nodes.get_index(w) else {
                continue;
            };
            for neighbor in graph.neighbors(node) {
                if let Some(u) = nodes.get_index_of(&neighbor) {
                    if !seen[u] {
                        seen[u] = true;
                        stack.push(u);
                    }
                }
            }
        }
    }

    coordinates
}

fn circle_point(k: usize, n: usize) -> Point {
    let angle = 2.0 * PI * k as f64 / n as f64;
    Point::new(
        (PLACEMENT_RADIUS * angle.sin()) as f32,
        (PLACEMENT_RADIUS * angle.cos()) as f32,
    )
}

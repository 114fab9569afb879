//! Graph Collaborators
//!
//! The layout engine never owns or mutates the graph it lays out. It reads
//! the topology once, through the traits in this module, and from then on
//! works purely with dense integer ids.
//!
//! # Overview
//!
//! - [`Topology`]: enumerates nodes and edges by opaque identity and walks
//!   adjacency (used only for the initial placement).
//! - [`NodeSet`]: membership test used for the fixed-node set.
//! - [`StartPositions`]: optional starting coordinates by identity.
//!
//! [`Graph`] is a small in-memory implementation of [`Topology`] for callers
//! that do not already have a graph type of their own.

mod adjacency;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub use adjacency::Graph;

/// A 2D position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Final positions keyed by node identity, in the topology's node order.
pub type Positions<K> = IndexMap<K, Point>;

/// Read-only view of a graph's structure.
///
/// Node identities must be stable for as long as the topology is borrowed.
/// Enumeration order matters: it decides the dense ids and the initial
/// placement, so the same topology must always enumerate the same way for
/// layouts to be reproducible.
pub trait Topology {
    /// Opaque node identity.
    type Node: Clone + Eq + Hash;

    /// All nodes, in a stable order.
    fn nodes(&self) -> impl Iterator<Item = Self::Node> + '_;

    /// All edges as `(source, target)` pairs, in a stable order.
    fn edges(&self) -> impl Iterator<Item = (Self::Node, Self::Node)> + '_;

    /// The opposite endpoint of every edge adjacent to `node`, in adjacency
    /// order. Unknown nodes have no neighbors.
    fn neighbors(&self, node: &Self::Node) -> impl Iterator<Item = Self::Node> + '_;
}

/// Membership test over node identities.
pub trait NodeSet<K> {
    fn contains_node(&self, node: &K) -> bool;
}

impl<K: Eq + Hash, S: BuildHasher> NodeSet<K> for HashSet<K, S> {
    fn contains_node(&self, node: &K) -> bool {
        self.contains(node)
    }
}

impl<K: Eq + Hash, S: BuildHasher> NodeSet<K> for IndexSet<K, S> {
    fn contains_node(&self, node: &K) -> bool {
        self.contains(node)
    }
}

impl<K: Ord> NodeSet<K> for BTreeSet<K> {
    fn contains_node(&self, node: &K) -> bool {
        self.contains(node)
    }
}

/// Starting coordinates by node identity.
pub trait StartPositions<K> {
    fn start_position(&self, node: &K) -> Option<Point>;
}

impl<K: Eq + Hash, S: BuildHasher> StartPositions<K> for HashMap<K, Point, S> {
    fn start_position(&self, node: &K) -> Option<Point> {
        self.get(node).copied()
    }
}

impl<K: Eq + Hash, S: BuildHasher> StartPositions<K> for IndexMap<K, Point, S> {
    fn start_position(&self, node: &K) -> Option<Point> {
        self.get(node).copied()
    }
}

impl<K: Ord> StartPositions<K> for BTreeMap<K, Point> {
    fn start_position(&self, node: &K) -> Option<Point> {
        self.get(node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn set_collaborators_answer_membership() {
        let hash: HashSet<u32> = [1, 2].into_iter().collect();
        let btree: BTreeSet<u32> = [3].into_iter().collect();
        assert!(hash.contains_node(&1));
        assert!(!hash.contains_node(&3));
        assert!(btree.contains_node(&3));
    }

    #[test]
    fn map_collaborators_return_start_positions() {
        let mut start: HashMap<&str, Point> = HashMap::new();
        start.insert("a", Point::new(1.0, 2.0));
        assert_eq!(start.start_position(&"a"), Some(Point::new(1.0, 2.0)));
        assert_eq!(start.start_position(&"b"), None);
    }
}

//! In-memory Graph
//!
//! An insertion-ordered adjacency-list graph. Nodes are kept in an
//! `IndexMap` so enumeration order is the order nodes were first seen, and
//! each node stores the indices of its adjacent edges in the order they were
//! added.

use std::hash::Hash;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::Topology;

/// Edge indices adjacent to one node. Most nodes have few edges.
type Adjacent = SmallVec<[usize; 4]>;

/// A simple undirected-traversal graph with directed edge records.
#[derive(Debug, Clone)]
pub struct Graph<K> {
    /// Node identity to adjacent edge indices.
    nodes: IndexMap<K, Adjacent>,

    /// Edges as `(source, target)` node positions in `nodes`.
    edges: Vec<(usize, usize)>,
}

impl<K> Graph<K>
where
    K: Clone + Eq + Hash,
{
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Build a graph from an edge list, adding endpoints as they appear.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (K, K)>,
    {
        let mut graph = Self::new();
        for (source, target) in edges {
            graph.add_edge(source, target);
        }
        graph
    }

    /// Add a node. Adding an existing node is a no-op.
    ///
    /// Returns the node's position in enumeration order.
    pub fn add_node(&mut self, node: K) -> usize {
        let entry = self.nodes.entry(node);
        let index = entry.index();
        entry.or_default();
        index
    }

    /// Add an edge, adding missing endpoints first.
    ///
    /// Returns the edge's position in enumeration order.
    pub fn add_edge(&mut self, source: K, target: K) -> usize {
        let s = self.add_node(source);
        let t = self.add_node(target);
        let edge = self.edges.len();
        self.edges.push((s, t));

        if let Some((_, adjacent)) = self.nodes.get_index_mut(s) {
            adjacent.push(edge);
        }
        if s != t {
            if let Some((_, adjacent)) = self.nodes.get_index_mut(t) {
                adjacent.push(edge);
            }
        }
        edge
    }

    /// Check whether a node is present.
    pub fn contains(&self, node: &K) -> bool {
        self.nodes.contains_key(node)
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn key(&self, index: usize) -> Option<&K> {
        self.nodes.get_index(index).map(|(key, _)| key)
    }
}

impl<K> Default for Graph<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Topology for Graph<K>
where
    K: Clone + Eq + Hash,
{
    type Node = K;

    fn nodes(&self) -> impl Iterator<Item = K> + '_ {
        self.nodes.keys().cloned()
    }

    fn edges(&self) -> impl Iterator<Item = (K, K)> + '_ {
        self.edges
            .iter()
            .filter_map(move |&(s, t)| Some((self.key(s)?.clone(), self.key(t)?.clone())))
    }

    fn neighbors(&self, node: &K) -> impl Iterator<Item = K> + '_ {
        let own = self.nodes.get_full(node).map(|(index, _, adjacent)| (index, adjacent));
        own.into_iter().flat_map(move |(index, adjacent)| {
            adjacent.iter().filter_map(move |&edge| {
                let (s, t) = self.edges[edge];
                let opposite = if s == index { t } else { s };
                self.key(opposite).cloned()
            })
        })
    }
}

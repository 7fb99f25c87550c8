//! Graph data structures for HNSW.
//!
//! Provides the underlying graph storage for HNSW layers.

use std::collections::HashMap;
use vexa_vector::Label;

/// Internal node ID (dense, for array indexing).
pub type NodeId = u32;

/// A node in the HNSW graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Caller-assigned label
    pub label: Label,
    /// The vector data
    pub vector: Vec<f32>,
    /// The highest layer this node lives on
    pub level: usize,
}

/// Neighbor list for a node at a specific layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub ids: Vec<NodeId>,
}

impl Neighbors {
    /// Create empty neighbors.
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Add a neighbor.
    /// Returns true if added, false if already present.
    pub fn add(&mut self, id: NodeId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Number of neighbors.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate over neighbor IDs.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.ids.iter()
    }
}

impl FromIterator<NodeId> for Neighbors {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut neighbors = Neighbors::new();
        for id in iter {
            neighbors.add(id);
        }
        neighbors
    }
}

/// Graph storage for a single HNSW layer.
///
/// Adjacency is directed: pruning an overfull list drops only the outgoing
/// edge, so `a -> b` does not imply `b -> a`.
#[derive(Debug)]
pub struct LayerGraph {
    /// Adjacency lists: node_id -> neighbors
    adjacency: HashMap<NodeId, Neighbors>,
    /// Maximum out-degree for this layer
    max_degree: usize,
}

impl LayerGraph {
    /// Create an empty layer with the given out-degree limit.
    pub fn new(max_degree: usize) -> Self {
        Self {
            adjacency: HashMap::new(),
            max_degree,
        }
    }

    /// Get neighbors for a node.
    pub fn neighbors(&self, node_id: NodeId) -> Option<&Neighbors> {
        self.adjacency.get(&node_id)
    }

    /// Set neighbors for a node (replaces existing).
    pub fn set_neighbors(&mut self, node_id: NodeId, neighbors: Neighbors) {
        self.adjacency.insert(node_id, neighbors);
    }

    /// Add a bidirectional edge between two nodes.
    ///
    /// Degree limits are enforced by the caller after linking.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if from == to {
            return;
        }
        self.adjacency.entry(from).or_default().add(to);
        self.adjacency.entry(to).or_default().add(from);
    }

    /// Number of nodes in this layer.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Maximum out-degree for this layer.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }
}

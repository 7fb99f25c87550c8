//! HNSW index implementation.
//!
//! Implements the Hierarchical Navigable Small World algorithm for
//! approximate nearest neighbor search, with a fixed label capacity, seeded
//! level assignment and in-place overwrite of existing labels.

use crate::graph::{Neighbors, Node, NodeId};
use crate::layer::{Layers, LevelGenerator};
use crate::{HnswError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use vexa_vector::{validate_vector, AnnEngine, Label, Neighbor, Space, VectorError};

/// HNSW configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Max connections per node (M parameter).
    /// Default: 16
    pub m: usize,

    /// Max connections in layer 0 (M_max0 = 2*M typically).
    /// Default: 32
    pub m_max0: usize,

    /// Beam width during construction (ef_construction).
    /// Higher = better quality, slower build.
    /// Default: 200
    pub ef_construction: usize,

    /// Beam width during search (ef_search).
    /// Higher = better recall, slower search. Searches always use at least k.
    /// Default: 10
    pub ef_search: usize,

    /// Maximum number of layers.
    /// Default: 16 (supports ~10^7 vectors)
    pub max_layers: usize,

    /// Seed for level assignment.
    /// Default: 100
    pub seed: u64,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            m_max0: 32,
            ef_construction: 200,
            ef_search: 10,
            max_layers: 16,
            seed: 100,
        }
    }
}

impl HnswConfig {
    /// Default configuration for a given M, with `m_max0 = 2*M`.
    pub fn from_m(m: usize) -> Self {
        Self {
            m,
            m_max0: m.saturating_mul(2),
            ..Default::default()
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(HnswError::Config(format!("m must be >= 2, got {}", self.m)));
        }
        if self.m_max0 < self.m {
            return Err(HnswError::Config(format!(
                "m_max0 ({}) must be >= m ({})",
                self.m_max0, self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(HnswError::Config("ef_construction must be >= 1".into()));
        }
        if self.ef_search == 0 {
            return Err(HnswError::Config("ef_search must be >= 1".into()));
        }
        if self.max_layers == 0 {
            return Err(HnswError::Config("max_layers must be >= 1".into()));
        }
        Ok(())
    }
}

/// Candidate during search (node_id, distance).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    node_id: NodeId,
    distance: f32,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

/// HNSW index.
///
/// Writers need `&mut self`; searches only read, so a shared `&HnswIndex`
/// can be searched from many threads at once.
pub struct HnswIndex {
    config: HnswConfig,

    dimensions: usize,

    /// Maximum number of distinct labels
    capacity: usize,

    space: Space,

    /// Multi-layer graph structure
    layers: Layers,

    /// Node storage: internal_id -> Node
    nodes: Vec<Node>,

    /// Label -> internal ID mapping
    labels: HashMap<Label, NodeId>,

    /// Layer-0 spanning tree: each node's tree edges, kept in both
    /// directions and never pruned, so every node stays reachable.
    tree: Vec<Vec<NodeId>>,

    /// Entry point (highest layer node)
    entry_point: Option<NodeId>,

    /// Current max layer in use
    max_layer: usize,

    levels: LevelGenerator,
}

impl HnswIndex {
    /// Create a new HNSW index.
    ///
    /// Node storage for `capacity` labels is reserved up front; a failed
    /// reservation is reported as [`HnswError::Allocation`].
    ///
    /// # Arguments
    ///
    /// * `dimensions` - Vector dimensions
    /// * `capacity` - Maximum number of distinct labels
    /// * `space` - Distance space to compute in
    /// * `config` - HNSW configuration parameters
    pub fn new(
        dimensions: usize,
        capacity: usize,
        space: Space,
        config: HnswConfig,
    ) -> Result<Self> {
        config.validate()?;

        if dimensions == 0 {
            return Err(HnswError::Config("dimensions must be >= 1".into()));
        }
        if capacity == 0 {
            return Err(HnswError::Config("capacity must be >= 1".into()));
        }
        if capacity > NodeId::MAX as usize {
            return Err(HnswError::Config(format!(
                "capacity must be <= {}, got {}",
                NodeId::MAX,
                capacity
            )));
        }

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(|e| HnswError::Allocation(format!("{} nodes: {}", capacity, e)))?;

        let mut tree = Vec::new();
        tree.try_reserve_exact(capacity)
            .map_err(|e| HnswError::Allocation(format!("{} tree slots: {}", capacity, e)))?;

        let mut labels = HashMap::new();
        labels
            .try_reserve(capacity)
            .map_err(|e| HnswError::Allocation(format!("{} labels: {}", capacity, e)))?;

        let layers = Layers::new(config.max_layers, config.m, config.m_max0);
        let levels = LevelGenerator::new(config.m, config.max_layers, config.seed);

        Ok(Self {
            config,
            dimensions,
            capacity,
            space,
            layers,
            nodes,
            labels,
            tree,
            entry_point: None,
            max_layer: 0,
            levels,
        })
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Current top layer of the graph.
    pub fn max_layer(&self) -> usize {
        self.max_layer
    }

    /// Number of nodes on each layer in use, bottom layer first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        (0..self.layers.num_layers().min(self.max_layer + 1))
            .filter_map(|layer| self.layers.get(layer).map(|g| g.len()))
            .collect()
    }

    /// Compute distance between a query and a node.
    fn distance_to_node(&self, query: &[f32], node_id: NodeId) -> f32 {
        match self.nodes.get(node_id as usize) {
            Some(node) => self.space.distance(query, &node.vector),
            None => f32::MAX,
        }
    }

    /// Distance between two stored nodes.
    fn node_distance(&self, a: NodeId, b: NodeId) -> f32 {
        match self.nodes.get(a as usize) {
            Some(node) => self.distance_to_node(&node.vector, b),
            None => f32::MAX,
        }
    }

    /// Search a single layer for nearest neighbors.
    ///
    /// Returns candidates sorted by distance (closest first).
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[NodeId],
        ef: usize,
        layer: usize,
    ) -> Vec<Candidate> {
        // Min-heap for candidates (closest first)
        let mut candidates: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        // Max-heap for results (furthest first, for pruning)
        let mut results: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();

        for &ep in entry_points {
            if !visited.insert(ep) {
                continue;
            }
            let candidate = Candidate {
                node_id: ep,
                distance: self.distance_to_node(query, ep),
            };
            candidates.push(Reverse(candidate));
            results.push(candidate);
        }

        let graph = match self.layers.get(layer) {
            Some(graph) => graph,
            None => return results.into_sorted_vec(),
        };

        while let Some(Reverse(current)) = candidates.pop() {
            // Stop once the closest unexplored candidate is worse than the
            // worst result of a full beam
            if results.len() >= ef {
                if let Some(worst) = results.peek() {
                    if current.distance > worst.distance {
                        break;
                    }
                }
            }

            let neighbors = match graph.neighbors(current.node_id) {
                Some(neighbors) => neighbors,
                None => continue,
            };

            for &neighbor_id in neighbors.iter() {
                if !visited.insert(neighbor_id) {
                    continue;
                }

                let distance = self.distance_to_node(query, neighbor_id);

                let should_add = results.len() < ef
                    || results.peek().map(|w| distance < w.distance).unwrap_or(true);

                if should_add {
                    let candidate = Candidate {
                        node_id: neighbor_id,
                        distance,
                    };
                    candidates.push(Reverse(candidate));
                    results.push(candidate);

                    while results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        results.into_sorted_vec()
    }

    /// Greedy descent from the entry point down to `target_layer + 1`.
    fn descend(&self, query: &[f32], entry_point: NodeId, target_layer: usize) -> Vec<NodeId> {
        let mut ep = vec![entry_point];
        for layer in (target_layer + 1..=self.max_layer).rev() {
            let candidates = self.search_layer(query, &ep, 1, layer);
            if let Some(best) = candidates.first() {
                ep = vec![best.node_id];
            }
        }
        ep
    }

    /// Select up to `m` neighbors from candidates sorted closest first.
    ///
    /// A candidate is kept only if it is closer to the base than to every
    /// neighbor already kept, which preserves edges pointing in different
    /// directions instead of clustering them.
    fn select_neighbors(&self, candidates: &[Candidate], m: usize) -> Vec<NodeId> {
        if candidates.len() <= m {
            return candidates.iter().map(|c| c.node_id).collect();
        }

        let mut selected: Vec<NodeId> = Vec::with_capacity(m);
        for candidate in candidates {
            if selected.len() >= m {
                break;
            }
            let diverse = selected
                .iter()
                .all(|&kept| self.node_distance(kept, candidate.node_id) >= candidate.distance);
            if diverse {
                selected.push(candidate.node_id);
            }
        }
        selected
    }

    /// Tree edges of a node; empty above layer 0.
    fn tree_links(&self, node_id: NodeId, layer: usize) -> &[NodeId] {
        match self.tree.get(node_id as usize) {
            Some(links) if layer == 0 => links.as_slice(),
            _ => &[],
        }
    }

    /// Re-select a node's neighbor list from a pool of node IDs.
    ///
    /// Tree edges always survive; the heuristic fills the remaining slots.
    fn prune(
        &self,
        base: NodeId,
        pool: impl IntoIterator<Item = NodeId>,
        max_degree: usize,
        layer: usize,
    ) -> Neighbors {
        let kept = self.tree_links(base, layer);
        let mut scored: Vec<Candidate> = pool
            .into_iter()
            .filter(|&id| id != base && !kept.contains(&id))
            .map(|id| Candidate {
                node_id: id,
                distance: self.node_distance(base, id),
            })
            .collect();
        scored.sort();
        scored.dedup_by_key(|c| c.node_id);

        let room = max_degree.saturating_sub(kept.len());
        kept.iter()
            .copied()
            .chain(self.select_neighbors(&scored, room))
            .collect()
    }

    /// Connect a node to its neighbors at a specific layer.
    fn connect_node(&mut self, node_id: NodeId, neighbors: &[NodeId], layer: usize) {
        let list: Neighbors = neighbors
            .iter()
            .chain(self.tree_links(node_id, layer))
            .copied()
            .collect();

        let graph = match self.layers.get_mut(layer) {
            Some(graph) => graph,
            None => return,
        };
        let max_degree = graph.max_degree();

        graph.set_neighbors(node_id, list);
        for &neighbor_id in neighbors {
            graph.add_edge(node_id, neighbor_id);
        }

        // Shrink neighbors that went over max_degree
        for &neighbor_id in neighbors {
            let overfull = self
                .layers
                .get(layer)
                .and_then(|g| g.neighbors(neighbor_id))
                .filter(|nn| nn.len() > max_degree)
                .map(|nn| nn.ids.clone());

            if let Some(pool) = overfull {
                let pruned = self.prune(neighbor_id, pool, max_degree, layer);
                if let Some(graph) = self.layers.get_mut(layer) {
                    graph.set_neighbors(neighbor_id, pruned);
                }
            }
        }
    }

    /// Hang a new node off the spanning tree, under the least loaded of its
    /// layer-0 neighbors.
    fn attach(&mut self, node_id: NodeId, neighbors: &[NodeId]) {
        let parent = neighbors
            .iter()
            .copied()
            .min_by_key(|&id| self.tree.get(id as usize).map_or(usize::MAX, Vec::len));

        if let Some(parent) = parent {
            if let Some(links) = self.tree.get_mut(parent as usize) {
                links.push(node_id);
            }
            if let Some(links) = self.tree.get_mut(node_id as usize) {
                links.push(parent);
            }
        }
    }

    /// Link a node into every layer from `level` down to 0.
    ///
    /// `attach` is set for new nodes; an overwritten node keeps its tree edges.
    fn link(
        &mut self,
        node_id: NodeId,
        vector: &[f32],
        level: usize,
        entry_point: NodeId,
        attach: bool,
    ) {
        let top = level.min(self.max_layer);
        let mut ep = self.descend(vector, entry_point, top);

        for layer in (0..=top).rev() {
            let mut candidates =
                self.search_layer(vector, &ep, self.config.ef_construction, layer);
            candidates.retain(|c| c.node_id != node_id);

            let m = if layer == 0 {
                self.config.m_max0
            } else {
                self.config.m
            };
            let neighbors = self.select_neighbors(&candidates, m);
            if attach && layer == 0 {
                self.attach(node_id, &neighbors);
            }
            self.connect_node(node_id, &neighbors, layer);

            if let Some(best) = candidates.first() {
                ep = vec![best.node_id];
            }
        }
    }

    /// Re-select the neighbor lists of a moved node's old neighbors so the
    /// graph stays connected around the position it left.
    fn repair_neighborhood(&mut self, node_id: NodeId, layer: usize) {
        let (old, pool, max_degree) = {
            let graph = match self.layers.get(layer) {
                Some(graph) => graph,
                None => return,
            };
            let old: Vec<NodeId> = graph
                .neighbors(node_id)
                .map(|n| n.ids.clone())
                .unwrap_or_default();

            let mut pool = old.clone();
            pool.push(node_id);
            for &n in &old {
                if let Some(nn) = graph.neighbors(n) {
                    pool.extend(nn.iter().copied());
                }
            }
            pool.sort_unstable();
            pool.dedup();
            (old, pool, graph.max_degree())
        };

        for n in old {
            let pruned = self.prune(n, pool.iter().copied(), max_degree, layer);
            if let Some(graph) = self.layers.get_mut(layer) {
                graph.set_neighbors(n, pruned);
            }
        }
    }

    fn insert_new(&mut self, vector: &[f32], label: Label) -> vexa_vector::Result<()> {
        if self.labels.len() >= self.capacity {
            return Err(VectorError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let node_id = self.nodes.len() as NodeId;
        let level = self.levels.next_level();
        self.nodes.push(Node {
            label,
            vector: vector.to_vec(),
            level,
        });
        self.labels.insert(label, node_id);
        self.tree.push(Vec::new());

        for layer in 0..=level {
            if let Some(graph) = self.layers.get_mut(layer) {
                graph.set_neighbors(node_id, Neighbors::new());
            }
        }

        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => {
                self.entry_point = Some(node_id);
                self.max_layer = level;
                return Ok(());
            }
        };

        self.link(node_id, vector, level, entry_point, true);

        if level > self.max_layer {
            self.entry_point = Some(node_id);
            self.max_layer = level;
        }

        Ok(())
    }

    fn overwrite(&mut self, node_id: NodeId, vector: &[f32]) -> vexa_vector::Result<()> {
        let level = match self.nodes.get_mut(node_id as usize) {
            Some(node) => {
                node.vector.copy_from_slice(vector);
                node.level
            }
            None => {
                return Err(VectorError::IndexError(format!(
                    "label maps to missing node {}",
                    node_id
                )))
            }
        };

        if self.labels.len() == 1 {
            return Ok(());
        }
        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => return Ok(()),
        };

        for layer in 0..=level.min(self.max_layer) {
            self.repair_neighborhood(node_id, layer);
        }
        self.link(node_id, vector, level, entry_point, false);

        Ok(())
    }
}

impl AnnEngine for HnswIndex {
    fn insert(&mut self, vector: &[f32], label: Label) -> vexa_vector::Result<()> {
        validate_vector(vector, self.dimensions)?;

        match self.labels.get(&label).copied() {
            Some(node_id) => {
                tracing::trace!(label, node_id, "Overwriting existing label");
                self.overwrite(node_id, vector)
            }
            None => self.insert_new(vector, label),
        }
    }

    fn search(&self, query: &[f32], k: usize) -> vexa_vector::Result<BinaryHeap<Neighbor>> {
        validate_vector(query, self.dimensions)?;

        if k == 0 {
            return Err(VectorError::InvalidArgument("k must be >= 1".into()));
        }

        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => return Ok(BinaryHeap::new()), // Empty index
        };

        let ep = self.descend(query, entry_point, 0);
        let ef = self.config.ef_search.max(k);
        let candidates = self.search_layer(query, &ep, ef, 0);

        let mut heap: BinaryHeap<Neighbor> = candidates
            .into_iter()
            .filter_map(|c| {
                self.nodes
                    .get(c.node_id as usize)
                    .map(|node| Neighbor::new(node.label, c.distance))
            })
            .collect();

        while heap.len() > k {
            heap.pop();
        }

        Ok(heap)
    }

    fn set_search_width(&mut self, ef: usize) {
        self.config.ef_search = ef;
    }

    fn search_width(&self) -> usize {
        self.config.ef_search
    }

    fn get(&self, label: Label) -> Option<Vec<f32>> {
        let node_id = *self.labels.get(&label)?;
        self.nodes.get(node_id as usize).map(|n| n.vector.clone())
    }

    fn contains(&self, label: Label) -> bool {
        self.labels.contains_key(&label)
    }

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn space(&self) -> Space {
        self.space
    }
}

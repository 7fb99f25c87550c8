//! Core traits for nearest-neighbor engines.
//!
//! The `AnnEngine` trait is the capability surface an index handle drives.
//! Graph engines (HNSW) and the exact brute-force engine both implement it.

use crate::space::Space;
use crate::Result;
use std::collections::BinaryHeap;

/// Caller-assigned identifier for a stored vector.
pub type Label = u64;

/// A (distance, label) pair produced by a search.
///
/// Ordered by distance, then label, so a `BinaryHeap<Neighbor>` keeps the
/// worst candidate on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Distance to the query (lower = more similar).
    pub distance: f32,
    /// Label of the stored vector.
    pub label: Label,
}

impl Neighbor {
    pub fn new(label: Label, distance: f32) -> Self {
        Self { distance, label }
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // total_cmp keeps the order total even with NaN
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.label.cmp(&other.label))
    }
}

/// Common interface for nearest-neighbor engines.
///
/// # Concurrency
///
/// Mutating calls take `&mut self`, so the borrow checker serializes writers.
/// `search` takes `&self` and must not mutate engine state, which makes
/// parallel searches on a shared reference safe for any `Sync` engine.
pub trait AnnEngine: Send + Sync {
    /// Insert a vector under `label`.
    ///
    /// Re-inserting an existing label overwrites its vector and does not
    /// consume capacity.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` / `InvalidVector` for malformed input
    /// - `CapacityExceeded` when a new label arrives at a full index
    fn insert(&mut self, vector: &[f32], label: Label) -> Result<()>;

    /// Search for the `k` nearest neighbors of `query`.
    ///
    /// Returns a max-heap of at most `k` entries with the farthest match on
    /// top. An empty engine yields an empty heap.
    fn search(&self, query: &[f32], k: usize) -> Result<BinaryHeap<Neighbor>>;

    /// Set the beam width used by subsequent searches.
    fn set_search_width(&mut self, ef: usize);

    /// Current search beam width.
    fn search_width(&self) -> usize;

    /// Get the stored vector for a label.
    fn get(&self, label: Label) -> Option<Vec<f32>>;

    /// Check if a label is stored.
    fn contains(&self, label: Label) -> bool;

    /// Number of distinct labels stored.
    fn len(&self) -> usize;

    /// Check if the engine is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of distinct labels.
    fn capacity(&self) -> usize;

    /// Vector dimension.
    fn dimensions(&self) -> usize;

    /// Distance space this engine computes in.
    fn space(&self) -> Space;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_ordering() {
        let a = Neighbor::new(1, 1.0);
        let b = Neighbor::new(2, 2.0);
        let c = Neighbor::new(3, 0.5);

        let mut neighbors = vec![a, b, c];
        neighbors.sort();

        assert_eq!(neighbors[0].label, 3);
        assert_eq!(neighbors[1].label, 1);
        assert_eq!(neighbors[2].label, 2);
    }

    #[test]
    fn test_heap_keeps_worst_on_top() {
        let mut heap = BinaryHeap::new();
        heap.push(Neighbor::new(1, 0.1));
        heap.push(Neighbor::new(2, 0.9));
        heap.push(Neighbor::new(3, 0.4));

        assert_eq!(heap.pop().unwrap().label, 2);
        assert_eq!(heap.pop().unwrap().label, 3);
        assert_eq!(heap.pop().unwrap().label, 1);
    }

    #[test]
    fn test_ties_break_on_label() {
        let mut heap = BinaryHeap::new();
        heap.push(Neighbor::new(7, 0.5));
        heap.push(Neighbor::new(3, 0.5));

        assert_eq!(heap.pop().unwrap().label, 7);
    }
}

//! Brute force engine.
//!
//! Linear scan search - O(n) but exact. Used as the recall baseline for the
//! graph engine and for indices small enough that a scan is cheap.

use crate::space::Space;
use crate::traits::{AnnEngine, Label, Neighbor};
use crate::{validate_vector, Result, VectorError};
use std::collections::{BinaryHeap, HashMap};

/// Exact nearest-neighbor engine.
///
/// Stores vectors in a `HashMap` and scans all of them on every search,
/// keeping the best `k` in a bounded max-heap.
///
/// # Performance
///
/// - Insert: O(1)
/// - Search: O(n * d) where n = vectors, d = dimensions
pub struct BruteForceIndex {
    /// Vector storage: label -> vector
    vectors: HashMap<Label, Vec<f32>>,
    /// Vector dimensions
    dimensions: usize,
    /// Maximum number of distinct labels
    capacity: usize,
    /// Distance space
    space: Space,
    /// Kept for interface parity; a scan has no beam
    ef: usize,
}

impl BruteForceIndex {
    /// Create a new brute force engine.
    ///
    /// # Example
    ///
    /// ```
    /// use vexa_vector::{AnnEngine, BruteForceIndex, Space};
    ///
    /// let index = BruteForceIndex::new(128, 1000, Space::L2);
    /// assert_eq!(index.capacity(), 1000);
    /// ```
    pub fn new(dimensions: usize, capacity: usize, space: Space) -> Self {
        Self {
            vectors: HashMap::new(),
            dimensions,
            capacity,
            space,
            ef: 10,
        }
    }
}

impl AnnEngine for BruteForceIndex {
    fn insert(&mut self, vector: &[f32], label: Label) -> Result<()> {
        validate_vector(vector, self.dimensions)?;

        if let Some(existing) = self.vectors.get_mut(&label) {
            existing.copy_from_slice(vector);
            return Ok(());
        }

        if self.vectors.len() >= self.capacity {
            return Err(VectorError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.vectors.insert(label, vector.to_vec());
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<BinaryHeap<Neighbor>> {
        validate_vector(query, self.dimensions)?;

        if k == 0 {
            return Err(VectorError::InvalidArgument("k must be >= 1".into()));
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (&label, vector) in &self.vectors {
            heap.push(Neighbor::new(label, self.space.distance(query, vector)));
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap)
    }

    fn set_search_width(&mut self, ef: usize) {
        self.ef = ef;
    }

    fn search_width(&self) -> usize {
        self.ef
    }

    fn get(&self, label: Label) -> Option<Vec<f32>> {
        self.vectors.get(&label).cloned()
    }

    fn contains(&self, label: Label) -> bool {
        self.vectors.contains_key(&label)
    }

    fn len(&self) -> usize {
        self.vectors.len()
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

//! Search result ordering.
//!
//! Engines return a max-heap with the farthest match on top. The collector
//! drains it back to front so position 0 ends up holding the nearest match.

use crate::{IndexError, Result};
use std::collections::BinaryHeap;
use vexa_vector::{Label, Neighbor};

/// Labels and distances of a search, ascending by distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    labels: Vec<Label>,
    distances: Vec<f32>,
}

impl SearchResult {
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Number of matches (`min(k, stored)`).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Nearest match, if any.
    pub fn nearest(&self) -> Option<(Label, f32)> {
        Some((*self.labels.first()?, *self.distances.first()?))
    }

    /// Iterate `(label, distance)` pairs, nearest first.
    pub fn iter(&self) -> impl Iterator<Item = (Label, f32)> + '_ {
        self.labels.iter().copied().zip(self.distances.iter().copied())
    }

    pub fn into_parts(self) -> (Vec<Label>, Vec<f32>) {
        (self.labels, self.distances)
    }
}

/// Turns an engine heap into ascending output arrays.
pub struct ResultCollector;

impl ResultCollector {
    /// Drain `heap` into a new [`SearchResult`].
    pub fn collect(heap: BinaryHeap<Neighbor>) -> SearchResult {
        let n = heap.len();
        let mut labels = vec![0; n];
        let mut distances = vec![0.0; n];
        Self::drain(heap, &mut labels, &mut distances);
        SearchResult { labels, distances }
    }

    /// Drain `heap` into caller-provided buffers.
    ///
    /// Returns the number of entries written; only that prefix of each
    /// buffer is meaningful.
    pub fn collect_into(
        heap: BinaryHeap<Neighbor>,
        labels: &mut [Label],
        distances: &mut [f32],
    ) -> Result<usize> {
        let n = heap.len();
        if labels.len() < n || distances.len() < n {
            return Err(IndexError::InvalidArgument(format!(
                "output buffers hold {} labels and {} distances, need {}",
                labels.len(),
                distances.len(),
                n
            )));
        }
        Self::drain(heap, labels, distances);
        Ok(n)
    }

    /// Pop the heap fully, writing from the last slot to the first.
    fn drain(mut heap: BinaryHeap<Neighbor>, labels: &mut [Label], distances: &mut [f32]) {
        for i in (0..heap.len()).rev() {
            if let Some(neighbor) = heap.pop() {
                labels[i] = neighbor.label;
                distances[i] = neighbor.distance;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(pairs: &[(Label, f32)]) -> BinaryHeap<Neighbor> {
        pairs.iter().map(|&(l, d)| Neighbor::new(l, d)).collect()
    }

    #[test]
    fn test_collect_ascending() {
        let result = ResultCollector::collect(heap(&[(3, 0.5), (1, 0.0), (9, 2.0), (4, 0.02)]));

        assert_eq!(result.labels(), &[1, 4, 3, 9]);
        assert_eq!(result.distances(), &[0.0, 0.02, 0.5, 2.0]);
        assert_eq!(result.nearest(), Some((1, 0.0)));
    }

    #[test]
    fn test_collect_empty() {
        let result = ResultCollector::collect(BinaryHeap::new());
        assert!(result.is_empty());
        assert_eq!(result.nearest(), None);
    }

    #[test]
    fn test_collect_into_prefix() {
        let mut labels = [u64::MAX; 5];
        let mut distances = [f32::NAN; 5];

        let heap = heap(&[(7, 1.0), (8, 0.5)]);
        let n = ResultCollector::collect_into(heap, &mut labels, &mut distances).unwrap();

        assert_eq!(n, 2);
        assert_eq!(&labels[..n], &[8, 7]);
        assert_eq!(&distances[..n], &[0.5, 1.0]);
        // Tail untouched
        assert_eq!(labels[2], u64::MAX);
    }

    #[test]
    fn test_collect_into_short_buffer() {
        let mut labels = [0; 1];
        let mut distances = [0.0; 1];
        let heap = heap(&[(1, 0.1), (2, 0.2)]);
        let err = ResultCollector::collect_into(heap, &mut labels, &mut distances);
        assert!(matches!(err, Err(IndexError::InvalidArgument(_))));
    }

    #[test]
    fn test_ties_keep_distance_order() {
        let result = ResultCollector::collect(heap(&[(5, 1.0), (2, 1.0), (1, 0.5)]));
        assert_eq!(result.distances(), &[0.5, 1.0, 1.0]);
        assert_eq!(result.labels()[0], 1);
    }
}

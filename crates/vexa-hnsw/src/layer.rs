//! HNSW layer management.
//!
//! Holds the per-layer graphs and the seeded level generator that decides
//! how many layers each new node joins.

use crate::graph::LayerGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Manages multiple HNSW layers.
#[derive(Debug)]
pub struct Layers {
    /// Layer graphs (index 0 = bottom layer, highest index = top layer)
    layers: Vec<LayerGraph>,
}

impl Layers {
    /// Create a new layer manager.
    ///
    /// # Arguments
    ///
    /// * `max_layers` - Maximum number of layers
    /// * `m` - Max connections per node (layers > 0)
    /// * `m_max0` - Max connections in layer 0 (typically 2*M)
    pub fn new(max_layers: usize, m: usize, m_max0: usize) -> Self {
        let layers = (0..max_layers)
            .map(|layer| {
                let max_degree = if layer == 0 { m_max0 } else { m };
                LayerGraph::new(max_degree)
            })
            .collect();

        Self { layers }
    }

    pub fn get(&self, layer: usize) -> Option<&LayerGraph> {
        self.layers.get(layer)
    }

    pub fn get_mut(&mut self, layer: usize) -> Option<&mut LayerGraph> {
        self.layers.get_mut(layer)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

/// Seeded generator for node levels.
///
/// Draws `floor(-ln(uniform(0,1)) * m_L)` with `m_L = 1/ln(M)`, so the
/// probability of reaching layer L is roughly 1/M^L. The same seed always
/// yields the same level sequence.
#[derive(Debug)]
pub struct LevelGenerator {
    rng: StdRng,
    level_mult: f64,
    max_level: usize,
}

impl LevelGenerator {
    /// `m` must be >= 2 so that `ln(m) > 0`.
    pub fn new(m: usize, max_layers: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            level_mult: 1.0 / (m as f64).ln(),
            max_level: max_layers.saturating_sub(1),
        }
    }

    /// Draw the level for the next node.
    pub fn next_level(&mut self) -> usize {
        let uniform: f64 = self.rng.gen_range(f64::EPSILON..1.0); // Avoid ln(0)
        let level = (-uniform.ln() * self.level_mult).floor() as usize;
        level.min(self.max_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_creation() {
        let layers = Layers::new(16, 16, 32);
        assert_eq!(layers.num_layers(), 16);
        assert_eq!(layers.get(0).unwrap().max_degree(), 32);
        assert_eq!(layers.get(1).unwrap().max_degree(), 16);
        assert!(layers.get(16).is_none());
    }

    #[test]
    fn test_level_distribution() {
        let max_layers = 16;
        let mut levels = LevelGenerator::new(16, max_layers, 42);
        let mut counts = vec![0usize; max_layers];

        for _ in 0..10000 {
            let level = levels.next_level();
            assert!(level < max_layers);
            counts[level] += 1;
        }

        // Layer 0 should have most nodes
        assert!(counts[0] > counts[1]);
        // Roughly 1/16 reach layer 1
        assert!(counts[0] > 10000 * 8 / 10);
    }

    #[test]
    fn test_level_sequence_is_seeded() {
        let mut a = LevelGenerator::new(4, 16, 7);
        let mut b = LevelGenerator::new(4, 16, 7);

        let seq_a: Vec<_> = (0..200).map(|_| a.next_level()).collect();
        let seq_b: Vec<_> = (0..200).map(|_| b.next_level()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_level_capped() {
        let mut levels = LevelGenerator::new(2, 1, 3);
        for _ in 0..1000 {
            assert_eq!(levels.next_level(), 0);
        }
    }
}

//! Index configuration.

use crate::{IndexError, Result};
use serde::{Deserialize, Serialize};
use vexa_hnsw::HnswConfig;
use vexa_vector::Metric;

/// Parameters fixed when an index is created.
///
/// `ef_search` is the only one that can change afterwards, through
/// `IndexHandle::set_search_width`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Vector dimension.
    /// Default: 128
    pub dimension: usize,

    /// Maximum number of distinct labels.
    /// Default: 10_000
    pub capacity: usize,

    /// Graph degree (M). Must be >= 2.
    /// Default: 16
    pub m: usize,

    /// Beam width while building.
    /// Default: 200
    pub ef_construction: usize,

    /// Beam width while searching. `None` means "same as ef_construction".
    /// Default: None
    pub ef_search: Option<usize>,

    /// Seed for the engine's level assignment.
    /// Default: 100
    pub seed: u64,

    /// Similarity metric.
    /// Default: L2
    pub metric: Metric,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: 128,
            capacity: 10_000,
            m: 16,
            ef_construction: 200,
            ef_search: None,
            seed: 100,
            metric: Metric::L2,
        }
    }
}

impl IndexConfig {
    /// Default parameters for the given shape.
    pub fn new(dimension: usize, capacity: usize) -> Self {
        Self {
            dimension,
            capacity,
            ..Default::default()
        }
    }

    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = Some(ef);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Effective search beam width.
    pub fn search_width(&self) -> usize {
        self.ef_search.unwrap_or(self.ef_construction)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(IndexError::InvalidConfig(msg)) };

        if self.dimension == 0 {
            return invalid("dimension must be >= 1".into());
        }
        if self.capacity == 0 {
            return invalid("capacity must be >= 1".into());
        }
        if self.m < 2 {
            return invalid(format!("m must be >= 2, got {}", self.m));
        }
        if self.ef_construction == 0 {
            return invalid("ef_construction must be >= 1".into());
        }
        if self.ef_search == Some(0) {
            return invalid("ef_search must be >= 1".into());
        }
        Ok(())
    }

    /// Engine configuration derived from these parameters.
    pub fn hnsw_config(&self) -> HnswConfig {
        HnswConfig {
            ef_construction: self.ef_construction,
            ef_search: self.search_width(),
            seed: self.seed,
            ..HnswConfig::from_m(self.m)
        }
    }
}

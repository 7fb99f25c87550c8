//! Index handle.
//!
//! An [`IndexHandle`] exclusively owns one engine, and through it one
//! distance space. It validates input, normalizes vectors for cosine
//! indices, orders search output and records metrics. Dropping or
//! destroying the handle releases the engine exactly once.

use crate::collector::{ResultCollector, SearchResult};
use crate::config::IndexConfig;
use crate::{IndexError, Result};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use vexa_hnsw::HnswIndex;
use vexa_observe::{
    obs_count, obs_gauge, obs_timed, IndexEvt, IndexKind, Meter, NoopMeter, VizEvent,
};
use vexa_vector::{validate_vector, AnnEngine, Label, Metric, Neighbor, VectorError};

const INSERT_TOTAL: &str = "vexa_insert_total";
const SEARCH_TOTAL: &str = "vexa_search_total";
const ERROR_TOTAL: &str = "vexa_error_total";
const INDEX_LEN: &str = "vexa_index_len";
const SEARCH_MS: &str = "vexa_search_ms";

static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(1);

/// Owned handle to a vector index.
///
/// Move-only: there is no way to clone or alias it, and `destroy` consumes
/// it. Mutating calls take `&mut self`; `search` takes `&self`, so any number
/// of threads may search one handle while nobody writes.
pub struct IndexHandle<E: AnnEngine = HnswIndex> {
    id: u64,
    config: IndexConfig,
    engine: E,
    meter: Arc<dyn Meter>,
}

impl IndexHandle<HnswIndex> {
    /// Create an HNSW-backed index.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if a parameter is out of range
    /// - `Allocation` if node storage for `capacity` cannot be reserved
    ///
    /// # Example
    ///
    /// ```
    /// use vexa_index::{IndexConfig, IndexHandle};
    ///
    /// let mut index = IndexHandle::create(IndexConfig::new(2, 10)).unwrap();
    /// index.insert(&[0.0, 1.0], 7).unwrap();
    /// assert_eq!(index.search(&[0.0, 1.0], 1).unwrap().labels(), &[7]);
    /// ```
    pub fn create(config: IndexConfig) -> Result<Self> {
        Self::create_with_meter(config, Arc::new(NoopMeter))
    }

    /// Create an HNSW-backed index reporting to `meter`.
    pub fn create_with_meter(config: IndexConfig, meter: Arc<dyn Meter>) -> Result<Self> {
        config.validate()?;
        let engine = HnswIndex::new(
            config.dimension,
            config.capacity,
            config.metric.space(),
            config.hnsw_config(),
        )?;
        Ok(Self::assemble(config, engine, meter))
    }
}

impl<E: AnnEngine> IndexHandle<E> {
    /// Wrap an existing engine.
    ///
    /// The engine must match the configuration's dimension, capacity and
    /// distance space. Its search width is reset to the configured one.
    pub fn with_engine(config: IndexConfig, engine: E) -> Result<Self> {
        Self::with_engine_and_meter(config, engine, Arc::new(NoopMeter))
    }

    /// Wrap an existing engine, reporting to `meter`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is out of range or the engine's
    /// dimension, capacity or distance space does not match it.
    pub fn with_engine_and_meter(
        config: IndexConfig,
        mut engine: E,
        meter: Arc<dyn Meter>,
    ) -> Result<Self> {
        config.validate()?;

        if engine.dimensions() != config.dimension {
            return Err(IndexError::InvalidConfig(format!(
                "engine dimension {} does not match configured {}",
                engine.dimensions(),
                config.dimension
            )));
        }
        if engine.capacity() != config.capacity {
            return Err(IndexError::InvalidConfig(format!(
                "engine capacity {} does not match configured {}",
                engine.capacity(),
                config.capacity
            )));
        }
        if engine.space() != config.metric.space() {
            return Err(IndexError::InvalidConfig(format!(
                "engine space {:?} does not serve metric {}",
                engine.space(),
                config.metric
            )));
        }

        engine.set_search_width(config.search_width());
        Ok(Self::assemble(config, engine, meter))
    }

    fn assemble(config: IndexConfig, engine: E, meter: Arc<dyn Meter>) -> Self {
        let id = NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            index = id,
            dimension = config.dimension,
            capacity = config.capacity,
            m = config.m,
            ef_construction = config.ef_construction,
            ef_search = config.search_width(),
            metric = %config.metric,
            "Created vector index"
        );
        meter.emit(VizEvent::Index(IndexEvt {
            index: id,
            kind: IndexKind::Created {
                dimension: config.dimension,
                capacity: config.capacity,
                metric: config.metric.as_str(),
            },
        }));

        Self {
            id,
            config,
            engine,
            meter,
        }
    }

    /// Process-unique id, used in logs and events.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    pub fn search_width(&self) -> usize {
        self.engine.search_width()
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn contains(&self, label: Label) -> bool {
        self.engine.contains(label)
    }

    /// Stored coordinates for `label`, normalized for cosine indices.
    pub fn get(&self, label: Label) -> Option<Vec<f32>> {
        self.engine.get(label)
    }

    /// Read-only access to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Insert a vector under `label`.
    ///
    /// Cosine indices store a unit-normalized copy; the caller's slice is
    /// never modified. Re-inserting an existing label overwrites it.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` / `InvalidVector` for malformed input (including
    ///   a zero vector on a cosine index)
    /// - `CapacityExceeded` for a new label on a full index; the handle stays
    ///   usable
    pub fn insert(&mut self, vector: &[f32], label: Label) -> Result<()> {
        let result = self.insert_inner(vector, label);
        if let Err(e) = &result {
            obs_count!(self.meter, ERROR_TOTAL, &[], 1);
            tracing::debug!(index = self.id, label, error = %e, "Insert rejected");
        }
        result
    }

    fn insert_inner(&mut self, vector: &[f32], label: Label) -> Result<()> {
        validate_vector(vector, self.config.dimension)?;
        let prepared = self.config.metric.prepare(vector)?;
        let vector = prepared.as_deref().unwrap_or(vector);

        let overwrite = self.engine.contains(label);
        match self.engine.insert(vector, label) {
            Ok(()) => {}
            Err(VectorError::CapacityExceeded { capacity }) => {
                tracing::warn!(index = self.id, label, capacity, "Index is full");
                self.emit(IndexKind::CapacityExceeded { capacity });
                return Err(IndexError::CapacityExceeded { capacity });
            }
            Err(e) => return Err(e.into()),
        }

        let len = self.engine.len();
        obs_count!(self.meter, INSERT_TOTAL, &[], 1);
        obs_gauge!(self.meter, INDEX_LEN, &[], len);
        if overwrite {
            self.emit(IndexKind::Overwritten { label });
        } else {
            self.emit(IndexKind::Inserted { len });
        }
        Ok(())
    }

    /// Search for the `k` nearest neighbors of `query`.
    ///
    /// Returns `min(k, len)` matches, nearest first. An empty index yields
    /// an empty result, not an error.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` unless `1 <= k <= capacity`
    /// - `DimensionMismatch` / `InvalidVector` for a malformed query
    pub fn search(&self, query: &[f32], k: usize) -> Result<SearchResult> {
        let heap = self.search_heap(query, k)?;
        Ok(ResultCollector::collect(heap))
    }

    /// Search into caller-provided buffers, each at least `k` long.
    ///
    /// Returns the number of matches written; entries past it are untouched.
    pub fn search_into(
        &self,
        query: &[f32],
        k: usize,
        labels: &mut [Label],
        distances: &mut [f32],
    ) -> Result<usize> {
        if labels.len() < k || distances.len() < k {
            obs_count!(self.meter, ERROR_TOTAL, &[], 1);
            return Err(IndexError::InvalidArgument(format!(
                "output buffers must hold k = {} entries",
                k
            )));
        }
        let heap = self.search_heap(query, k)?;
        ResultCollector::collect_into(heap, labels, distances)
    }

    fn search_heap(&self, query: &[f32], k: usize) -> Result<BinaryHeap<Neighbor>> {
        let result = self.search_heap_inner(query, k);
        match &result {
            Ok(heap) => {
                obs_count!(self.meter, SEARCH_TOTAL, &[], 1);
                self.emit(IndexKind::Searched { k, found: heap.len() });
            }
            Err(e) => {
                obs_count!(self.meter, ERROR_TOTAL, &[], 1);
                tracing::debug!(index = self.id, k, error = %e, "Search rejected");
            }
        }
        result
    }

    fn search_heap_inner(&self, query: &[f32], k: usize) -> Result<BinaryHeap<Neighbor>> {
        if k == 0 || k > self.config.capacity {
            return Err(IndexError::InvalidArgument(format!(
                "k must satisfy 1 <= k <= {}, got {}",
                self.config.capacity, k
            )));
        }
        validate_vector(query, self.config.dimension)?;
        let prepared = self.config.metric.prepare(query)?;
        let query = prepared.as_deref().unwrap_or(query);

        let heap = obs_timed!(self.meter, SEARCH_MS, &[], { self.engine.search(query, k) })?;
        Ok(heap)
    }

    /// Change the search beam width. Takes effect on the next search.
    pub fn set_search_width(&mut self, width: usize) -> Result<()> {
        if width == 0 {
            obs_count!(self.meter, ERROR_TOTAL, &[], 1);
            return Err(IndexError::InvalidArgument(
                "search width must be >= 1".into(),
            ));
        }

        let from = self.engine.search_width();
        self.engine.set_search_width(width);
        self.config.ef_search = Some(width);

        tracing::debug!(index = self.id, from, to = width, "Search width changed");
        self.emit(IndexKind::SearchWidthChanged { from, to: width });
        Ok(())
    }

    /// Release the index and its engine.
    pub fn destroy(self) {
        drop(self);
    }

    fn emit(&self, kind: IndexKind) {
        self.meter.emit(VizEvent::Index(IndexEvt {
            index: self.id,
            kind,
        }));
    }
}

impl<E: AnnEngine> Drop for IndexHandle<E> {
    fn drop(&mut self) {
        let len = self.engine.len();
        tracing::debug!(index = self.id, len, "Released vector index");
        self.emit(IndexKind::Destroyed { len });
    }
}

impl<E: AnnEngine> fmt::Debug for IndexHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexHandle")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("len", &self.engine.len())
            .finish()
    }
}

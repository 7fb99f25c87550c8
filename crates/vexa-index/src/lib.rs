//! Managed vector index.
//!
//! Wraps an approximate nearest neighbor engine (HNSW by default) behind an
//! owned [`IndexHandle`]:
//!
//! - validated construction with a fixed dimension, capacity and metric
//! - L2, inner-product and cosine metrics; cosine vectors are normalized on
//!   a private copy before they reach the engine
//! - top-k search returned nearest first
//! - an adjustable search beam width
//!
//! Every fallible call returns a [`Result`]. Callers that want a flat
//! sentinel surface (handle or nothing, count or `-1`, last error fetched
//! separately) use a [`Boundary`], which owns its own [`ErrorSlot`].
//! [`SharedIndex`] puts a handle behind a reader-writer lock for use across
//! threads.
//!
//! # Example
//!
//! ```
//! use vexa_index::{IndexConfig, IndexHandle, Metric};
//!
//! let config = IndexConfig::new(4, 100)
//!     .with_m(16)
//!     .with_ef_construction(200)
//!     .with_ef_search(50)
//!     .with_seed(42)
//!     .with_metric(Metric::L2);
//! let mut index = IndexHandle::create(config).unwrap();
//!
//! index.insert(&[1.0, 0.0, 0.0, 0.0], 1).unwrap();
//! index.insert(&[0.0, 1.0, 0.0, 0.0], 2).unwrap();
//! index.insert(&[0.9, 0.1, 0.0, 0.0], 3).unwrap();
//!
//! let result = index.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
//! assert_eq!(result.labels(), &[1, 3]);
//! assert_eq!(result.distances()[0], 0.0);
//! assert!((result.distances()[1] - 0.02).abs() < 1e-5);
//! ```

mod boundary;
mod collector;
mod config;
mod error;
mod handle;
mod shared;

pub use boundary::{Boundary, ErrorSlot, SEARCH_FAILED};
pub use collector::{ResultCollector, SearchResult};
pub use config::IndexConfig;
pub use error::{ErrorKind, IndexError, Result};
pub use handle::IndexHandle;
pub use shared::SharedIndex;

pub use vexa_vector::{Label, Metric};

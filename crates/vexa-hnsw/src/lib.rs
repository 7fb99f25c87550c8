//! HNSW (Hierarchical Navigable Small World) engine for vexa.
//!
//! Provides approximate nearest neighbor (ANN) search using the HNSW
//! algorithm. HNSW builds a multi-layer graph where:
//!
//! - Higher layers have fewer nodes (exponential decay)
//! - Each layer is a navigable small-world graph
//! - Search starts at top layer and descends
//!
//! The engine implements [`vexa_vector::AnnEngine`] and is normally driven
//! through `vexa-index`, which adds normalization, result ordering and error
//! capture on top.
//!
//! # Parameters
//!
//! - `M`: Max connections per node per layer (default: 16)
//! - `ef_construction`: Beam width during index building (default: 200)
//! - `ef_search`: Beam width during search (default: 10)
//! - `max_layers`: Maximum number of layers (default: 16)
//! - `seed`: Seed for level assignment (default: 100)
//!
//! # Example
//!
//! ```
//! use vexa_hnsw::{HnswConfig, HnswIndex};
//! use vexa_vector::{AnnEngine, Space};
//!
//! let mut index = HnswIndex::new(128, 1_000, Space::L2, HnswConfig::default()).unwrap();
//!
//! index.insert(&[1.0; 128], 1).unwrap();
//! index.insert(&[2.0; 128], 2).unwrap();
//!
//! let heap = index.search(&[1.5; 128], 10).unwrap();
//! assert_eq!(heap.len(), 2);
//! ```

mod graph;
mod index;
mod layer;

pub use index::{HnswConfig, HnswIndex};

/// Error type for HNSW operations.
#[derive(Debug, thiserror::Error)]
pub enum HnswError {
    #[error("Vector error: {0}")]
    Vector(#[from] vexa_vector::VectorError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Allocation failed: {0}")]
    Allocation(String),
}

/// Result type for HNSW operations.
pub type Result<T> = std::result::Result<T, HnswError>;

//! Vector spaces and engine abstractions for vexa.
//!
//! This crate provides the pieces every vexa index is built from:
//!
//! - **Distance functions**: squared Euclidean (L2) and inner product
//! - **Space / Metric**: maps a metric selector (L2, inner product, cosine)
//!   to the distance space an engine computes in, and tells callers when
//!   vectors must be normalized first
//! - **AnnEngine trait**: the capability surface of a nearest-neighbor engine
//!   (`insert`, `search`, `set_search_width`)
//! - **BruteForceIndex**: exact linear-scan engine (recall baseline)
//!
//! # Architecture
//!
//! ```text
//! vexa-index::IndexHandle   (validation, normalization, result ordering)
//!      │ owns exactly one
//!      ▼
//! AnnEngine                 vexa-hnsw::HnswIndex  (approximate, graph)
//!                           vexa-vector::BruteForceIndex (exact, scan)
//!      │ owns exactly one
//!      ▼
//! Space                     L2 | InnerProduct
//! ```
//!
//! # Example
//!
//! ```
//! use vexa_vector::{AnnEngine, BruteForceIndex, Space};
//!
//! let mut index = BruteForceIndex::new(4, 100, Space::L2);
//! index.insert(&[1.0, 0.0, 0.0, 0.0], 1).unwrap();
//! index.insert(&[0.0, 1.0, 0.0, 0.0], 2).unwrap();
//!
//! // Engines hand back a max-heap: the worst match sits on top.
//! let heap = index.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
//! assert_eq!(heap.peek().unwrap().label, 2);
//! ```

mod brute;
mod distance;
mod space;
mod traits;

pub use brute::BruteForceIndex;
pub use distance::{
    euclidean_distance, euclidean_distance_squared, inner_product, l2_norm, normalize,
    normalized,
};
pub use space::{Metric, Space};
pub use traits::{AnnEngine, Label, Neighbor};

/// Error type for vector operations.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Capacity exceeded: index holds at most {capacity} labels")]
    CapacityExceeded { capacity: usize },

    #[error("Unknown metric: {0:?}")]
    UnknownMetric(String),

    #[error("Index error: {0}")]
    IndexError(String),
}

/// Result type for vector operations.
pub type Result<T> = std::result::Result<T, VectorError>;

/// Check that a vector has the expected dimension and only finite values.
pub fn validate_vector(vector: &[f32], dimensions: usize) -> Result<()> {
    if vector.len() != dimensions {
        return Err(VectorError::DimensionMismatch {
            expected: dimensions,
            actual: vector.len(),
        });
    }

    for (i, &v) in vector.iter().enumerate() {
        if v.is_nan() {
            return Err(VectorError::InvalidVector(format!("NaN at index {}", i)));
        }
        if v.is_infinite() {
            return Err(VectorError::InvalidVector(format!("Inf at index {}", i)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_vector() {
        assert!(validate_vector(&[1.0, 2.0], 2).is_ok());

        match validate_vector(&[1.0, 2.0, 3.0], 2) {
            Err(VectorError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected dimension mismatch, got {:?}", other),
        }

        assert!(matches!(
            validate_vector(&[f32::NAN, 0.0], 2),
            Err(VectorError::InvalidVector(_))
        ));
        assert!(matches!(
            validate_vector(&[0.0, f32::INFINITY], 2),
            Err(VectorError::InvalidVector(_))
        ));
    }
}

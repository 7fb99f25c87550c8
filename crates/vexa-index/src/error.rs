//! Index error types.

use vexa_hnsw::HnswError;
use vexa_vector::VectorError;

/// Error type for index operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Allocation failed: {0}")]
    Allocation(String),

    #[error("Capacity exceeded: index holds at most {capacity} labels")]
    CapacityExceeded { capacity: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

/// Coarse classification of an [`IndexError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad parameters or allocation failure while creating an index.
    Construction,
    /// A new label arrived at a full index.
    CapacityExceeded,
    /// Malformed vector, query or argument.
    InvalidInput,
    /// Any other fault raised inside the engine.
    Engine,
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_) | Self::Allocation(_) => ErrorKind::Construction,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::DimensionMismatch { .. } | Self::InvalidVector(_) | Self::InvalidArgument(_) => {
                ErrorKind::InvalidInput
            }
            Self::Engine(_) => ErrorKind::Engine,
        }
    }
}

impl From<VectorError> for IndexError {
    fn from(e: VectorError) -> Self {
        match e {
            VectorError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            VectorError::InvalidVector(msg) => Self::InvalidVector(msg),
            VectorError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            VectorError::CapacityExceeded { capacity } => Self::CapacityExceeded { capacity },
            VectorError::UnknownMetric(s) => Self::InvalidConfig(format!("unknown metric {:?}", s)),
            VectorError::IndexError(msg) => Self::Engine(msg),
        }
    }
}

impl From<HnswError> for IndexError {
    fn from(e: HnswError) -> Self {
        match e {
            HnswError::Vector(e) => e.into(),
            HnswError::Config(msg) => Self::InvalidConfig(msg),
            HnswError::Allocation(msg) => Self::Allocation(msg),
        }
    }
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_error_mapping() {
        let e: IndexError = VectorError::CapacityExceeded { capacity: 3 }.into();
        assert_eq!(e, IndexError::CapacityExceeded { capacity: 3 });
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);

        let e: IndexError = VectorError::DimensionMismatch {
            expected: 4,
            actual: 2,
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert_eq!(e.to_string(), "Dimension mismatch: expected 4, got 2");
    }

    #[test]
    fn test_hnsw_error_mapping() {
        let e: IndexError = HnswError::Config("m must be >= 2, got 1".into()).into();
        assert_eq!(e.kind(), ErrorKind::Construction);

        let e: IndexError = HnswError::Allocation("out of memory".into()).into();
        assert!(matches!(e, IndexError::Allocation(_)));

        let e: IndexError = HnswError::Vector(VectorError::IndexError("boom".into())).into();
        assert_eq!(e.kind(), ErrorKind::Engine);
    }
}

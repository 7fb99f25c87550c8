//! Metric selection.
//!
//! A [`Metric`] is what the caller asks for; a [`Space`] is what the engine
//! computes in. Cosine and inner product share the inner-product space; cosine
//! additionally requires every vector to be normalized before it reaches the
//! engine.

use crate::distance::{euclidean_distance_squared, inner_product, normalized};
use crate::{Result, VectorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance space an engine computes in.
///
/// Lower distance always means more similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    /// Squared Euclidean distance: sum((a[i] - b[i])^2)
    L2,
    /// Inner-product distance: 1 - (a · b)
    InnerProduct,
}

impl Space {
    /// Compute distance between two vectors.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::L2 => euclidean_distance_squared(a, b),
            Self::InnerProduct => 1.0 - inner_product(a, b),
        }
    }
}

/// Similarity metric selected when an index is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metric {
    /// Squared Euclidean distance.
    #[default]
    L2,
    /// Inner product, `1 - a · b`.
    InnerProduct,
    /// Cosine distance: inner product over unit-normalized vectors.
    Cosine,
}

impl Metric {
    /// Map a metric to the distance space its engine uses.
    pub fn space(&self) -> Space {
        match self {
            Self::L2 => Space::L2,
            Self::InnerProduct | Self::Cosine => Space::InnerProduct,
        }
    }

    /// Whether vectors must be unit-normalized before reaching the engine.
    pub fn normalizes(&self) -> bool {
        matches!(self, Self::Cosine)
    }

    /// Canonical selector string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L2 => "l2",
            Self::InnerProduct => "ip",
            Self::Cosine => "cosine",
        }
    }

    /// Lenient selector parsing.
    ///
    /// Recognizes `l2`, `ip` and `cosine` (plus a few aliases, any case).
    /// Anything else falls back to [`Metric::L2`].
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or_else(|_| {
            tracing::warn!(selector, "Unrecognized metric selector, falling back to l2");
            Self::L2
        })
    }

    /// Single-character selector: `'i'` inner product, `'c'` cosine,
    /// anything else L2.
    pub fn from_tag(tag: char) -> Self {
        match tag {
            'i' => Self::InnerProduct,
            'c' => Self::Cosine,
            _ => Self::L2,
        }
    }

    /// Single-character selector for this metric.
    pub fn tag(&self) -> char {
        match self {
            Self::L2 => 'l',
            Self::InnerProduct => 'i',
            Self::Cosine => 'c',
        }
    }

    /// Prepare a vector for the engine.
    ///
    /// Returns a normalized copy for cosine, `None` when the vector can be
    /// handed over as is.
    pub fn prepare(&self, vector: &[f32]) -> Result<Option<Vec<f32>>> {
        if self.normalizes() {
            normalized(vector).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl FromStr for Metric {
    type Err = VectorError;

    /// Strict parsing: unknown selectors are an error.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "ip" | "inner_product" | "innerproduct" | "dot" => Ok(Self::InnerProduct),
            "cosine" | "cos" => Ok(Self::Cosine),
            _ => Err(VectorError::UnknownMetric(s.to_string())),
        }
    }
}

impl From<String> for Metric {
    fn from(s: String) -> Self {
        Self::from_selector(&s)
    }
}

impl From<Metric> for String {
    fn from(m: Metric) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Distance kernels and the vector normalizer.
//!
//! Two kernels back every space:
//! - **Squared Euclidean**: sum((a[i] - b[i])^2), used as the L2 distance
//! - **Inner product**: a · b, turned into a distance as `1 - a · b`
//!
//! Cosine similarity is not a separate kernel. Cosine indices normalize
//! every vector to unit length and then use the inner-product space, where
//! `1 - a · b` equals the cosine distance.
//!
//! All kernels are written to be auto-vectorized in release builds.

use crate::{Result, VectorError};

/// Compute Euclidean (L2) distance between two vectors.
///
/// Returns sqrt(sum((a[i] - b[i])^2)).
///
/// # Example
///
/// ```
/// use vexa_vector::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let dist = euclidean_distance(&a, &b);
/// assert!((dist - 5.196).abs() < 0.01); // sqrt(27)
/// ```
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Compute squared Euclidean distance.
///
/// This is the distance reported by L2 indices. It preserves the ordering
/// of true Euclidean distance without paying for the sqrt.
///
/// # Example
///
/// ```
/// use vexa_vector::euclidean_distance_squared;
///
/// let a = [1.0, 0.0, 0.0, 0.0];
/// let b = [0.9, 0.1, 0.0, 0.0];
/// assert!((euclidean_distance_squared(&a, &b) - 0.02).abs() < 1e-6);
/// ```
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    // Process in chunks of 4 for better auto-vectorization
    let mut sum = 0.0f32;
    let chunks = a.len() / 4;

    for i in 0..chunks {
        let base = i * 4;
        let d0 = a[base] - b[base];
        let d1 = a[base + 1] - b[base + 1];
        let d2 = a[base + 2] - b[base + 2];
        let d3 = a[base + 3] - b[base + 3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
    }

    for i in (chunks * 4)..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }

    sum
}

/// Compute inner product (dot product) of two vectors.
///
/// Returns a · b = sum(a[i] * b[i]). Higher means more similar.
///
/// # Example
///
/// ```
/// use vexa_vector::inner_product;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// assert!((inner_product(&a, &b) - 32.0).abs() < 0.001);
/// ```
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;
    let chunks = a.len() / 4;

    for i in 0..chunks {
        let base = i * 4;
        sum += a[base] * b[base]
            + a[base + 1] * b[base + 1]
            + a[base + 2] * b[base + 2]
            + a[base + 3] * b[base + 3];
    }

    for i in (chunks * 4)..a.len() {
        sum += a[i] * b[i];
    }

    sum
}

/// L2 norm (magnitude) of a vector.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    inner_product(v, v).sqrt()
}

/// Scale a vector to unit L2 norm in place.
///
/// Fails for vectors whose norm is zero or not finite, since they have no
/// direction to preserve.
///
/// # Example
///
/// ```
/// use vexa_vector::{l2_norm, normalize};
///
/// let mut v = [4.0, 5.0, 6.0];
/// normalize(&mut v).unwrap();
/// assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
/// ```
pub fn normalize(vector: &mut [f32]) -> Result<()> {
    let norm = l2_norm(vector);
    if !norm.is_finite() || norm <= f32::EPSILON {
        return Err(VectorError::InvalidVector(format!(
            "cannot normalize vector with norm {}",
            norm
        )));
    }

    let inv = 1.0 / norm;
    for x in vector.iter_mut() {
        *x *= inv;
    }
    Ok(())
}

/// Return a unit-norm copy of `vector`, leaving the input untouched.
pub fn normalized(vector: &[f32]) -> Result<Vec<f32>> {
    let mut out = vector.to_vec();
    normalize(&mut out)?;
    Ok(out)
}

//! Small vector arithmetic helpers shared by the embedding model, the
//! preference updates and the feed ranker.

/// Dot product of two equal-length vectors.
///
/// With both inputs L2-normalized the result is bounded in [-1, 1].
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean (L2) norm.
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Scale `v` to unit length in place.
///
/// A zero-magnitude vector is left unchanged: the zero vector means "no
/// preference yet" and normalizing it is a no-op by policy, never a
/// division by zero.
pub fn l2_normalize(v: &mut [f64]) {
    let norm = l2_norm(v);
    if norm == 0.0 {
        return;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
}

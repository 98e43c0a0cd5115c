use crate::memory::Primitive;

/// Squared euclidean distance between two samples of equal dimensionality.
#[inline(always)]
pub fn squared_distance<T: Primitive>(a: &[T], b: &[T]) -> T {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter())
        .map(|(&sv, &cv)| sv - cv)      // <sample> - <centroid>
        .map(|v| v * v)                 // <vec_components> ^2
        .sum()                          // sum(<vec_components>^2)
}

#[inline(always)]
pub fn distance<T: Primitive>(a: &[T], b: &[T]) -> T {
    squared_distance(a, b).sqrt()
}

use crate::{distances::squared_distance, memory::*, IterationSnapshot, PointVector};
use serde::{Deserialize, Serialize};

/// Per-cluster quality figures of a finished clustering. Index `i` of every vector describes cluster `i`.
///
/// ## Fields
/// - **size**: Amount of samples in the cluster
/// - **sse**: Sum of squared distances from the cluster's samples to its centroid
/// - **avg_dist**: Mean (not squared) distance to the centroid, `0` for empty clusters
/// - **max_dist**: Largest distance to the centroid, `0` for empty clusters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterMetricsResult<T: Primitive> {
    pub size: Vec<usize>,
    pub sse: Vec<T>,
    pub avg_dist: Vec<T>,
    pub max_dist: Vec<T>,
}
impl<T: Primitive> ClusterMetricsResult<T> {
    /// Metrics of a snapshot's assignments and centroids over the samples it was computed from.
    pub fn from_snapshot(samples: &[PointVector<T>], snapshot: &IterationSnapshot<T>) -> Self {
        cluster_metrics(samples, &snapshot.assignments, &snapshot.centroids, snapshot.k)
    }

    pub fn k(&self) -> usize {
        self.size.len()
    }

    pub fn total_size(&self) -> usize {
        self.size.iter().sum()
    }

    pub fn total_sse(&self) -> T {
        self.sse.iter().cloned().sum()
    }
}

/// Single pass over all samples. Assignments outside `0..k` are skipped.
pub fn cluster_metrics<T: Primitive>(samples: &[PointVector<T>], assignments: &[usize], centroids: &[T], k: usize) -> ClusterMetricsResult<T> {
    let mut size = vec![0usize; k];
    let mut sse = vec![T::zero(); k];
    let mut sum_dist = vec![T::zero(); k];
    let mut max_dist = vec![T::zero(); k];
    if k == 0 {
        return ClusterMetricsResult { size, sse, avg_dist: sum_dist, max_dist };
    }
    let sample_dims = centroids.len() / k;

    for (s, &cl) in samples.iter().zip(assignments.iter()) {
        if cl >= k {
            continue;
        }
        let d2 = squared_distance(&s.features, row(centroids, cl, sample_dims));
        let d = d2.sqrt();
        size[cl] += 1;
        sse[cl] += d2;
        sum_dist[cl] += d;
        if d > max_dist[cl] {
            max_dist[cl] = d;
        }
    }

    let avg_dist = sum_dist.iter().cloned().zip(size.iter().cloned())
        .map(|(sd, cnt)| if cnt == 0 { T::zero() } else { sd / T::from_usize(cnt) })
        .collect();
    ClusterMetricsResult { size, sse, avg_dist, max_dist }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{helpers::testing, KMeansSession, SessionConfig};
    use proptest::prelude::*;

    #[test]
    fn hand_computed() {
        let samples = testing::points(&[0.0f64, 0.0, 0.0, 2.0, 10.0, 0.0, 7.0, 7.0], 2);
        let centroids = [0.0, 1.0, 10.0, 0.0, 50.0, 50.0];
        let res = cluster_metrics(&samples, &[0, 0, 1, 1], &centroids, 3);

        assert_eq!(res.size, vec![2, 2, 0]);
        assert_eq!(res.sse, vec![2.0, 58.0, 0.0]);
        assert_eq!(res.avg_dist[0], 1.0);
        assert_approx_eq!(res.avg_dist[1], 58.0f64.sqrt() / 2.0);
        assert_eq!(res.avg_dist[2], 0.0);
        assert_eq!(res.max_dist, vec![1.0, 58.0f64.sqrt(), 0.0]);
        assert_eq!(res.total_size(), 4);
        assert_eq!(res.total_sse(), 60.0);
    }

    #[test]
    fn out_of_range_assignments_are_skipped() {
        let samples = testing::points(&[1.0f64, 2.0, 3.0], 1);
        let res = cluster_metrics(&samples, &[0, 5, usize::MAX], &[0.0, 1.0], 2);
        assert_eq!(res.size, vec![1, 0]);
        assert_eq!(res.sse, vec![1.0, 0.0]);
        assert_eq!(res.total_size(), 1);
    }

    #[test]
    fn no_clusters() {
        let samples = testing::points(&[1.0f64], 1);
        let res = cluster_metrics(&samples, &[0], &[], 0);
        assert_eq!(res.k(), 0);
        assert_eq!(res.total_size(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn metrics_of_own_snapshot(seed in 0u64..500, sample_cnt in 1usize..120, k in 1usize..6) {
            let samples = testing::random_points(seed, sample_cnt, 2);
            let config = SessionConfig::build().k(k).max_iterations(5).epsilon(1e-9).random_seed(seed).build();
            let mut session = KMeansSession::new(&samples, config).unwrap();
            let snapshot = session.advance().unwrap();

            let res = ClusterMetricsResult::from_snapshot(&samples, &snapshot);
            prop_assert_eq!(res.k(), k);
            prop_assert_eq!(res.total_size(), sample_cnt);
            for ci in 0..k {
                prop_assert!(res.avg_dist[ci] <= res.max_dist[ci] + 1e-12);
            }
            let total = res.total_sse();
            let sse = snapshot.sse.unwrap();
            prop_assert!((total - sse).abs() <= 1e-9 * sse.max(1.0));
        }
    }
}

use crate::{distances::squared_distance, error::AssignmentFailure, helpers, memory::*, PointVector};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cloneable handle used to abort a session's assignment phase from any thread.
///
/// Workers poll the flag once per sample, so a running [`crate::KMeansSession::advance`] returns
/// promptly with [`AssignmentFailure::Cancelled`] after [`CancelHandle::cancel`] was called.
/// Cancelling is permanent for the session the handle belongs to.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}
impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}


/// Index of the nearest centroid (and its squared distance) for one sample.
/// Ties go to the lowest centroid index.
#[inline(always)]
pub(crate) fn nearest_centroid<T: Primitive>(sample: &[T], centroids: &[T], sample_dims: usize) -> (usize, T) {
    let mut rows = centroids.chunks_exact(sample_dims);
    let mut best_idx = 0;
    let mut best_dist = match rows.next() {
        Some(c) => squared_distance(sample, c),
        None => return (0, T::infinity()),
    };
    for (ci, c) in rows.enumerate() {
        let dist = squared_distance(sample, c);
        if dist < best_dist {
            best_idx = ci + 1;
            best_dist = dist;
        }
    }
    (best_idx, best_dist)
}

/// Assign every sample of one work-packet, returning how many assignments actually changed.
fn assign_packet<T: Primitive>(samples: &[PointVector<T>], assignments: &mut [usize], centroids: &[T],
                sample_dims: usize, cancel: &CancelHandle) -> Result<usize, AssignmentFailure> {
    let mut changed = 0;
    for (s, assignment) in samples.iter().zip(assignments.iter_mut()) {
        if cancel.is_cancelled() {
            return Err(AssignmentFailure::Cancelled);
        }
        let (best_idx, _) = nearest_centroid(&s.features, centroids, sample_dims);
        if *assignment != best_idx {
            *assignment = best_idx;
            changed += 1;
        }
    }
    Ok(changed)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}


/// Nearest-centroid assignment over contiguous work-packets.
///
/// With a parallelism of 1, packets are processed on the calling thread. Otherwise a dedicated
/// pool of that many threads is created once and reused for every call until [`AssignmentEngine::dispose`].
pub(crate) struct AssignmentEngine {
    parallelism: usize,
    pool: Option<rayon::ThreadPool>,
    disposed: bool,
    cancel: CancelHandle,
}
impl AssignmentEngine {
    pub fn new(parallelism: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let parallelism = parallelism.max(1);
        let pool = if parallelism > 1 {
            Some(rayon::ThreadPoolBuilder::new()
                .num_threads(parallelism)
                .thread_name(|i| format!("kmeans-assign-{}", i))
                .build()?)
        } else {
            None
        };
        Ok(Self { parallelism, pool, disposed: false, cancel: CancelHandle::default() })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Cancel in-flight work and release the pool. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel.cancel();
        // Dropping the pool lets its threads exit once their current job ends
        self.pool = None;
        self.disposed = true;
    }

    /// Update **assignments** in place to the nearest of the row-major **centroids**.
    /// ## Returns
    /// The amount of samples whose assignment changed.
    pub fn assign<T: Primitive>(&self, samples: &[PointVector<T>], centroids: &[T], sample_dims: usize,
                assignments: &mut [usize]) -> Result<usize, AssignmentFailure> {
        debug_assert_eq!(samples.len(), assignments.len());
        if self.disposed {
            return Err(AssignmentFailure::Disposed);
        }
        let cancel = &self.cancel;

        let pool = match &self.pool {
            Some(pool) => pool,
            None => return assign_packet(samples, assignments, centroids, sample_dims, cancel),
        };

        // Static scheduling: exactly min(parallelism, sample_cnt) contiguous packets
        let work_packet_size = helpers::work_packet_size(samples.len(), self.parallelism);
        let per_packet: Vec<usize> = pool.install(|| {
            samples.par_chunks(work_packet_size)
                .zip(assignments.par_chunks_mut(work_packet_size))
                .map(|(s, a)| {
                    panic::catch_unwind(AssertUnwindSafe(|| assign_packet(s, a, centroids, sample_dims, cancel)))
                        .unwrap_or_else(|payload| Err(AssignmentFailure::WorkerPanicked(panic_message(payload))))
                })
                .collect::<Result<Vec<usize>, AssignmentFailure>>()
        })?;
        Ok(per_packet.into_iter().sum())
    }
}
impl Drop for AssignmentEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing;
    use proptest::prelude::*;

    fn brute_force(samples: &[PointVector<f64>], centroids: &[f64], sample_dims: usize) -> Vec<usize> {
        samples.iter().map(|s| {
            let mut best = (0, f64::INFINITY);
            for (ci, c) in centroids.chunks_exact(sample_dims).enumerate() {
                let d: f64 = s.features.iter().zip(c).map(|(a, b)| (a - b) * (a - b)).sum();
                if d < best.1 {
                    best = (ci, d);
                }
            }
            best.0
        }).collect()
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let centroids = [0.0f64, 0.0, 2.0, 0.0, 0.0, 0.0];
        // (1,0) is equally far from all three centroids
        assert_eq!(nearest_centroid(&[1.0, 0.0], &centroids, 2), (0, 1.0));
        assert_eq!(nearest_centroid(&[0.0, 0.0], &centroids, 2), (0, 0.0));
        assert_eq!(nearest_centroid(&[1.9, 0.0], &centroids, 2).0, 1);
    }

    #[test]
    fn counts_only_real_changes() {
        let samples = testing::points(&[0.0f64, 0.0, 10.0, 10.0, 0.5, 0.5], 2);
        let centroids = [0.0, 0.0, 10.0, 10.0];
        let engine = AssignmentEngine::new(1).unwrap();

        let mut assignments = vec![usize::MAX; 3];
        assert_eq!(engine.assign(&samples, &centroids, 2, &mut assignments), Ok(3));
        assert_eq!(assignments, vec![0, 1, 0]);
        assert_eq!(engine.assign(&samples, &centroids, 2, &mut assignments), Ok(0));

        let mut assignments = vec![0, 0, 0];
        assert_eq!(engine.assign(&samples, &centroids, 2, &mut assignments), Ok(1));
    }

    #[test]
    fn parallel_matches_sequential() {
        let samples = testing::random_points(1337, 1001, 7);
        let centroids: Vec<f64> = samples.iter().take(9).flat_map(|s| s.features.iter().cloned()).collect();
        let should = brute_force(&samples, &centroids, 7);

        for parallelism in [1, 2, 3, 4, 8, 64] {
            let engine = AssignmentEngine::new(parallelism).unwrap();
            let mut assignments = vec![usize::MAX; samples.len()];
            let changed = engine.assign(&samples, &centroids, 7, &mut assignments).unwrap();
            assert_eq!(changed, samples.len());
            assert_eq!(assignments, should, "parallelism = {}", parallelism);
        }
    }

    #[test]
    fn more_workers_than_samples() {
        let samples = testing::points(&[1.0f64, 5.0], 1);
        let engine = AssignmentEngine::new(4).unwrap();
        let mut assignments = vec![usize::MAX; 2];
        assert_eq!(engine.assign(&samples, &[0.0, 6.0], 1, &mut assignments), Ok(2));
        assert_eq!(assignments, vec![0, 1]);
    }

    #[test]
    fn cancelled_before_run() {
        let samples = testing::random_points(7, 100, 3);
        let centroids: Vec<f64> = samples[0].features.clone();
        for parallelism in [1, 4] {
            let engine = AssignmentEngine::new(parallelism).unwrap();
            engine.cancel_handle().cancel();
            let mut assignments = vec![usize::MAX; samples.len()];
            assert_eq!(engine.assign(&samples, &centroids, 3, &mut assignments), Err(AssignmentFailure::Cancelled));
        }
    }

    #[test]
    fn dispose_is_idempotent() {
        let samples = testing::points(&[1.0f64], 1);
        let mut engine = AssignmentEngine::new(2).unwrap();
        engine.dispose();
        engine.dispose();
        assert!(engine.is_disposed());
        assert!(engine.cancel_handle().is_cancelled());
        let mut assignments = vec![usize::MAX];
        assert_eq!(engine.assign(&samples, &[0.0], 1, &mut assignments), Err(AssignmentFailure::Disposed));
    }

    #[test]
    fn worker_panic_is_reported() {
        // Zero-sized centroid rows make the row iteration panic inside the workers
        let samples = testing::points(&[1.0f64, 2.0, 3.0, 4.0], 2);
        let engine = AssignmentEngine::new(2).unwrap();
        let mut assignments = vec![usize::MAX; 2];
        let res = engine.assign(&samples, &[0.0], 0, &mut assignments);
        assert!(matches!(res, Err(AssignmentFailure::WorkerPanicked(_))), "{:?}", res);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn parallelism_does_not_change_assignments(seed in 0u64..1000, sample_cnt in 1usize..200,
                        k in 1usize..6, parallelism in 2usize..9) {
            let samples = testing::random_points(seed, sample_cnt, 3);
            let centroids: Vec<f64> = testing::random_points(seed + 1, k, 3).into_iter()
                .flat_map(|s| s.features.into_iter()).collect();

            let sequential = AssignmentEngine::new(1).unwrap();
            let parallel = AssignmentEngine::new(parallelism).unwrap();
            let mut a = vec![usize::MAX; sample_cnt];
            let mut b = vec![usize::MAX; sample_cnt];
            let ca = sequential.assign(&samples, &centroids, 3, &mut a).unwrap();
            let cb = parallel.assign(&samples, &centroids, 3, &mut b).unwrap();
            prop_assert_eq!(ca, cb);
            prop_assert_eq!(a, b);
        }
    }
}

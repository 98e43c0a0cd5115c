use crate::{assignment::AssignmentEngine, distances, error::AssignmentFailure, memory::*, KMeansState, PointVector};
use rand::prelude::*;
use std::time::{Duration, Instant};

/// Measurements of one completed Lloyd iteration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IterationOutcome<T: Primitive> {
    pub changed: usize,
    pub shift: T,
    pub distsum: T,
    pub assign_time: Duration,
    pub update_time: Duration,
    pub total_time: Duration,
}

pub(crate) struct Lloyd<T: Primitive> {
	_p: std::marker::PhantomData<T>
}
impl<T: Primitive> Lloyd<T> {
    /// Replace every centroid by the mean of its assigned samples. Clusters without samples are
    /// reseeded from a random sample, drawn in cluster order from **rnd**.
    /// ## Returns
    /// Sum over all clusters of the euclidean distance between old and new centroid.
    pub fn update_centroids<R: Rng + ?Sized>(samples: &[PointVector<T>], state: &mut KMeansState<T>, rnd: &mut R) -> T {
        let dims = state.sample_dims;
        // Sum all samples in a cluster together into new_centroids
        let mut new_centroids = vec![T::zero(); state.centroids.len()];
        state.centroid_frequency.iter_mut().for_each(|v| *v = 0);
        samples.iter()
            .zip(state.assignments.iter().cloned())
            .for_each(|(s, centroid_id)| {
                state.centroid_frequency[centroid_id] += 1;
                new_centroids.iter_mut().skip(centroid_id * dims).take(dims)
                    .zip(s.features.iter())
                    .for_each(|(c, &sv)| *c += sv);
            });

        let mut shift = T::zero();
        for (ci, nc) in new_centroids.chunks_exact_mut(dims).enumerate() {
            let cfreq = state.centroid_frequency[ci];
            if cfreq == 0 {
                let sample_id = rnd.gen_range(0, samples.len());
                tracing::debug!(cluster = ci, sample = sample_id, "reseeding empty cluster");
                nc.iter_mut().zip(samples[sample_id].features.iter()).for_each(|(c, &sv)| *c = sv);
            } else {
                let cfreq = T::from_usize(cfreq);
                nc.iter_mut().for_each(|c| *c = *c / cfreq);
            }
            shift += distances::distance(row(&state.centroids, ci, dims), nc);
        }
        state.centroids = new_centroids;
        shift
    }

    /// Sum of squared distances from every sample to its assigned centroid.
    pub fn distsum(samples: &[PointVector<T>], state: &KMeansState<T>) -> T {
        samples.iter()
            .zip(state.assignments.iter().cloned())
            .map(|(s, centroid_id)| distances::squared_distance(&s.features, row(&state.centroids, centroid_id, state.sample_dims)))
            .sum()
    }

    /// One full iteration: parallel assignment, then sequential centroid update and error calculation.
    pub fn step<R: Rng + ?Sized>(samples: &[PointVector<T>], state: &mut KMeansState<T>, engine: &AssignmentEngine,
                rnd: &mut R) -> Result<IterationOutcome<T>, AssignmentFailure> {
        let start = Instant::now();

        let changed = engine.assign(samples, &state.centroids, state.sample_dims, &mut state.assignments)?;
        let assign_done = Instant::now();

        let shift = Self::update_centroids(samples, state, rnd);
        let update_done = Instant::now();

        let distsum = Self::distsum(samples, state);
        let end = Instant::now();

        Ok(IterationOutcome {
            changed,
            shift,
            distsum,
            assign_time: assign_done - start,
            update_time: update_done - assign_done,
            total_time: end - start,
        })
    }
}

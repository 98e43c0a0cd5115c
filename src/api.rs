use crate::{
    abort_strategy::{AbortStrategy, StopReason},
    assignment::{AssignmentEngine, CancelHandle},
    error::*,
    memory::*,
    variants::Lloyd,
};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Marks a sample that was not assigned to any cluster yet.
pub(crate) const UNASSIGNED: usize = usize::MAX;

/// One input sample: its stable position in the dataset, and its features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointVector<T: Primitive> {
    pub index: usize,
    pub features: Vec<T>,
}
impl<T: Primitive> PointVector<T> {
    pub fn new(index: usize, features: Vec<T>) -> Self {
        Self { index, features }
    }
    pub fn dims(&self) -> usize {
        self.features.len()
    }
}


/// Parameters of a [`KMeansSession`].
///
/// For a more detailed information about all possible options, have a look at [`SessionConfigBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig<T: Primitive> {
    /// Amount of clusters to search for
    pub k: usize,
    /// Hard limit on the amount of iterations
    pub max_iterations: usize,
    /// Iteration stops once the summed centroid displacement falls below this value
    pub epsilon: T,
    /// Seed of the generator used for initialization and empty-cluster reseeding
    pub random_seed: u64,
    /// Amount of threads used for the assignment phase (1 runs on the calling thread)
    pub thread_count: usize,
}
impl<T: Primitive> Default for SessionConfig<T> {
    fn default() -> Self {
        Self {
            k: 2,
            max_iterations: 100,
            epsilon: T::from_f64(1e-4),
            random_seed: 12345,
            thread_count: 1,
        }
    }
}
impl<T: Primitive> SessionConfig<T> {
    /// Use the [`SessionConfigBuilder`] to build a [`SessionConfig`] instance.
    pub fn build() -> SessionConfigBuilder<T> {
        SessionConfigBuilder { config: SessionConfig::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(KMeansError::invalid("k must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(KMeansError::invalid("max_iterations must be greater than 0"));
        }
        if !(self.epsilon > T::zero()) {
            return Err(KMeansError::invalid(format!("epsilon must be greater than 0, got {}", self.epsilon)));
        }
        if self.thread_count == 0 {
            return Err(KMeansError::invalid("thread_count must be at least 1"));
        }
        Ok(())
    }
}

pub struct SessionConfigBuilder<T: Primitive> {
    config: SessionConfig<T>
}
impl<T: Primitive> SessionConfigBuilder<T> {
    pub fn k(mut self, k: usize) -> Self {
        self.config.k = k; self
    }
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations; self
    }
    pub fn epsilon(mut self, epsilon: T) -> Self {
        self.config.epsilon = epsilon; self
    }
    /// Use the same seed for deterministically repeatable results.
    /// ## Default
    /// `12345`
    pub fn random_seed(mut self, random_seed: u64) -> Self {
        self.config.random_seed = random_seed; self
    }
    /// The result does not depend on this value, only the wall-clock time does.
    pub fn thread_count(mut self, thread_count: usize) -> Self {
        self.config.thread_count = thread_count; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> SessionConfig<T> { self.config }
}


/// Immutable outcome of one call to [`KMeansSession::advance`].
///
/// ## Fields
/// - **iteration**: 1-based number of the iteration this snapshot describes
/// - **sse**: Sum of squared distances from all samples to their centroids (`None` if no work was done)
/// - **shift**: Summed displacement of all centroids during this iteration (`None` if no work was done)
/// - **changed**: Amount of samples that moved to another cluster
/// - **assignments**: Vector mapping each sample to its cluster
/// - **centroids**: Cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **stop_reason**: Set once the session is finished
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationSnapshot<T: Primitive> {
    pub iteration: usize,
    pub sse: Option<T>,
    pub shift: Option<T>,
    pub changed: usize,
    pub assign_time: Duration,
    pub update_time: Duration,
    pub total_time: Duration,
    pub k: usize,
    pub sample_dims: usize,
    pub assignments: Vec<usize>,
    pub centroids: Vec<T>,
    pub stop_reason: Option<StopReason>,
}
impl<T: Primitive> IterationSnapshot<T> {
    pub fn is_finished(&self) -> bool {
        self.stop_reason.is_some()
    }
    pub fn centroid(&self, idx: usize) -> &[T] {
        row(&self.centroids, idx, self.sample_dims)
    }
    pub fn assign_ms(&self) -> f64 { self.assign_time.as_secs_f64() * 1000.0 }
    pub fn update_ms(&self) -> f64 { self.update_time.as_secs_f64() * 1000.0 }
    pub fn total_ms(&self) -> f64 { self.total_time.as_secs_f64() * 1000.0 }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Centroids are initialized, no iteration ran yet
    Created,
    Running,
    /// A snapshot carrying a stop reason was produced
    Finished,
}


/// Mutable working set of a session: current centroids and assignments.
/// Never handed out; snapshots carry copies.
#[derive(Clone, Debug)]
pub(crate) struct KMeansState<T: Primitive> {
    pub k: usize,
    pub sample_dims: usize,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            sample_dims,
            centroids: vec![T::zero(); sample_dims * k],
            centroid_frequency: vec![0usize; k],
            assignments: vec![UNASSIGNED; sample_cnt],
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }
}


/// Entrypoint of this crate's API-Surface: a k-means calculation that is driven one iteration at a time.
///
/// The session borrows the samples for its whole lifetime and never mutates them. Each call to
/// [`KMeansSession::advance`] runs exactly one Lloyd iteration (assignment, centroid update, error
/// calculation) and returns an independent [`IterationSnapshot`]. Whether to call again is up to the
/// caller, until a snapshot carries a [`StopReason`].
///
/// With `thread_count > 1`, the session owns a dedicated worker pool for the assignment phase. It is
/// released by [`KMeansSession::dispose`], or at the latest when the session is dropped.
///
/// ## Example
/// ```rust
/// use kmeans_session::*;
///
/// let samples: Vec<PointVector<f64>> = [[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]].iter()
///     .enumerate()
///     .map(|(i, s)| PointVector::new(i, s.to_vec()))
///     .collect();
/// let config = SessionConfig::build().k(2).max_iterations(10).epsilon(1e-6).build();
///
/// let mut session = KMeansSession::new(&samples, config).unwrap();
/// loop {
///     let snapshot = session.advance().unwrap();
///     println!("Iteration {} - Error: {:?}", snapshot.iteration, snapshot.sse);
///     if let Some(reason) = snapshot.stop_reason {
///         println!("Stopped: {}", reason);
///         break;
///     }
/// }
/// session.dispose();
/// ```
pub struct KMeansSession<'p, T: Primitive> {
    samples: &'p [PointVector<T>],
    abort_strategy: AbortStrategy<T>,
    rnd: StdRng,
    engine: AssignmentEngine,
    state: KMeansState<T>,
    iteration: usize,
    stop_reason: Option<StopReason>,
    poisoned: bool,
}
impl<'p, T: Primitive> KMeansSession<'p, T> {
    /// Create a session whose centroids are randomly sampled (with replacement) from **samples**.
    ///
    /// The dimensionality is taken from the first sample; all samples must share it.
    pub fn new(samples: &'p [PointVector<T>], config: SessionConfig<T>) -> Result<Self> {
        let mut session = Self::prepare(samples, &config)?;
        crate::inits::randomsample::calculate(samples, &mut session.state, &mut session.rnd)?;
        session.log_created();
        Ok(session)
    }

    /// Create a session starting from precomputed centroids [row-major] = [<centroid0>,<centroid1>,...].
    /// The generator seeded from **config** is still used for empty-cluster reseeding.
    pub fn with_centroids(samples: &'p [PointVector<T>], centroids: &[T], config: SessionConfig<T>) -> Result<Self> {
        let mut session = Self::prepare(samples, &config)?;
        crate::inits::precomputed::calculate(&mut session.state, centroids)?;
        session.log_created();
        Ok(session)
    }

    fn prepare(samples: &'p [PointVector<T>], config: &SessionConfig<T>) -> Result<Self> {
        config.validate()?;
        let sample_dims = match samples.first() {
            Some(s) => s.dims(),
            None => return Err(KMeansError::invalid("sample set is empty")),
        };
        if sample_dims == 0 {
            return Err(KMeansError::invalid("samples have no features"));
        }
        debug_assert!(samples.iter().all(|s| s.dims() == sample_dims));

        Ok(Self {
            samples,
            abort_strategy: AbortStrategy { max_iterations: config.max_iterations, epsilon: config.epsilon },
            rnd: StdRng::seed_from_u64(config.random_seed),
            engine: AssignmentEngine::new(config.thread_count)?,
            state: KMeansState::new(samples.len(), sample_dims, config.k),
            iteration: 0,
            stop_reason: None,
            poisoned: false,
        })
    }

    fn log_created(&self) {
        tracing::info!(
            samples = self.samples.len(),
            dims = self.state.sample_dims,
            k = self.state.k,
            max_iterations = self.abort_strategy.max_iterations,
            "k-means session created"
        );
    }

    /// Run exactly one iteration and describe its outcome.
    ///
    /// Calling this after the iteration limit was reached is allowed: no work is done and another
    /// [`StopReason::MaxIter`] snapshot without error value and with zero timings is returned.
    ///
    /// ## Errors
    /// [`KMeansError::AssignmentFailed`] when the assignment phase was cancelled or a worker failed.
    /// The session is unusable afterwards and should be disposed.
    pub fn advance(&mut self) -> Result<IterationSnapshot<T>> {
        if self.abort_strategy.exhausted(self.iteration) {
            self.stop_reason = Some(StopReason::MaxIter);
            return Ok(self.snapshot(None, None, 0, Duration::ZERO, Duration::ZERO, Duration::ZERO));
        }
        if self.engine.is_disposed() {
            return Err(AssignmentFailure::Disposed.into());
        }
        if self.poisoned {
            return Err(AssignmentFailure::Poisoned.into());
        }

        let outcome = match Lloyd::step(self.samples, &mut self.state, &self.engine, &mut self.rnd) {
            Ok(outcome) => outcome,
            Err(failure) => {
                self.poisoned = true;
                tracing::warn!(iteration = self.iteration + 1, error = %failure, "k-means iteration failed");
                return Err(failure.into());
            }
        };
        self.iteration += 1;
        self.stop_reason = self.abort_strategy.next(outcome.changed, outcome.shift, self.iteration);

        tracing::debug!(
            iteration = self.iteration,
            sse = %outcome.distsum,
            changed = outcome.changed,
            shift = %outcome.shift,
            assign_ms = outcome.assign_time.as_secs_f64() * 1000.0,
            update_ms = outcome.update_time.as_secs_f64() * 1000.0,
            "k-means iteration done"
        );
        if let Some(reason) = self.stop_reason {
            tracing::info!(iteration = self.iteration, sse = %outcome.distsum, reason = %reason, "k-means session finished");
        }

        Ok(self.snapshot(Some(outcome.distsum), Some(outcome.shift), outcome.changed,
                outcome.assign_time, outcome.update_time, outcome.total_time))
    }

    fn snapshot(&self, sse: Option<T>, shift: Option<T>, changed: usize,
                assign_time: Duration, update_time: Duration, total_time: Duration) -> IterationSnapshot<T> {
        IterationSnapshot {
            iteration: self.iteration,
            sse,
            shift,
            changed,
            assign_time,
            update_time,
            total_time,
            k: self.state.k,
            sample_dims: self.state.sample_dims,
            assignments: self.state.assignments.clone(),
            centroids: self.state.centroids.clone(),
            stop_reason: self.stop_reason,
        }
    }

    /// Cancel in-flight work and release the worker pool. Idempotent; also done on drop.
    pub fn dispose(&mut self) {
        if !self.engine.is_disposed() {
            tracing::debug!(iteration = self.iteration, "disposing k-means session");
        }
        self.engine.dispose();
    }

    /// Handle that aborts a running [`KMeansSession::advance`] from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.engine.cancel_handle()
    }

    pub fn state(&self) -> SessionState {
        if self.stop_reason.is_some() {
            SessionState::Finished
        } else if self.iteration == 0 {
            SessionState::Created
        } else {
            SessionState::Running
        }
    }

    /// Amount of completed iterations.
    pub fn iteration(&self) -> usize { self.iteration }
    pub fn k(&self) -> usize { self.state.k }
    pub fn sample_dims(&self) -> usize { self.state.sample_dims }
    pub fn sample_cnt(&self) -> usize { self.samples.len() }
    pub fn samples(&self) -> &'p [PointVector<T>] { self.samples }

    /// Copy of the current centroids [row-major].
    pub fn centroids(&self) -> Vec<T> {
        self.state.centroids.clone()
    }
}
impl<'p, T: Primitive> Drop for KMeansSession<'p, T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
impl<'p, T: Primitive> std::fmt::Debug for KMeansSession<'p, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansSession")
            .field("sample_cnt", &self.samples.len())
            .field("sample_dims", &self.state.sample_dims)
            .field("k", &self.state.k)
            .field("iteration", &self.iteration)
            .field("stop_reason", &self.stop_reason)
            .finish()
    }
}

//! # kmeans_session - API documentation
//!
//! kmeans_session is a small rust library for k-means clustering that is driven one iteration at a time.
//!
//! ## Design target
//! Instead of a single call that runs until convergence, a [`KMeansSession`] exposes every Lloyd
//! iteration on its own. Each call to [`KMeansSession::advance`] returns an immutable
//! [`IterationSnapshot`] with the iteration's error, phase timings, assignments and centroids,
//! so a caller can plot, store or pause between iterations, and stop whenever it wants.
//!
//! The assignment phase (the expensive part) is split into contiguous work-packets and runs on a
//! dedicated worker pool owned by the session. Centroid update and error calculation run on the
//! calling thread. The amount of threads never changes the result, only the wall-clock time.
//!
//! ## Stop reasons
//! A snapshot carries a [`StopReason`] once the session is finished:
//! - [`StopReason::MaxIter`]: the iteration limit is reached (wins over the other two)
//! - [`StopReason::NoChanges`]: no sample moved to another cluster
//! - [`StopReason::EpsReached`]: the summed centroid displacement dropped below epsilon
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_session::*;
//! use rand::prelude::*;
//!
//! fn main() {
//!     let (sample_cnt, sample_dims) = (2000, 8);
//!
//!     // Generate some random data
//!     let mut rnd = rand::rngs::StdRng::seed_from_u64(1337);
//!     let samples: Vec<PointVector<f64>> = (0..sample_cnt)
//!         .map(|i| PointVector::new(i, (0..sample_dims).map(|_| rnd.gen()).collect()))
//!         .collect();
//!
//!     let config = SessionConfig::build()
//!         .k(4)
//!         .max_iterations(100)
//!         .epsilon(1e-6)
//!         .thread_count(4)
//!         .build();
//!     let mut session = KMeansSession::new(&samples, config).unwrap();
//!     let outcome = driver::run_to_completion(&mut session, |s|
//!         println!("Iteration {} - Error: {:?} | {:.3} ms", s.iteration, s.sse, s.total_ms())).unwrap();
//!     session.dispose();
//!
//!     println!("Stopped: {:?}", outcome.last.stop_reason);
//!     println!("Cluster sizes: {:?}", outcome.metrics.size);
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeansSession`] struct. It borrows the samples (a slice of
//! [`PointVector`]) for its whole lifetime and is configured through [`SessionConfig::build`].
//! Initial centroids are sampled randomly from the samples, or passed in using
//! [`KMeansSession::with_centroids`].
//!
//! After the last iteration, [`ClusterMetricsResult`] derives per-cluster size, error, mean and
//! maximum distance from a snapshot. [`RunSummary`] aggregates timings over a run, and
//! [`driver::run_to_completion`] bundles all of it for callers that do not need to step manually.

#[macro_use] mod helpers;
mod memory;
mod error;
mod distances;
mod api;
mod assignment;
mod variants;
mod inits;
mod abort_strategy;
mod metrics;
mod summary;
pub mod driver;

pub use abort_strategy::StopReason;
pub use api::{IterationSnapshot, KMeansSession, PointVector, SessionConfig, SessionConfigBuilder, SessionState};
pub(crate) use api::KMeansState;
pub use assignment::CancelHandle;
pub use distances::{distance, squared_distance};
pub use driver::RunOutcome;
pub use error::{AssignmentFailure, KMeansError, Result};
pub use memory::Primitive;
pub use metrics::{cluster_metrics, ClusterMetricsResult};
pub use summary::RunSummary;

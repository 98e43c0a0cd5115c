//! Caller-side loop for sessions that should simply run until they stop.

use crate::{error::*, memory::*, ClusterMetricsResult, IterationSnapshot, KMeansSession, RunSummary};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Everything a finished run hands to persistence: the terminal snapshot, its cluster metrics and
/// the run's timing summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome<T: Primitive> {
    pub last: IterationSnapshot<T>,
    pub metrics: ClusterMetricsResult<T>,
    pub summary: RunSummary<T>,
}

/// Advance **session** until a snapshot carries a stop reason.
///
/// Every snapshot is passed to **iteration_done** before the next iteration starts (the hook for
/// plotting or storing per-iteration figures). The session is left undisposed; its owner decides.
///
/// ## Errors
/// The first failed [`KMeansSession::advance`] ends the run.
pub fn run_to_completion<T, F>(session: &mut KMeansSession<'_, T>, mut iteration_done: F) -> Result<RunOutcome<T>>
        where T: Primitive, F: FnMut(&IterationSnapshot<T>) {
    let start = Instant::now();
    let mut summary = RunSummary::default();
    let last = loop {
        let snapshot = session.advance()?;
        summary.record(&snapshot);
        iteration_done(&snapshot);
        if snapshot.is_finished() {
            break snapshot;
        }
    };
    summary.set_wall_time(start.elapsed());

    let metrics = ClusterMetricsResult::from_snapshot(session.samples(), &last);
    Ok(RunOutcome { last, metrics, summary })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{helpers::testing, SessionConfig, StopReason};

    #[test]
    fn runs_until_stop() {
        let samples = testing::blobs(4, &[0.0, 0.0, 20.0, 20.0, -20.0, 20.0], 2, 100, 1.0);
        let config = SessionConfig::build().k(3).max_iterations(100).epsilon(1e-6).thread_count(2).build();
        let mut session = KMeansSession::with_centroids(&samples, &[0.0, 1.0, 19.0, 20.0, -20.0, 21.0], config).unwrap();

        let mut seen = Vec::new();
        let outcome = run_to_completion(&mut session, |s| seen.push(s.iteration)).unwrap();
        session.dispose();

        assert_eq!(seen, (1..=outcome.last.iteration).collect::<Vec<_>>());
        assert!(matches!(outcome.last.stop_reason, Some(StopReason::NoChanges) | Some(StopReason::EpsReached)));
        assert_eq!(outcome.summary.iterations, outcome.last.iteration);
        assert_eq!(outcome.summary.stop_reason, outcome.last.stop_reason);
        assert_eq!(outcome.metrics.size, vec![100, 100, 100]);
        assert_approx_eq!(outcome.metrics.total_sse(), outcome.last.sse.unwrap(), 1e-9);
        assert!(outcome.summary.wall_time >= outcome.summary.iteration_time);
    }

    #[test]
    fn stops_at_iteration_limit() {
        let samples = testing::random_points(9, 500, 5);
        let config = SessionConfig::build().k(8).max_iterations(3).epsilon(1e-12).build();
        let mut session = KMeansSession::new(&samples, config).unwrap();

        let outcome = run_to_completion(&mut session, |_| {}).unwrap();
        assert!(outcome.last.iteration <= 3);
        assert_eq!(outcome.metrics.total_size(), 500);
    }

    #[test]
    fn failure_ends_run() {
        let samples = testing::random_points(9, 50, 2);
        let config = SessionConfig::build().k(2).build();
        let mut session = KMeansSession::new(&samples, config).unwrap();
        session.cancel_handle().cancel();

        let mut calls = 0;
        let res = run_to_completion(&mut session, |_| calls += 1);
        assert!(matches!(res, Err(KMeansError::AssignmentFailed(_))));
        assert_eq!(calls, 0);
    }
}

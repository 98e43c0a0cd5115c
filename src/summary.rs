use crate::{abort_strategy::StopReason, memory::*, IterationSnapshot};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregate timing of a whole run, accumulated from its snapshots.
///
/// Snapshots without an error value (the no-work [`StopReason::MaxIter`] ones) are not counted as iterations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary<T: Primitive> {
    pub iterations: usize,
    pub wall_time: Duration,
    pub assign_time: Duration,
    pub update_time: Duration,
    pub iteration_time: Duration,
    pub final_sse: Option<T>,
    pub stop_reason: Option<StopReason>,
}
impl<T: Primitive> RunSummary<T> {
    pub fn record(&mut self, snapshot: &IterationSnapshot<T>) {
        if snapshot.stop_reason.is_some() {
            self.stop_reason = snapshot.stop_reason;
        }
        if snapshot.sse.is_none() {
            return;
        }
        self.iterations += 1;
        self.assign_time += snapshot.assign_time;
        self.update_time += snapshot.update_time;
        self.iteration_time += snapshot.total_time;
        self.final_sse = snapshot.sse;
    }

    /// Wall time of the whole run, as measured by the caller (including time spent between iterations).
    pub fn set_wall_time(&mut self, wall_time: Duration) {
        self.wall_time = wall_time;
    }

    pub fn avg_iteration_time(&self) -> Duration { Self::avg(self.iteration_time, self.iterations) }
    pub fn avg_assign_time(&self) -> Duration { Self::avg(self.assign_time, self.iterations) }
    pub fn avg_update_time(&self) -> Duration { Self::avg(self.update_time, self.iterations) }

    fn avg(total: Duration, cnt: usize) -> Duration {
        match u32::try_from(cnt) {
            Ok(0) => Duration::ZERO,
            Ok(cnt) => total / cnt,
            Err(_) => Duration::from_secs_f64(total.as_secs_f64() / cnt as f64),
        }
    }
}

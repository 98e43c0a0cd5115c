use crate::memory::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a session stopped iterating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
	/// The configured iteration limit was reached.
	MaxIter,
	/// The assignment phase did not move a single sample.
	NoChanges,
	/// The summed centroid displacement dropped below epsilon.
	EpsReached,
}
impl StopReason {
	/// Stable code, as stored by run persistence.
	pub fn as_str(&self) -> &'static str {
		match self {
			StopReason::MaxIter => "MAX_ITER",
			StopReason::NoChanges => "NO_CHANGES",
			StopReason::EpsReached => "EPS_REACHED",
		}
	}
}
impl fmt::Display for StopReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}


/// Stop criteria of a session. Evaluated once per iteration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AbortStrategy<T: Primitive> {
	pub max_iterations: usize,
	pub epsilon: T,
}
impl<T: Primitive> AbortStrategy<T> {
	/// Checked before any work is done: the session already ran out of iterations.
	pub fn exhausted(&self, iteration: usize) -> bool {
		iteration >= self.max_iterations
	}

	/// Decide after a completed iteration.
	/// ## Arguments
	/// - **changed**: Amount of samples that moved to another cluster
	/// - **shift**: Summed displacement of all centroids
	/// - **iteration**: Iteration counter, already including the iteration just completed
	/// ## Returns
	/// - **None** if the calculation may continue
	pub fn next(&self, changed: usize, shift: T, iteration: usize) -> Option<StopReason> {
		if iteration >= self.max_iterations {
			Some(StopReason::MaxIter)
		} else if changed == 0 {
			Some(StopReason::NoChanges)
		} else if shift < self.epsilon {
			Some(StopReason::EpsReached)
		} else {
			None
		}
	}
}

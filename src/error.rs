use thiserror::Error;

/// Reason an assignment phase did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignmentFailure {
    #[error("cancelled while assigning samples")]
    Cancelled,
    #[error("assignment worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("session was disposed")]
    Disposed,
    #[error("session is unusable after an earlier failed iteration")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum KMeansError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("assignment failed: {0}")]
    AssignmentFailed(#[from] AssignmentFailure),
    #[error("failed to build assignment worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, KMeansError>;

impl KMeansError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        KMeansError::InvalidInput(msg.into())
    }

    /// Whether the session that produced this error must be discarded.
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(self, KMeansError::AssignmentFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(KMeansError::invalid("points empty").to_string(), "invalid input: points empty");
        let err: KMeansError = AssignmentFailure::Cancelled.into();
        assert_eq!(err.to_string(), "assignment failed: cancelled while assigning samples");
        assert!(err.is_fatal_for_session());
        assert!(!KMeansError::invalid("k").is_fatal_for_session());
    }
}

use thiserror::Error;

/// The reason a cancellable measured workload did not produce metrics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkloadError<E> {
    /// The workload ran to completion but reported a failure of its own.
    #[error("measured workload failed: {0}")]
    Failed(E),

    /// The workload was aborted before it completed.
    #[error("measured workload was cancelled")]
    Cancelled,
}

impl<E> WorkloadError<E> {
    /// Whether the workload was aborted rather than failing on its own.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the workload's own error, or `None` if the workload was cancelled.
    #[must_use]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Cancelled => None,
        }
    }
}

//! Error returned by the retry engine.

use crate::classify::{ClassifiedError, Classify, ErrorKind};

/// Outcome of a retried operation that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The last error returned by the operation, unchanged.
    #[error("{0}")]
    Failed(E),
    /// The cancel token fired before an attempt or during a backoff sleep.
    #[error("operation cancelled")]
    Cancelled,
}

impl<E> RetryError<E> {
    /// The operation's own error, or `None` if the loop was cancelled.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Failed(e) => Some(e),
            RetryError::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled)
    }
}

impl<E: Classify> Classify for RetryError<E> {
    fn classify(&self) -> ClassifiedError {
        match self {
            RetryError::Failed(e) => e.classify(),
            RetryError::Cancelled => ClassifiedError::new(ErrorKind::Unknown, "Request was cancelled."),
        }
    }
}

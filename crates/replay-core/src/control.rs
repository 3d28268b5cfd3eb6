//! Cancellation for in-flight I/O and backoff sleeps.
//!
//! A `CancellationToken` is handed to every network operation the core
//! starts (segment listing, stream probe, retry loops). Blocking curl
//! transfers check it from their progress callback; async code awaits
//! `cancelled()`. Session teardown and segment switches cancel the token
//! they own.

pub use tokio_util::sync::CancellationToken;

/// Error returned when an operation is stopped through its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// `?`-friendly check between steps of a cancellable operation.
pub trait CancelCheck {
    fn check(&self) -> Result<(), Cancelled>;
}

impl CancelCheck for CancellationToken {
    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

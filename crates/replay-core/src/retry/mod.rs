//! Retry and backoff.
//!
//! Wraps any network call in exponential backoff (1s, 2s, 4s, 4s, ...).
//! Retryability comes from the classifier (`network`, `timeout`, `server`)
//! unless the caller supplies its own predicate.

mod error;
mod handle;
mod policy;
mod run;

pub use error::RetryError;
pub use handle::RetryHandle;
pub use policy::{RetryDecision, RetryPolicy};
pub use run::{retry, RetryOptions};

//! Recorded segments: model, listing, polling and stream URLs.
//!
//! Lists are kept newest-first (`start_time` descending). Use
//! `chronological` for an ascending view.

mod http;
pub(crate) mod model;
mod poll;
mod resolver;

use std::future::Future;

use crate::api::ApiError;
use crate::control::CancellationToken;

pub use http::HttpSegmentApi;
pub use model::{chronological, Segment};
pub use poll::{PollOutcome, SegmentPoller};
pub use resolver::{ResolveError, StreamResolver};

/// Anything that can list a camera's segments, newest-first.
pub trait SegmentSource {
    fn list_segments(
        &self,
        camera_id: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Vec<Segment>, ApiError>> + Send;
}

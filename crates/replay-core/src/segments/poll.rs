//! Periodic refresh of the active camera's segment list.

use std::time::Duration;

use crate::api::ApiError;
use crate::classify::{ClassifiedError, Classify};
use crate::control::CancellationToken;

use super::model::Segment;
use super::SegmentSource;

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// No camera selected.
    Idle,
    /// New list stored; `changed` is false when it equals the previous one.
    Updated { count: usize, changed: bool },
    /// Fetch failed; the previous list is kept.
    Kept { error: ClassifiedError },
    Cancelled,
}

/// Holds the latest list for one camera.
///
/// A failed poll never clears the list; switching cameras always does.
#[derive(Debug)]
pub struct SegmentPoller<S> {
    source: S,
    interval: Duration,
    camera_id: Option<String>,
    segments: Vec<Segment>,
    last_error: Option<ClassifiedError>,
}

impl<S: SegmentSource> SegmentPoller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self {
            source,
            interval,
            camera_id: None,
            segments: Vec::new(),
            last_error: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn camera_id(&self) -> Option<&str> {
        self.camera_id.as_deref()
    }

    /// Newest-first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last_error(&self) -> Option<&ClassifiedError> {
        self.last_error.as_ref()
    }

    /// Select a camera. Returns true (and drops the old list) when it changed.
    pub fn set_camera(&mut self, camera_id: Option<&str>) -> bool {
        if self.camera_id.as_deref() == camera_id {
            return false;
        }
        self.camera_id = camera_id.map(str::to_string);
        self.segments.clear();
        self.last_error = None;
        true
    }

    pub async fn refresh(&mut self, cancel: &CancellationToken) -> PollOutcome {
        let Some(camera_id) = self.camera_id.clone() else {
            return PollOutcome::Idle;
        };
        match self.source.list_segments(&camera_id, cancel).await {
            Ok(segments) => {
                let changed = segments != self.segments;
                self.segments = segments;
                self.last_error = None;
                PollOutcome::Updated {
                    count: self.segments.len(),
                    changed,
                }
            }
            Err(ApiError::Cancelled) => PollOutcome::Cancelled,
            Err(e) => {
                let error = e.classify();
                tracing::warn!(camera_id = %camera_id, kind = %error.kind, "segment poll failed, keeping previous list: {}", e);
                self.last_error = Some(error.clone());
                PollOutcome::Kept { error }
            }
        }
    }
}

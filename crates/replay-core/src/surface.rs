//! Media playback surface contract.
//!
//! The surface is the browser-side (or any host) video element. The core
//! drives it through `MediaSurface` and receives its events as
//! `SurfaceEvent`s, delivered in emission order.

use serde::{Deserialize, Serialize};

/// How much media the surface has buffered around the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Enough data to make forward progress.
    pub fn can_progress(self) -> bool {
        self >= ReadyState::HaveFutureData
    }
}

/// Error code reported with a surface `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaErrorCode {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    LoadStart,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    Playing,
    Pause,
    Waiting,
    /// No forward progress although data was expected.
    Stalled,
    Seeking,
    Seeked,
    /// Periodic position report, in seconds.
    TimeUpdate(f64),
    Ended,
    Error(MediaErrorCode),
    Abort,
}

/// Operations the core performs on the surface. Implementations are
/// expected to emit the matching `SurfaceEvent`s asynchronously.
pub trait MediaSurface {
    fn play(&mut self);
    fn pause(&mut self);
    /// Re-read the current source (or reset the element if none).
    fn load(&mut self);
    /// `None` clears the source.
    fn set_source(&mut self, url: Option<&str>);
    fn source(&self) -> Option<&str>;
    fn position(&self) -> f64;
    fn set_position(&mut self, secs: f64);
    /// Media duration in seconds, if known.
    fn duration(&self) -> Option<f64>;
    fn ready_state(&self) -> ReadyState;
    fn is_paused(&self) -> bool;
    fn set_playback_rate(&mut self, rate: f64);
}

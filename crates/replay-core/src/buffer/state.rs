use serde::Serialize;

use crate::surface::MediaErrorCode;

/// Observable buffering status of the active surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferState {
    Idle,
    Seeking,
    Buffering,
    Playing,
    Stalled,
    Errored,
}

/// Playback-layer failure (not a transport error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum PlaybackError {
    #[error("media error: {0:?}")]
    Media(MediaErrorCode),
    #[error("playback stalled; {attempts} reload attempts made no progress")]
    Stall { attempts: u32 },
    /// The stream could not be reached or failed validation.
    #[error("stream unavailable")]
    Unavailable,
}

/// New `(state, loading)` pair; emitted only when either changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferChange {
    pub state: BufferState,
    /// Single indicator covering both seeking and buffering.
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BufferOutput {
    Changed(BufferChange),
    /// The source was reloaded to get out of a stall.
    Recovering { attempt: u32, position: f64 },
    /// Entered `Errored`.
    Failed(PlaybackError),
}

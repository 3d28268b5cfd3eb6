use serde::Serialize;

use crate::buffer::{BufferChange, PlaybackError};
use crate::control::CancellationToken;
use crate::loading_timeout::LoadingStage;
use crate::navigator::ChainDecision;
use crate::notice::Notice;

/// Ask the driver to probe `url`, then hand the result back with the same
/// `generation`.
///
/// `cancel` fires when the session moves to another segment or is torn
/// down; pass it to the probe so the transfer stops with it.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRequest {
    pub generation: u64,
    pub segment_id: i64,
    pub url: String,
    #[serde(skip)]
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnavailableReason {
    /// The segment's codec is only partially supported by the surface.
    Codec,
    Network,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SessionEvent {
    Buffer(BufferChange),
    Stage { stage: LoadingStage },
    /// A new source was bound to the surface.
    SegmentStarted { segment_id: i64 },
    Recovering { attempt: u32, position: f64 },
    PlaybackFailed { error: PlaybackError },
    LoadTimedOut { stage: LoadingStage },
    Unavailable { reason: UnavailableReason, message: String },
    Chain { decision: ChainDecision },
    Notice { notice: Notice },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("segment {0} is not in the current list")]
    UnknownSegment(i64),
    #[error("playback speed {0} is outside 0.25..=16")]
    InvalidSpeed(f64),
    #[error("session has been torn down")]
    TornDown,
}

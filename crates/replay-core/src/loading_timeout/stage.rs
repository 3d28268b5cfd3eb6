use serde::{Deserialize, Serialize};

/// Named phase of "waiting for the stream to become playable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStage {
    Connecting,
    Loading,
    Buffering,
    Playing,
    Error,
    Timeout,
}

impl LoadingStage {
    /// Terminal stages never re-arm the watchdog.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LoadingStage::Playing | LoadingStage::Error | LoadingStage::Timeout
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadingStage::Connecting => "connecting",
            LoadingStage::Loading => "loading",
            LoadingStage::Buffering => "buffering",
            LoadingStage::Playing => "playing",
            LoadingStage::Error => "error",
            LoadingStage::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for LoadingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

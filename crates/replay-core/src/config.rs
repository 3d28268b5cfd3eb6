use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::device::DeviceTier;
use crate::notice::Locale;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry.
    pub base_delay_ms: u64,
    /// Maximum backoff delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 4000,
        }
    }
}

/// Loading watchdog parameters (optional `[timeout]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Watchdog duration on low-tier devices.
    pub low_tier_ms: u64,
    /// Watchdog duration on every other tier.
    pub default_ms: u64,
    /// Consecutive timeouts before the max-failure escalation fires.
    pub max_consecutive_failures: u32,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            low_tier_ms: 15_000,
            default_ms: 10_000,
            max_consecutive_failures: 3,
        }
    }
}

impl TimeoutConfig {
    /// Zero durations or a zero failure threshold fall back to defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            low_tier_ms: nonzero_or(self.low_tier_ms, defaults.low_tier_ms),
            default_ms: nonzero_or(self.default_ms, defaults.default_ms),
            max_consecutive_failures: if self.max_consecutive_failures == 0 {
                defaults.max_consecutive_failures
            } else {
                self.max_consecutive_failures
            },
        }
    }

    pub fn duration_for(&self, tier: DeviceTier) -> Duration {
        match tier {
            DeviceTier::Low => Duration::from_millis(self.low_tier_ms),
            DeviceTier::Medium | DeviceTier::High => Duration::from_millis(self.default_ms),
        }
    }
}

/// Playback session parameters (optional `[playback]` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Largest allowed jump per seek, in seconds.
    pub max_seek_secs: f64,
    /// Chronological gaps above this many seconds produce a gap notice.
    pub gap_threshold_secs: f64,
    /// Buffering indicator is force-cleared this long after a seek completes.
    pub force_clear_buffering_ms: u64,
    /// Wait after a stall before checking readiness and reloading.
    pub stall_grace_ms: u64,
    /// Reload attempts per stall episode before giving up; 0 = unbounded.
    pub max_stall_recoveries: u32,
    /// Continue with the next segment when one ends.
    pub autoplay: bool,
    /// Streams smaller than this are rejected by validation.
    pub min_stream_bytes: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_seek_secs: 180.0,
            gap_threshold_secs: 30.0,
            force_clear_buffering_ms: 5_000,
            stall_grace_ms: 3_000,
            max_stall_recoveries: 5,
            autoplay: true,
            min_stream_bytes: 1024,
        }
    }
}

impl PlaybackConfig {
    /// Replace values the engine cannot use with their defaults: non-finite
    /// or out-of-range seconds, and zero timer durations.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let max_seek_secs = if self.max_seek_secs > 0.0 && as_duration(self.max_seek_secs).is_some() {
            self.max_seek_secs
        } else {
            defaults.max_seek_secs
        };
        let gap_threshold_secs = if self.gap_threshold_secs >= 0.0
            && as_duration(self.gap_threshold_secs).is_some()
        {
            self.gap_threshold_secs
        } else {
            defaults.gap_threshold_secs
        };
        Self {
            max_seek_secs,
            gap_threshold_secs,
            force_clear_buffering_ms: nonzero_or(
                self.force_clear_buffering_ms,
                defaults.force_clear_buffering_ms,
            ),
            stall_grace_ms: nonzero_or(self.stall_grace_ms, defaults.stall_grace_ms),
            ..self
        }
    }

    /// Gap threshold as a `Duration`; the default if the value is unusable.
    pub fn gap_threshold(&self) -> Duration {
        as_duration(self.gap_threshold_secs)
            .or_else(|| as_duration(Self::default().gap_threshold_secs))
            .unwrap_or_default()
    }

    pub fn stall_recovery_limit(&self) -> Option<u32> {
        (self.max_stall_recoveries > 0).then_some(self.max_stall_recoveries)
    }
}

fn nonzero_or(value: u64, default: u64) -> u64 {
    if value == 0 {
        default
    } else {
        value
    }
}

fn as_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_camera_cache_ttl_secs() -> u64 {
    60
}

/// Global configuration loaded from `~/.config/replay/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Base URL of the recording API, e.g. `http://nvr.local:8080`.
    pub api_base_url: String,
    /// Bearer token sent with API requests.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Segment list polling interval.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// How long a fetched camera list stays fresh.
    #[serde(default = "default_camera_cache_ttl_secs")]
    pub camera_cache_ttl_secs: u64,
    /// Language of user-facing notices.
    #[serde(default)]
    pub locale: Locale,
    /// Device tier override; detected from the host when missing.
    #[serde(default)]
    pub device_tier: Option<DeviceTier>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub timeout: Option<TimeoutConfig>,
    #[serde(default)]
    pub playback: Option<PlaybackConfig>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            api_token: None,
            poll_interval_secs: default_poll_interval_secs(),
            camera_cache_ttl_secs: default_camera_cache_ttl_secs(),
            locale: Locale::default(),
            device_tier: None,
            retry: None,
            timeout: None,
            playback: None,
        }
    }
}

impl ReplayConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.clone().unwrap_or_default().normalized()
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        self.playback.clone().unwrap_or_default().normalized()
    }

    pub fn device_tier(&self) -> DeviceTier {
        self.device_tier.unwrap_or_else(DeviceTier::detect)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn camera_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.camera_cache_ttl_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("replay")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ReplayConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ReplayConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<ReplayConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ReplayConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

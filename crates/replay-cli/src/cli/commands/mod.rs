//! CLI command handlers, one file per command.

mod cameras;
mod chain;
mod classify;
mod probe;
mod segments;
mod watch;

pub use cameras::run_cameras;
pub use chain::run_chain;
pub use classify::run_classify;
pub use probe::run_probe;
pub use segments::run_segments;
pub use watch::run_watch;

use anyhow::{Context, Result};
use replay_core::api::ApiClient;
use replay_core::config::ReplayConfig;
use replay_core::segments::{HttpSegmentApi, Segment};

pub(crate) fn client(cfg: &ReplayConfig) -> Result<ApiClient> {
    ApiClient::from_config(cfg).context("configuring API client")
}

pub(crate) fn segment_api(cfg: &ReplayConfig) -> Result<HttpSegmentApi> {
    Ok(HttpSegmentApi::new(client(cfg)?))
}

pub(crate) fn format_time(t: chrono::DateTime<chrono::Utc>) -> String {
    t.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub(crate) fn describe(segment: &Segment) -> String {
    format!(
        "#{} {} ({}, {:.0}s)",
        segment.id,
        segment.filename,
        format_time(segment.start_time),
        segment.duration
    )
}

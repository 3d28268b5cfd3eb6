//! `replay watch <camera>` – poll the segment list.

use anyhow::Result;
use replay_core::config::ReplayConfig;
use replay_core::control::CancellationToken;
use replay_core::segments::{PollOutcome, SegmentPoller};

use super::{describe, segment_api};

pub async fn run_watch(cfg: &ReplayConfig, camera: &str, count: Option<u32>) -> Result<()> {
    let mut poller = SegmentPoller::new(segment_api(cfg)?, cfg.poll_interval());
    poller.set_camera(Some(camera));
    let cancel = CancellationToken::new();
    let mut ticker = tokio::time::interval(poller.interval());
    let mut polls = 0u32;

    loop {
        ticker.tick().await;
        match poller.refresh(&cancel).await {
            PollOutcome::Updated { count, changed } => {
                if changed {
                    let newest = poller.segments().first().map(describe).unwrap_or_default();
                    println!("{count} segments, newest {newest}");
                } else {
                    println!("{count} segments, unchanged");
                }
            }
            PollOutcome::Kept { error } => {
                println!("poll failed ({}): {}; keeping {} segments", error.kind, error.message, poller.segments().len());
            }
            PollOutcome::Idle | PollOutcome::Cancelled => break,
        }
        polls += 1;
        if count.is_some_and(|n| polls >= n) {
            break;
        }
    }
    Ok(())
}

//! `replay chain <camera> <segment-id>` – what plays after a segment.

use anyhow::{Context, Result};
use replay_core::config::ReplayConfig;
use replay_core::control::CancellationToken;
use replay_core::navigator::{next_after, ChainDecision};
use replay_core::segments::SegmentSource;

use super::{describe, segment_api};

pub async fn run_chain(cfg: &ReplayConfig, camera: &str, segment_id: i64, autoplay: bool) -> Result<()> {
    let api = segment_api(cfg)?;
    let segments = api
        .list_segments(camera, &CancellationToken::new())
        .await
        .with_context(|| format!("listing segments for camera {camera}"))?;
    let current = segments
        .iter()
        .find(|s| s.id == segment_id)
        .with_context(|| format!("segment {segment_id} not found for camera {camera}"))?;

    let threshold = cfg.playback_config().gap_threshold();
    let decision = next_after(&segments, current, autoplay, threshold);

    println!("current: {}", describe(current));
    match &decision {
        ChainDecision::Next { segment } => println!("next:    {}", describe(segment)),
        ChainDecision::GapSkipped { segment, gap } => {
            println!("next:    {} after {:.0}s gap", describe(segment), gap.as_secs_f64())
        }
        ChainDecision::Stopped => println!("next:    (auto-play off)"),
        ChainDecision::Complete => println!("next:    (none, newest segment)"),
    }
    println!("notice:  {}", decision.notice(cfg.locale).message);
    Ok(())
}

//! `replay segments <camera>` – list segments with gaps.

use anyhow::{Context, Result};
use replay_core::config::ReplayConfig;
use replay_core::control::CancellationToken;
use replay_core::navigator::format_gap;
use replay_core::segments::{chronological, SegmentSource};

use super::{format_time, segment_api};

pub async fn run_segments(cfg: &ReplayConfig, camera: &str, json: bool) -> Result<()> {
    let api = segment_api(cfg)?;
    let segments = api
        .list_segments(camera, &CancellationToken::new())
        .await
        .with_context(|| format!("listing segments for camera {camera}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }
    if segments.is_empty() {
        println!("No segments for camera {camera}.");
        return Ok(());
    }

    let threshold = cfg.playback_config().gap_threshold();
    println!(
        "{:<8} {:<20} {:<20} {:>8} {:>12} {:<6} {}",
        "ID", "START", "END", "LEN(s)", "SIZE", "CODEC", "FILE"
    );
    let ordered = chronological(&segments);
    for (i, s) in ordered.iter().enumerate() {
        if i > 0 {
            let gap = ordered[i - 1].gap_until(s);
            if gap > threshold {
                println!("  -- gap {} --", format_gap(gap, cfg.locale));
            }
        }
        println!(
            "{:<8} {:<20} {:<20} {:>8.0} {:>12} {:<6} {}",
            s.id,
            format_time(s.start_time),
            format_time(s.end_time),
            s.duration,
            s.file_size,
            s.codec.as_deref().unwrap_or("-"),
            s.filename
        );
    }
    Ok(())
}

//! `replay probe <camera> <filename>` – HEAD a stream and validate it.

use std::time::Duration;

use anyhow::Result;
use replay_core::config::ReplayConfig;
use replay_core::control::CancellationToken;
use replay_core::probe::{probe_stream, validate_stream, ProbeError};
use replay_core::retry::{retry, RetryOptions};

use super::client;

pub async fn run_probe(cfg: &ReplayConfig, camera: &str, filename: &str) -> Result<()> {
    let client = client(cfg)?;
    let url = client.resolver().stream_url(camera, filename).to_string();
    let headers = client.headers();
    let cancel = CancellationToken::new();

    let options = RetryOptions::new()
        .cancel_token(cancel.clone())
        .on_retry(|attempt, delay: Duration, err: &ProbeError| {
            eprintln!("attempt {} failed ({}), retrying in {:?}", attempt + 1, err, delay);
        });
    let result = retry(client.retry_policy(), options, |_| {
        probe_stream(&url, headers.clone(), cancel.clone())
    })
    .await
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("url:            {url}");
    println!("status:         {}", result.status.map_or("-".to_string(), |s| s.to_string()));
    println!("content-type:   {}", result.content_type.as_deref().unwrap_or("-"));
    println!(
        "content-length: {}",
        result.content_length.map_or("-".to_string(), |n| n.to_string())
    );
    println!("seekable:       {}", if result.accept_ranges { "yes" } else { "no" });

    let min = cfg.playback_config().min_stream_bytes;
    match validate_stream(&result, 0, min) {
        Ok(()) => println!("valid:          yes"),
        Err(e) => anyhow::bail!("stream rejected: {e}"),
    }
    Ok(())
}

//! `replay cameras` – list cameras.

use anyhow::Result;
use replay_core::cameras::CameraCache;
use replay_core::config::ReplayConfig;
use replay_core::control::CancellationToken;

use super::client;

pub async fn run_cameras(cfg: &ReplayConfig) -> Result<()> {
    let client = client(cfg)?;
    let mut cache = CameraCache::new(cfg.camera_cache_ttl());
    let cameras = cache.get_or_fetch(&client, &CancellationToken::new()).await?;
    if cameras.is_empty() {
        println!("No cameras.");
        return Ok(());
    }
    println!("{:<12} {}", "ID", "NAME");
    for c in cameras {
        println!("{:<12} {}", c.id, c.name);
    }
    Ok(())
}

//! Camera list cache.
//!
//! The cache is process-local and explicit: the CLI (or a UI host) creates
//! one and passes it by reference to whatever needs the camera list.

use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::control::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// Accepts numeric or string ids from the API.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }
    Ok(match Id::deserialize(d)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[derive(Debug)]
pub struct CameraCache {
    ttl: Duration,
    entry: Option<(Instant, Vec<Camera>)>,
}

impl CameraCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cached list if it is younger than the TTL.
    pub fn get(&self, now: Instant) -> Option<&[Camera]> {
        match &self.entry {
            Some((fetched, cameras)) if now.saturating_duration_since(*fetched) < self.ttl => {
                Some(cameras)
            }
            _ => None,
        }
    }

    pub fn store(&mut self, now: Instant, cameras: Vec<Camera>) {
        self.entry = Some((now, cameras));
    }

    /// Drop the cached list (e.g. after a camera was added or removed).
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn find(&self, now: Instant, id: &str) -> Option<&Camera> {
        self.get(now)?.iter().find(|c| c.id == id)
    }

    /// Cached list, fetching through `client` when stale.
    pub async fn get_or_fetch(
        &mut self,
        client: &ApiClient,
        cancel: &CancellationToken,
    ) -> Result<&[Camera], ApiError> {
        let now = Instant::now();
        if self.get(now).is_none() {
            let cameras = client.list_cameras(cancel).await?;
            tracing::debug!(count = cameras.len(), "camera list refreshed");
            self.store(Instant::now(), cameras);
        }
        Ok(self.entry.as_ref().map(|(_, c)| c.as_slice()).unwrap_or(&[]))
    }
}

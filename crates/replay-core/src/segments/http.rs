//! Segment listing over the recording API.

use serde::Deserialize;

use crate::api::{ApiClient, ApiError};
use crate::control::CancellationToken;

use super::model::{sort_newest_first, Segment};
use super::SegmentSource;

/// The API returns either a bare array or `{ "segments": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentList {
    Bare(Vec<Segment>),
    Wrapped { segments: Vec<Segment> },
}

impl SegmentList {
    fn into_vec(self) -> Vec<Segment> {
        match self {
            SegmentList::Bare(s) | SegmentList::Wrapped { segments: s } => s,
        }
    }
}

/// `SegmentSource` backed by `GET {base}/api/cameras/{id}/segments`.
#[derive(Debug, Clone)]
pub struct HttpSegmentApi {
    client: ApiClient,
}

impl HttpSegmentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl SegmentSource for HttpSegmentApi {
    async fn list_segments(
        &self,
        camera_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Segment>, ApiError> {
        let url = self.client.resolver().segments_url(camera_id);
        let list: SegmentList = self.client.get_json(url, cancel).await?;
        let mut segments = list.into_vec();
        sort_newest_first(&mut segments);
        tracing::debug!(camera_id, count = segments.len(), "fetched segment list");
        Ok(segments)
    }
}

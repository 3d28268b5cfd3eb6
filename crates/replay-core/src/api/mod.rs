//! Recording API client.
//!
//! GET requests go through libcurl on the blocking pool, wrapped in the
//! retry engine. Failures are classified once, when they are converted into
//! `ApiError::Transport`.

pub(crate) mod request;

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::cameras::Camera;
use crate::classify::{ClassifiedError, Classify, ErrorKind, TransportFailure, DEFAULT_MESSAGE};
use crate::config::ReplayConfig;
use crate::control::{CancellationToken, Cancelled};
use crate::retry::{retry, RetryError, RetryOptions, RetryPolicy};
use crate::segments::{ResolveError, StreamResolver};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{url}: {error}")]
    Transport {
        url: String,
        failure: TransportFailure,
        error: ClassifiedError,
    },
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("request cancelled")]
    Cancelled,
    #[error("request worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub(crate) fn transport(url: &str, failure: TransportFailure) -> Self {
        let error = failure.classify();
        ApiError::Transport {
            url: url.to_string(),
            failure,
            error,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { failure, .. } => failure.status,
            _ => None,
        }
    }
}

impl From<Cancelled> for ApiError {
    fn from(_: Cancelled) -> Self {
        ApiError::Cancelled
    }
}

impl From<RetryError<ApiError>> for ApiError {
    fn from(e: RetryError<ApiError>) -> Self {
        e.into_inner().unwrap_or(ApiError::Cancelled)
    }
}

impl Classify for ApiError {
    fn classify(&self) -> ClassifiedError {
        match self {
            ApiError::Transport { error, .. } => error.clone(),
            ApiError::Decode { .. } | ApiError::Worker(_) => {
                ClassifiedError::new(ErrorKind::Unknown, DEFAULT_MESSAGE)
            }
            ApiError::Cancelled => ClassifiedError::new(ErrorKind::Unknown, "Request was cancelled."),
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CameraList {
    Bare(Vec<Camera>),
    Wrapped { cameras: Vec<Camera> },
}

/// Shared client state: endpoints, credentials and retry policy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    resolver: StreamResolver,
    token: Option<String>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(resolver: StreamResolver, token: Option<String>) -> Self {
        Self {
            resolver,
            token: token.filter(|t| !t.trim().is_empty()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(cfg: &ReplayConfig) -> Result<Self, ResolveError> {
        let resolver = StreamResolver::new(&cfg.api_base_url)?;
        Ok(Self::new(resolver, cfg.api_token.clone()).with_retry_policy(cfg.retry_policy()))
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn resolver(&self) -> &StreamResolver {
        &self.resolver
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Headers sent with every request; also used for stream probes.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(token) = &self.token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token.trim()));
        }
        headers
    }

    /// GET `url` as JSON, retrying transient failures.
    pub async fn get_json<T>(&self, url: Url, cancel: &CancellationToken) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let headers = self.headers();
        let target = url.to_string();
        let options = RetryOptions::new()
            .cancel_token(cancel.clone())
            .on_retry(move |attempt, delay: Duration, err: &ApiError| {
                tracing::debug!(url = %target, attempt, ?delay, "retrying GET: {}", err);
            });
        let value = retry(&self.retry, options, |_| {
            request::get_json(url.clone(), headers.clone(), cancel.clone())
        })
        .await?;
        Ok(value)
    }

    pub async fn list_cameras(&self, cancel: &CancellationToken) -> Result<Vec<Camera>, ApiError> {
        let list: CameraList = self.get_json(self.resolver.cameras_url(), cancel).await?;
        Ok(match list {
            CameraList::Bare(cameras) | CameraList::Wrapped { cameras } => cameras,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>) -> ApiClient {
        let resolver = StreamResolver::new("http://nvr.local").unwrap();
        ApiClient::new(resolver, token.map(str::to_string))
    }

    #[test]
    fn bearer_header_only_with_token() {
        assert!(!client(None).headers().contains_key("Authorization"));
        assert!(!client(Some("  ")).headers().contains_key("Authorization"));
        let headers = client(Some("abc")).headers();
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer abc"));
    }

    #[test]
    fn transport_errors_are_classified_once() {
        let err = ApiError::transport("http://nvr/api", TransportFailure::http(503));
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.classify().kind, ErrorKind::Server);
        assert!(err.classify().is_retryable());
        assert!(!ApiError::Cancelled.classify().is_retryable());
    }

    #[test]
    fn retry_error_unwraps_to_api_error() {
        let e: ApiError = RetryError::<ApiError>::Cancelled.into();
        assert!(matches!(e, ApiError::Cancelled));
        let e: ApiError = RetryError::Failed(ApiError::transport("u", TransportFailure::http(404))).into();
        assert_eq!(e.status(), Some(404));
    }

    #[test]
    fn camera_list_accepts_both_shapes() {
        let bare: CameraList = serde_json::from_str(r#"[{"id":"c1","name":"Gate"}]"#).unwrap();
        let wrapped: CameraList =
            serde_json::from_str(r#"{"cameras":[{"id":"c1","name":"Gate"}]}"#).unwrap();
        for list in [bare, wrapped] {
            let cameras = match list {
                CameraList::Bare(c) | CameraList::Wrapped { cameras: c } => c,
            };
            assert_eq!(cameras[0].name, "Gate");
        }
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client(None)
            .list_cameras(&cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }
}

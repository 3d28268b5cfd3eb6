//! Stream probing.
//!
//! Uses the curl crate (libcurl) to send a HEAD for a segment stream and
//! read `Content-Type` / `Content-Length` before the surface is bound. The
//! transfer is abortable through a `CancellationToken`.

mod parse;
mod validate;

use std::collections::HashMap;
use std::str;
use std::time::Duration;

use serde::Serialize;

use crate::api::request::apply_headers;
use crate::classify::{ClassifiedError, Classify, ErrorKind, TransportFailure, DEFAULT_MESSAGE};
use crate::control::{CancelCheck, CancellationToken, Cancelled};

pub use validate::{validate_stream, StreamValidationError, StreamValidationErrorKind};

/// Key headers of a stream HEAD response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub status: Option<u16>,
    pub content_type: Option<String>,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes` (required for seeking).
    pub accept_ranges: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe {url}: {error}")]
    Transport {
        url: String,
        failure: TransportFailure,
        error: ClassifiedError,
    },
    #[error("probe cancelled")]
    Cancelled,
    #[error("probe worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ProbeError {
    fn transport(url: &str, failure: TransportFailure) -> Self {
        let error = failure.classify();
        ProbeError::Transport {
            url: url.to_string(),
            failure,
            error,
        }
    }
}

impl From<Cancelled> for ProbeError {
    fn from(_: Cancelled) -> Self {
        ProbeError::Cancelled
    }
}

impl Classify for ProbeError {
    fn classify(&self) -> ClassifiedError {
        match self {
            ProbeError::Transport { error, .. } => error.clone(),
            ProbeError::Cancelled => ClassifiedError::new(ErrorKind::Unknown, "Request was cancelled."),
            ProbeError::Worker(_) => ClassifiedError::new(ErrorKind::Unknown, DEFAULT_MESSAGE),
        }
    }
}

/// Performs a HEAD request and returns parsed metadata.
///
/// Follows redirects. Runs in the current thread; use `probe_stream` from
/// async code.
pub fn probe_blocking(
    url: &str,
    custom_headers: &HashMap<String, String>,
    cancel: &CancellationToken,
) -> Result<ProbeResult, ProbeError> {
    let setup = |e: curl::Error| ProbeError::transport(url, TransportFailure::from_message(e.to_string()));
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(setup)?;
    easy.nobody(true).map_err(setup)?; // HEAD request
    easy.follow_location(true).map_err(setup)?;
    easy.connect_timeout(Duration::from_secs(10)).map_err(setup)?;
    easy.timeout(Duration::from_secs(15)).map_err(setup)?;
    easy.progress(true).map_err(setup)?;
    apply_headers(&mut easy, custom_headers).map_err(setup)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(setup)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(setup)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        return Err(ProbeError::transport(url, TransportFailure::from(&e)));
    }

    let code = easy.response_code().map_err(setup)?;
    if !(200..300).contains(&code) {
        let status = u16::try_from(code).unwrap_or(u16::MAX);
        return Err(ProbeError::transport(url, TransportFailure::http(status)));
    }

    let mut result = parse::parse_headers(&headers);
    result.status = u16::try_from(code).ok();
    Ok(result)
}

/// HEAD `url` on the blocking pool.
pub async fn probe_stream(
    url: &str,
    headers: HashMap<String, String>,
    cancel: CancellationToken,
) -> Result<ProbeResult, ProbeError> {
    cancel.check()?;
    let url = url.to_string();
    tokio::task::spawn_blocking(move || probe_blocking(&url, &headers, &cancel)).await?
}

//! Blocking libcurl GET with cancellation through the progress callback.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::classify::TransportFailure;
use crate::control::{CancelCheck, CancellationToken};

use super::ApiError;

/// Append `Name: value` headers to a curl handle.
pub(crate) fn apply_headers(
    easy: &mut curl::easy::Easy,
    headers: &HashMap<String, String>,
) -> Result<(), curl::Error> {
    if headers.is_empty() {
        return Ok(());
    }
    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    easy.http_headers(list)
}

/// Performs a GET and returns the body of a 2xx response.
///
/// Runs in the current thread; call from `spawn_blocking` in async code.
pub(crate) fn get_blocking(
    url: &str,
    headers: &HashMap<String, String>,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ApiError> {
    let setup = |e: curl::Error| ApiError::transport(url, TransportFailure::from_message(e.to_string()));

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(setup)?;
    easy.follow_location(true).map_err(setup)?;
    easy.max_redirections(10).map_err(setup)?;
    easy.connect_timeout(Duration::from_secs(10)).map_err(setup)?;
    easy.timeout(Duration::from_secs(30)).map_err(setup)?;
    easy.progress(true).map_err(setup)?;
    apply_headers(&mut easy, headers).map_err(setup)?;

    let mut body = Vec::new();
    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(setup)?;
        // Returning false aborts the transfer.
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(setup)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        return Err(ApiError::transport(url, TransportFailure::from(&e)));
    }

    let code = easy.response_code().map_err(setup)?;
    if !(200..300).contains(&code) {
        let status = u16::try_from(code).unwrap_or(u16::MAX);
        return Err(ApiError::transport(url, TransportFailure::http(status)));
    }
    Ok(body)
}

/// One GET attempt on the blocking pool, decoded as JSON.
pub(crate) async fn get_json<T>(
    url: Url,
    headers: HashMap<String, String>,
    cancel: CancellationToken,
) -> Result<T, ApiError>
where
    T: DeserializeOwned + Send + 'static,
{
    cancel.check()?;
    let url = url.to_string();
    let body = tokio::task::spawn_blocking({
        let url = url.clone();
        move || get_blocking(&url, &headers, &cancel)
    })
    .await??;
    serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
}

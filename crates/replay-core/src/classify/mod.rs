//! Error classification.
//!
//! Turns a raw `TransportFailure` into exactly one `ErrorKind` plus a
//! user-facing message. The rules form a priority-ordered decision list;
//! the first match wins:
//!
//! 1. request sent, no response: `timeout` when the transport code is an
//!    abort/timeout and the message mentions a timeout, otherwise `network`
//! 2. abort/timeout code with a timeout message: `timeout`
//! 3. status 504: `timeout`
//! 4. 401 `auth`, 403 `forbidden`, 404 `not-found`, 400/422 `validation`,
//!    429 `rate-limited`, 5xx `server`
//! 5. network-failure wording in the message: `network`
//! 6. `unknown`

mod failure;
mod kind;
mod messages;

pub use failure::{TransportCode, TransportFailure};
pub use kind::ErrorKind;
pub use messages::{status_message, DEFAULT_MESSAGE, MISSING_FAILURE_MESSAGE};

use serde::Serialize;

/// Result of classification: the only error shape the rest of the core sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status, if a response was received.
    pub status: Option<u16>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl std::fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {}): {}", self.kind, status, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ClassifiedError {}

/// Anything that can be reduced to a `ClassifiedError`.
///
/// Retry predicates are written against this trait so they only ever see
/// the classified form.
pub trait Classify {
    fn classify(&self) -> ClassifiedError;
}

impl Classify for ClassifiedError {
    fn classify(&self) -> ClassifiedError {
        self.clone()
    }
}

impl Classify for TransportFailure {
    fn classify(&self) -> ClassifiedError {
        classify(Some(self))
    }
}

const NETWORK_FAILURE_PHRASES: &[&str] = &[
    "connection refused",
    "couldn't connect",
    "could not connect",
    "could not resolve",
    "couldn't resolve",
    "dns",
    "name or service not known",
    "network error",
];

fn mentions_timeout(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}

fn mentions_network_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    NETWORK_FAILURE_PHRASES.iter().any(|p| lower.contains(p))
}

fn is_client_timeout(failure: &TransportFailure) -> bool {
    let coded = failure.code.is_some_and(TransportCode::is_abort_or_timeout);
    coded && failure.message.as_deref().is_some_and(mentions_timeout)
}

fn from_status(status: u16) -> Option<ErrorKind> {
    let kind = match status {
        504 => ErrorKind::Timeout,
        401 => ErrorKind::Auth,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        400 | 422 => ErrorKind::Validation,
        429 => ErrorKind::RateLimited,
        500..=599 => ErrorKind::Server,
        _ => return None,
    };
    Some(kind)
}

/// Classify an optional failure. `None` yields `unknown` with a generic
/// retry message rather than an error.
pub fn classify(failure: Option<&TransportFailure>) -> ClassifiedError {
    let Some(failure) = failure else {
        return ClassifiedError::new(ErrorKind::Unknown, MISSING_FAILURE_MESSAGE);
    };

    if failure.request_sent && !failure.response_received() {
        if is_client_timeout(failure) {
            return ClassifiedError::new(ErrorKind::Timeout, messages::TIMEOUT_MESSAGE);
        }
        return ClassifiedError::new(ErrorKind::Network, messages::NETWORK_MESSAGE);
    }

    if is_client_timeout(failure) {
        return ClassifiedError {
            kind: ErrorKind::Timeout,
            message: messages::TIMEOUT_MESSAGE.to_string(),
            status: failure.status,
        };
    }

    if let Some(status) = failure.status {
        if let Some(kind) = from_status(status) {
            return ClassifiedError {
                kind,
                message: status_message(status).to_string(),
                status: Some(status),
            };
        }
    }

    if failure.message.as_deref().is_some_and(mentions_network_failure) {
        return ClassifiedError {
            kind: ErrorKind::Network,
            message: messages::NETWORK_MESSAGE.to_string(),
            status: failure.status,
        };
    }

    ClassifiedError {
        kind: ErrorKind::Unknown,
        message: failure
            .status
            .map(status_message)
            .unwrap_or(DEFAULT_MESSAGE)
            .to_string(),
        status: failure.status,
    }
}

/// Classify a bare HTTP status; `None` means no response was received.
pub fn classify_status(status: Option<u16>) -> ClassifiedError {
    match status {
        Some(code) => classify(Some(&TransportFailure::http(code))),
        None => classify(Some(&TransportFailure::no_response(None, "network error"))),
    }
}

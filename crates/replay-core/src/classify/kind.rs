//! Closed set of error categories produced by the classifier.

use serde::{Deserialize, Serialize};

/// Category of a classified transport/API failure.
///
/// Business logic and retry predicates match on this, never on raw
/// status codes or transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Connection never completed (refused, DNS, offline).
    Network,
    /// Client-side timeout or gateway timeout (504).
    Timeout,
    /// 401: session missing or expired.
    Auth,
    /// 403: authenticated but not allowed.
    Forbidden,
    /// 400 / 422: request rejected as invalid.
    Validation,
    /// 404.
    NotFound,
    /// 429.
    RateLimited,
    /// 5xx other than 504.
    Server,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Whether the retry engine retries this category by default.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Server)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Auth => "auth",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not-found",
            ErrorKind::RateLimited => "rate-limited",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_categories() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::Server.is_retryable());
    }

    #[test]
    fn non_retryable_categories() {
        for kind in [
            ErrorKind::Auth,
            ErrorKind::Forbidden,
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::RateLimited,
            ErrorKind::Unknown,
        ] {
            assert!(!kind.is_retryable(), "{kind} should not be retried");
        }
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::RateLimited).unwrap();
        assert_eq!(json, "\"rate-limited\"");
        let back: ErrorKind = serde_json::from_str("\"not-found\"").unwrap();
        assert_eq!(back, ErrorKind::NotFound);
    }
}

//! Boundary value describing a raw transport failure.
//!
//! Every failure coming out of the HTTP layer is converted into a
//! `TransportFailure` once, right where it is received, and classified from
//! there. Nothing downstream inspects curl errors or status codes directly.

/// Transport-layer failure code, independent of the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCode {
    /// Aborted on the client side (callback abort, cancelled request).
    Aborted,
    /// Client-side connect/read timeout fired.
    TimedOut,
    ConnectionRefused,
    DnsFailure,
    Other,
}

impl TransportCode {
    /// Codes that the classifier treats as a possible client-side timeout.
    pub fn is_abort_or_timeout(self) -> bool {
        matches!(self, TransportCode::Aborted | TransportCode::TimedOut)
    }
}

/// A raw failure: any of status, transport code, and message may be absent.
///
/// A response existed iff `status` is `Some`. `request_sent` distinguishes
/// "sent but never answered" from failures before anything went out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: Option<u16>,
    pub code: Option<TransportCode>,
    pub message: Option<String>,
    pub request_sent: bool,
}

impl TransportFailure {
    /// The server answered with a non-success status.
    pub fn http(status: u16) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: None,
            request_sent: true,
        }
    }

    /// The request went out but no response came back.
    pub fn no_response(code: Option<TransportCode>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            code,
            message: Some(message.into()),
            request_sent: true,
        }
    }

    /// A failure known only by its message (e.g. raised before sending).
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: Some(message.into()),
            request_sent: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn response_received(&self) -> bool {
        self.status.is_some()
    }
}

impl From<&curl::Error> for TransportFailure {
    fn from(e: &curl::Error) -> Self {
        let code = if e.is_operation_timedout() {
            TransportCode::TimedOut
        } else if e.is_aborted_by_callback() {
            TransportCode::Aborted
        } else if e.is_couldnt_connect() {
            TransportCode::ConnectionRefused
        } else if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
            TransportCode::DnsFailure
        } else {
            TransportCode::Other
        };
        let mut message = e.description().to_string();
        if let Some(extra) = e.extra_description() {
            message.push_str(": ");
            message.push_str(extra);
        }
        Self::no_response(Some(code), message)
    }
}

impl From<curl::Error> for TransportFailure {
    fn from(e: curl::Error) -> Self {
        TransportFailure::from(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_has_response() {
        let f = TransportFailure::http(503);
        assert!(f.response_received());
        assert!(f.request_sent);
    }

    #[test]
    fn no_response_failure() {
        let f = TransportFailure::no_response(Some(TransportCode::TimedOut), "timeout of 10000ms");
        assert!(!f.response_received());
        assert!(f.request_sent);
        assert!(f.code.unwrap().is_abort_or_timeout());
    }

    #[test]
    fn curl_timeout_maps_to_timed_out_code() {
        // CURLE_OPERATION_TIMEDOUT = 28
        let e = curl::Error::new(28);
        let f = TransportFailure::from(&e);
        assert_eq!(f.code, Some(TransportCode::TimedOut));
        assert!(f.status.is_none());
    }

    #[test]
    fn curl_couldnt_connect_maps_to_refused() {
        // CURLE_COULDNT_CONNECT = 7
        let f = TransportFailure::from(curl::Error::new(7));
        assert_eq!(f.code, Some(TransportCode::ConnectionRefused));
    }
}

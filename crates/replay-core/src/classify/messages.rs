//! User-facing text for classified errors.

/// Used when nothing more specific is known. Never empty.
pub const DEFAULT_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Used when there is no failure value at all.
pub const MISSING_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

pub const NETWORK_MESSAGE: &str =
    "Unable to connect to the server. Check your network connection.";

pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";

/// Text for an HTTP status, falling back to `DEFAULT_MESSAGE` for codes
/// outside the table.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "The request was invalid. Please check your input.",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have permission to access this resource.",
        404 => "The requested resource was not found.",
        408 => TIMEOUT_MESSAGE,
        422 => "Some of the submitted data is invalid.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "A server error occurred. Please try again later.",
        502 => "The server is temporarily unreachable (bad gateway).",
        503 => "The service is temporarily unavailable. Please try again later.",
        504 => "The server took too long to respond.",
        _ => DEFAULT_MESSAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entries() {
        assert!(status_message(401).contains("session"));
        assert!(status_message(403).contains("permission"));
        assert!(status_message(500).contains("server error"));
    }

    #[test]
    fn codes_outside_table_use_default() {
        for code in [100, 204, 302, 418, 507, 599, 600, 750, 999] {
            assert_eq!(status_message(code), DEFAULT_MESSAGE);
        }
    }
}

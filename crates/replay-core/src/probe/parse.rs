//! Parse HTTP response header lines into a ProbeResult.

use super::ProbeResult;

/// Parse collected header lines. With redirects curl reports several
/// responses; only the last one counts.
pub(crate) fn parse_headers(lines: &[String]) -> ProbeResult {
    let mut result = ProbeResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            result = ProbeResult {
                status: line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|s| s.parse().ok()),
                ..ProbeResult::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    result.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-type") {
                result.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                result.accept_ranges = value.eq_ignore_ascii_case("bytes");
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_headers_type_and_length() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Type: video/mp4",
            "Content-Length: 52428800",
            "Accept-Ranges: bytes",
        ]));
        assert_eq!(r.status, Some(200));
        assert_eq!(r.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(r.content_length, Some(52_428_800));
        assert!(r.accept_ranges);
    }

    #[test]
    fn parse_headers_keeps_last_response_only() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: /other",
            "Content-Type: text/html",
            "Content-Length: 12",
            "",
            "HTTP/1.1 200 OK",
            "content-type: video/mp2t",
        ]));
        assert_eq!(r.status, Some(200));
        assert_eq!(r.content_type.as_deref(), Some("video/mp2t"));
        assert_eq!(r.content_length, None);
    }

    #[test]
    fn parse_headers_ignores_bad_length() {
        let r = parse_headers(&lines(&["Content-Length: lots"]));
        assert_eq!(r.content_length, None);
        assert!(!r.accept_ranges);
    }
}

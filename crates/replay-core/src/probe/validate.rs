//! Checks that a probed stream is something the surface can play.

use std::fmt;

use super::ProbeResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamValidationError {
    pub kind: StreamValidationErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamValidationErrorKind {
    /// Server answered with something other than `video/*`.
    NotVideo { content_type: String },
    /// Reported size is below the configured minimum.
    TooSmall { size: u64, min: u64 },
}

impl fmt::Display for StreamValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StreamValidationErrorKind::NotVideo { content_type } => {
                write!(f, "stream is not video (content type {content_type:?})")
            }
            StreamValidationErrorKind::TooSmall { size, min } => {
                write!(f, "stream too small: {size} bytes, expected at least {min}")
            }
        }
    }
}

impl std::error::Error for StreamValidationError {}

/// Returns Ok(()) if the probed stream looks playable.
///
/// A missing `Content-Type` is accepted. The size is taken from
/// `Content-Length` when present, otherwise from `listed_size` (the size in
/// the segment list).
pub fn validate_stream(
    probe: &ProbeResult,
    listed_size: u64,
    min_bytes: u64,
) -> Result<(), StreamValidationError> {
    if let Some(content_type) = &probe.content_type {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !mime.starts_with("video/") {
            return Err(StreamValidationError {
                kind: StreamValidationErrorKind::NotVideo {
                    content_type: content_type.clone(),
                },
            });
        }
    }

    let size = probe.content_length.unwrap_or(listed_size);
    if size < min_bytes {
        return Err(StreamValidationError {
            kind: StreamValidationErrorKind::TooSmall {
                size,
                min: min_bytes,
            },
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(content_type: Option<&str>, len: Option<u64>) -> ProbeResult {
        ProbeResult {
            status: Some(200),
            content_type: content_type.map(str::to_string),
            content_length: len,
            accept_ranges: true,
        }
    }

    #[test]
    fn accepts_video_streams() {
        assert!(validate_stream(&probe(Some("video/mp4"), Some(4096)), 0, 1024).is_ok());
        assert!(validate_stream(&probe(Some("Video/MP2T; charset=binary"), None), 2048, 1024).is_ok());
        assert!(validate_stream(&probe(None, Some(1024)), 0, 1024).is_ok());
    }

    #[test]
    fn rejects_non_video() {
        let err = validate_stream(&probe(Some("text/html"), Some(4096)), 0, 1024).unwrap_err();
        assert!(matches!(err.kind, StreamValidationErrorKind::NotVideo { .. }));
        assert!(err.to_string().contains("text/html"));
    }

    #[test]
    fn rejects_tiny_streams() {
        let err = validate_stream(&probe(Some("video/mp4"), Some(10)), 1_000_000, 1024).unwrap_err();
        assert_eq!(
            err.kind,
            StreamValidationErrorKind::TooSmall { size: 10, min: 1024 }
        );
        // Falls back to the listed size without Content-Length.
        assert!(validate_stream(&probe(Some("video/mp4"), None), 100, 1024).is_err());
    }
}

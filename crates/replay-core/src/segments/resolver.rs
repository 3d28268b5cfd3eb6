//! Builds API and stream URLs from the configured base.

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid API base URL {url:?}: {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL {0:?} cannot carry a path")]
    NotHierarchical(String),
}

/// Resolves camera and segment identifiers to URLs under the API base.
///
/// Identifiers are appended as path segments, so reserved characters in a
/// camera id or filename are percent-encoded rather than reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamResolver {
    base: Url,
}

impl StreamResolver {
    pub fn new(base: &str) -> Result<Self, ResolveError> {
        let base = Url::parse(base.trim()).map_err(|source| ResolveError::Parse {
            url: base.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ResolveError::NotHierarchical(base.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/api/cameras`
    pub fn cameras_url(&self) -> Url {
        self.join(&["api", "cameras"])
    }

    /// `{base}/api/cameras/{camera}/segments`
    pub fn segments_url(&self, camera_id: &str) -> Url {
        self.join(&["api", "cameras", camera_id, "segments"])
    }

    /// `{base}/api/cameras/{camera}/segments/{filename}/stream`
    pub fn stream_url(&self, camera_id: &str, filename: &str) -> Url {
        self.join(&["api", "cameras", camera_id, "segments", filename, "stream"])
    }

    fn join(&self, parts: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(parts);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_stream_url() {
        let r = StreamResolver::new("http://nvr.local:8080").unwrap();
        assert_eq!(
            r.stream_url("cam-1", "seg_0001.mp4").as_str(),
            "http://nvr.local:8080/api/cameras/cam-1/segments/seg_0001.mp4/stream"
        );
        assert_eq!(
            r.segments_url("cam-1").as_str(),
            "http://nvr.local:8080/api/cameras/cam-1/segments"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let r = StreamResolver::new("https://example.test/nvr/").unwrap();
        assert_eq!(
            r.cameras_url().as_str(),
            "https://example.test/nvr/api/cameras"
        );
    }

    #[test]
    fn encodes_reserved_characters() {
        let r = StreamResolver::new("http://nvr").unwrap();
        let url = r.stream_url("front door", "a/b?c.mp4");
        assert_eq!(
            url.as_str(),
            "http://nvr/api/cameras/front%20door/segments/a%2Fb%3Fc.mp4/stream"
        );
    }

    #[test]
    fn rejects_bad_base() {
        assert!(matches!(
            StreamResolver::new("not a url"),
            Err(ResolveError::Parse { .. })
        ));
        assert!(matches!(
            StreamResolver::new("mailto:ops@example.test"),
            Err(ResolveError::NotHierarchical(_))
        ));
    }
}

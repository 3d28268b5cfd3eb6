//! Recorded segment metadata as returned by the recording API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One fixed-length recording. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Length in seconds.
    pub duration: f64,
    pub file_size: u64,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

impl Segment {
    /// Time between the end of `self` and the start of `next`; overlaps are zero.
    pub fn gap_until(&self, next: &Segment) -> Duration {
        (next.start_time - self.end_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_partially_supported(&self) -> bool {
        self.codec
            .as_deref()
            .is_some_and(crate::codec::is_partially_supported)
    }
}

/// Oldest-first view of a newest-first list. The input is left untouched.
pub fn chronological(segments: &[Segment]) -> Vec<&Segment> {
    let mut view: Vec<&Segment> = segments.iter().collect();
    view.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    view
}

/// Sort a freshly fetched list newest-first, the canonical order.
pub(crate) fn sort_newest_first(segments: &mut [Segment]) {
    segments.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
}


#[cfg(test)]
mod tests {
    use super::fixtures::segment;
    use super::*;

    #[test]
    fn deserializes_api_json() {
        let json = r#"{
            "id": 7,
            "start_time": "2024-05-01T08:00:00Z",
            "end_time": "2024-05-01T08:10:00Z",
            "duration": 600.0,
            "file_size": 52428800,
            "filename": "cam1_0800.mp4"
        }"#;
        let s: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(s.id, 7);
        assert_eq!(s.duration, 600.0);
        assert!(s.codec.is_none());
        assert!(!s.is_partially_supported());
    }

    #[test]
    fn chronological_view_does_not_mutate() {
        let list = vec![segment(3, 20, 600), segment(2, 10, 600), segment(1, 0, 600)];
        let view = chronological(&list);
        let ids: Vec<i64> = view.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(list[0].id, 3);
    }

    #[test]
    fn gap_is_zero_for_overlap() {
        let a = segment(1, 0, 600);
        let b = segment(2, 5, 600);
        assert_eq!(a.gap_until(&b), Duration::ZERO);
        let c = segment(3, 11, 600);
        assert_eq!(a.gap_until(&c), Duration::from_secs(60));
    }

    #[test]
    fn hevc_segments_are_flagged() {
        let mut s = segment(1, 0, 600);
        s.codec = Some("H265".into());
        assert!(s.is_partially_supported());
    }
}

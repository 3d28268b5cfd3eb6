//! Segment chain navigation.
//!
//! Decides what plays after a segment ends. The list is newest-first, so
//! the chronological successor of index `i` is `i - 1`; index 0 is the
//! newest recording and ends the chain.

mod gap;

use std::time::Duration;

use serde::Serialize;

use crate::notice::{Locale, Notice};
use crate::segments::Segment;

pub use gap::format_gap;

/// Default gap above which the operator is told a jump happened.
pub const GAP_THRESHOLD: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum ChainDecision {
    /// Auto-play is off.
    Stopped,
    Next { segment: Segment },
    /// Successor starts more than the threshold after `current` ended.
    GapSkipped {
        segment: Segment,
        #[serde(rename = "gap_secs", serialize_with = "as_secs")]
        gap: Duration,
    },
    /// No newer segment.
    Complete,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl ChainDecision {
    pub fn segment(&self) -> Option<&Segment> {
        match self {
            ChainDecision::Next { segment } | ChainDecision::GapSkipped { segment, .. } => {
                Some(segment)
            }
            ChainDecision::Stopped | ChainDecision::Complete => None,
        }
    }

    pub fn notice(&self, locale: Locale) -> Notice {
        match self {
            ChainDecision::Stopped => Notice::stopped(locale),
            ChainDecision::Next { .. } => Notice::next(locale),
            ChainDecision::GapSkipped { gap, .. } => Notice::gap(locale, &format_gap(*gap, locale)),
            ChainDecision::Complete => Notice::complete(locale),
        }
    }
}

/// Chronological successor of `current` in a newest-first list.
///
/// If `current` is no longer in the list (it was refreshed), the successor
/// is the oldest segment that starts after `current` started.
pub fn successor<'a>(segments: &'a [Segment], current: &Segment) -> Option<&'a Segment> {
    match segments.iter().position(|s| s.id == current.id) {
        Some(0) => None,
        Some(index) => segments.get(index - 1),
        None => segments
            .iter()
            .filter(|s| s.start_time > current.start_time)
            .min_by_key(|s| s.start_time),
    }
}

/// What to do when `current` ends.
pub fn next_after(
    segments: &[Segment],
    current: &Segment,
    autoplay: bool,
    gap_threshold: Duration,
) -> ChainDecision {
    if !autoplay {
        return ChainDecision::Stopped;
    }
    let Some(next) = successor(segments, current) else {
        tracing::debug!(current = current.id, "no newer segment");
        return ChainDecision::Complete;
    };
    let gap = current.gap_until(next);
    if gap > gap_threshold {
        tracing::debug!(current = current.id, next = next.id, gap_secs = gap.as_secs_f64(), "gap before next segment");
        ChainDecision::GapSkipped {
            segment: next.clone(),
            gap,
        }
    } else {
        ChainDecision::Next {
            segment: next.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::segments::model::fixtures::segment;

    /// Newest-first: S3 (20:00), S2 (10:00), S1 (00:00), each 10 minutes.
    fn contiguous() -> Vec<Segment> {
        vec![segment(3, 20, 600), segment(2, 10, 600), segment(1, 0, 600)]
    }

    #[test]
    fn successor_is_previous_index() {
        let list = contiguous();
        assert_eq!(successor(&list, &list[2]).map(|s| s.id), Some(2));
        assert_eq!(successor(&list, &list[1]).map(|s| s.id), Some(3));
        assert_eq!(successor(&list, &list[0]), None);
    }

    #[test]
    fn contiguous_chain_plays_next() {
        let list = contiguous();
        let d = next_after(&list, &list[2], true, GAP_THRESHOLD);
        assert_eq!(d, ChainDecision::Next { segment: list[1].clone() });
        assert_eq!(d.notice(Locale::En).kind, NoticeKind::Next);
    }

    #[test]
    fn newest_segment_completes() {
        let list = contiguous();
        let d = next_after(&list, &list[0], true, GAP_THRESHOLD);
        assert_eq!(d, ChainDecision::Complete);
        assert_eq!(d.notice(Locale::En).kind, NoticeKind::Complete);
    }

    #[test]
    fn autoplay_off_stops() {
        let list = contiguous();
        let d = next_after(&list, &list[2], false, GAP_THRESHOLD);
        assert_eq!(d, ChainDecision::Stopped);
        assert!(d.segment().is_none());
    }

    #[test]
    fn gap_of_45_seconds_is_reported_as_one_minute() {
        // S1 ends 08:10:00, S2 starts 08:10:45.
        let s1 = segment(1, 0, 600);
        let mut s2 = segment(2, 10, 600);
        s2.start_time += chrono::Duration::seconds(45);
        s2.end_time += chrono::Duration::seconds(45);
        let list = vec![s2.clone(), s1.clone()];

        let d = next_after(&list, &s1, true, GAP_THRESHOLD);
        assert_eq!(
            d,
            ChainDecision::GapSkipped { segment: s2, gap: Duration::from_secs(45) }
        );
        let notice = d.notice(Locale::En);
        assert_eq!(notice.kind, NoticeKind::Gap);
        assert!(notice.message.contains("1 minute"));
        assert!(d.notice(Locale::Id).message.contains("1 menit"));
    }

    #[test]
    fn gap_at_threshold_is_not_reported() {
        let s1 = segment(1, 0, 600);
        let mut s2 = segment(2, 10, 600);
        s2.start_time += chrono::Duration::seconds(30);
        let list = vec![s2, s1.clone()];
        assert!(matches!(
            next_after(&list, &s1, true, GAP_THRESHOLD),
            ChainDecision::Next { .. }
        ));
    }

    #[test]
    fn missing_current_falls_back_to_start_time() {
        let list = contiguous();
        // Current segment vanished from a refreshed list; it started at 08:05.
        let gone = segment(99, 5, 300);
        assert_eq!(successor(&list, &gone).map(|s| s.id), Some(2));
        let newest = segment(100, 30, 600);
        assert_eq!(next_after(&list, &newest, true, GAP_THRESHOLD), ChainDecision::Complete);
    }

    #[test]
    fn serializes_decision_tag() {
        let list = contiguous();
        let json = serde_json::to_value(next_after(&list, &list[2], true, GAP_THRESHOLD)).unwrap();
        assert_eq!(json["decision"], "next");
        assert_eq!(json["segment"]["id"], 2);
    }
}

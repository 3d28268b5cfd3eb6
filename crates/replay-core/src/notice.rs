//! Transient notices surfaced to the operator (toasts).
//!
//! Notices are plain data. Auto-dismissal is the host UI's job; each notice
//! only carries the suggested display time.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Language of notice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    /// Bahasa Indonesia.
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    Gap,
    Next,
    Complete,
    Enabled,
    Disabled,
    Stopped,
    SeekLimited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(with = "ttl_millis")]
    pub ttl: Duration,
}

mod ttl_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

impl Notice {
    fn new(kind: NoticeKind, message: String) -> Self {
        let ttl = match kind {
            NoticeKind::Gap => Duration::from_secs(5),
            _ => Duration::from_secs(3),
        };
        Self { kind, message, ttl }
    }

    /// Next segment is being played after a gap of `gap` (already formatted).
    pub fn gap(locale: Locale, gap: &str) -> Self {
        let message = match locale {
            Locale::En => format!("Skipped a {gap} gap in the recording, playing the next segment"),
            Locale::Id => format!("Melewati jeda rekaman {gap}, memutar segmen berikutnya"),
        };
        Self::new(NoticeKind::Gap, message)
    }

    pub fn next(locale: Locale) -> Self {
        let message = match locale {
            Locale::En => "Playing the next segment".to_string(),
            Locale::Id => "Memutar segmen berikutnya".to_string(),
        };
        Self::new(NoticeKind::Next, message)
    }

    pub fn complete(locale: Locale) -> Self {
        let message = match locale {
            Locale::En => "Playback complete: no newer recordings".to_string(),
            Locale::Id => "Pemutaran selesai: tidak ada rekaman yang lebih baru".to_string(),
        };
        Self::new(NoticeKind::Complete, message)
    }

    pub fn autoplay(locale: Locale, enabled: bool) -> Self {
        let (kind, message) = match (enabled, locale) {
            (true, Locale::En) => (NoticeKind::Enabled, "Auto-play enabled"),
            (true, Locale::Id) => (NoticeKind::Enabled, "Putar otomatis diaktifkan"),
            (false, Locale::En) => (NoticeKind::Disabled, "Auto-play disabled"),
            (false, Locale::Id) => (NoticeKind::Disabled, "Putar otomatis dinonaktifkan"),
        };
        Self::new(kind, message.to_string())
    }

    pub fn stopped(locale: Locale) -> Self {
        let message = match locale {
            Locale::En => "Segment finished, auto-play is off".to_string(),
            Locale::Id => "Segmen selesai, putar otomatis nonaktif".to_string(),
        };
        Self::new(NoticeKind::Stopped, message)
    }

    pub fn seek_limited(locale: Locale, max_secs: f64) -> Self {
        let mins = (max_secs / 60.0).round().max(1.0) as u64;
        let message = match locale {
            Locale::En => format!("Seek limited to {mins} minutes at a time"),
            Locale::Id => format!("Lompatan dibatasi {mins} menit sekali geser"),
        };
        Self::new(NoticeKind::SeekLimited, message)
    }
}

//! Codec names attached to segments.

/// Codecs that most browser surfaces only decode on some platforms.
const PARTIALLY_SUPPORTED: &[&str] = &["hevc", "h265", "h.265", "hvc1", "hev1"];

/// True for HEVC / H.265 in any of its common spellings.
pub fn is_partially_supported(codec: &str) -> bool {
    let normalized = codec.trim().to_ascii_lowercase();
    PARTIALLY_SUPPORTED
        .iter()
        .any(|name| normalized == *name || normalized.starts_with(&format!("{name}.")))
}

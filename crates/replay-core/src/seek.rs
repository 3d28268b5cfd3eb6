//! Seek limiting.
//!
//! Long jumps inside a recorded segment make the decoder hunt for a distant
//! keyframe and stall. Every seek is clamped to at most `max_distance`
//! seconds from the anchor, and the anchor moves on every attempt so a
//! chain of requests cannot start from a stale position.

/// Default maximum jump per seek, in seconds.
pub const MAX_SEEK_SECS: f64 = 180.0;

/// Clamp `target` to within `max` of `previous`.
///
/// The clamped result never lies further than `max` from `previous`, even
/// when `previous + max` rounds outward.
pub fn clamp_seek(previous: f64, target: f64, max: f64) -> f64 {
    let delta = target - previous;
    if delta.abs() <= max {
        return target;
    }
    let mut out = previous + max.copysign(delta);
    while (out - previous).abs() > max {
        out = step_toward(out, previous);
    }
    out
}

/// Next representable `f64` after `x` in the direction of `toward`.
fn step_toward(x: f64, toward: f64) -> f64 {
    if x == toward || !x.is_finite() {
        return toward;
    }
    let up = toward > x;
    if x == 0.0 {
        let tiny = f64::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = x.to_bits();
    if (x > 0.0) == up {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekOutcome {
    /// Position to apply to the surface.
    pub position: f64,
    /// True when the request was clamped.
    pub limited: bool,
}

#[derive(Debug, Clone)]
pub struct SeekLimiter {
    anchor: f64,
    max_distance: f64,
}

impl Default for SeekLimiter {
    fn default() -> Self {
        Self::new(MAX_SEEK_SECS)
    }
}

impl SeekLimiter {
    pub fn new(max_distance: f64) -> Self {
        let max_distance = if max_distance.is_finite() && max_distance > 0.0 {
            max_distance
        } else {
            MAX_SEEK_SECS
        };
        Self {
            anchor: 0.0,
            max_distance,
        }
    }

    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Re-anchor without a seek (new segment bound, playback progressed).
    pub fn reset(&mut self, position: f64) {
        if position.is_finite() {
            self.anchor = position.max(0.0);
        }
    }

    /// Apply the limit to a seek request and move the anchor.
    ///
    /// Non-finite targets are ignored: the anchor is returned unchanged.
    pub fn request(&mut self, target: f64) -> SeekOutcome {
        if !target.is_finite() {
            return SeekOutcome {
                position: self.anchor,
                limited: false,
            };
        }
        let position = clamp_seek(self.anchor, target, self.max_distance);
        let limited = position != target;
        if limited {
            tracing::debug!(
                anchor = self.anchor,
                target,
                position,
                "seek limited"
            );
        }
        self.anchor = position;
        SeekOutcome { position, limited }
    }
}

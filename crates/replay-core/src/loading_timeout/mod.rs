//! Loading watchdog.
//!
//! Armed while a stream is expected to become playable. Each expiry counts
//! as a consecutive failure; reaching the configured threshold escalates.
//! The counter lives as long as the handler: `start_timeout` and
//! `clear_timeout` never reset it, and a new handler starts from zero.

mod stage;

use std::time::{Duration, Instant};

use crate::config::TimeoutConfig;
use crate::device::DeviceTier;
use crate::timer::{TimerId, TimerQueue};

pub use stage::LoadingStage;

/// Emitted by `poll` (and `record_failure`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutEvent {
    /// The watchdog expired while in `stage`.
    TimedOut { stage: LoadingStage },
    /// Consecutive failures reached the escalation threshold.
    MaxFailures { failures: u32 },
}

#[derive(Debug)]
pub struct LoadingTimeout {
    tier: DeviceTier,
    config: TimeoutConfig,
    timers: TimerQueue<LoadingStage>,
    armed: Option<TimerId>,
    stage: Option<LoadingStage>,
    consecutive_failures: u32,
    destroyed: bool,
}

impl LoadingTimeout {
    pub fn new(tier: DeviceTier, config: TimeoutConfig) -> Self {
        Self {
            tier,
            config,
            timers: TimerQueue::new(),
            armed: None,
            stage: None,
            consecutive_failures: 0,
            destroyed: false,
        }
    }

    pub fn with_defaults(tier: DeviceTier) -> Self {
        Self::new(tier, TimeoutConfig::default())
    }

    pub fn tier(&self) -> DeviceTier {
        self.tier
    }

    /// Watchdog length for this handler's device tier.
    pub fn duration(&self) -> Duration {
        self.config.duration_for(self.tier)
    }

    /// Cancel any pending watchdog and arm a new one for `stage`.
    pub fn start_timeout(&mut self, now: Instant, stage: LoadingStage) {
        if self.destroyed {
            return;
        }
        self.cancel_pending();
        self.stage = Some(stage);
        self.armed = Some(self.timers.schedule(now, self.duration(), stage));
        tracing::debug!(%stage, tier = ?self.tier, "loading watchdog armed");
    }

    /// Disarm without counting a failure.
    pub fn clear_timeout(&mut self) {
        if self.cancel_pending() {
            tracing::debug!(stage = ?self.stage, "loading watchdog cleared");
        }
    }

    /// Re-arm under a new stage. Only while armed, never for terminal stages.
    pub fn update_stage(&mut self, now: Instant, stage: LoadingStage) -> bool {
        if !self.is_timeout_active() || stage.is_terminal() {
            return false;
        }
        self.start_timeout(now, stage);
        true
    }

    /// Count a failure detected outside the watchdog. Returns `MaxFailures`
    /// when the counter is at or past the threshold.
    pub fn record_failure(&mut self) -> Option<TimeoutEvent> {
        if self.destroyed {
            return None;
        }
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.escalation()
    }

    /// Fire the watchdog if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<TimeoutEvent> {
        let mut events = Vec::new();
        if self.destroyed {
            return events;
        }
        while let Some((id, stage)) = self.timers.pop_expired(now) {
            if self.armed != Some(id) {
                continue;
            }
            self.armed = None;
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            tracing::warn!(
                %stage,
                failures = self.consecutive_failures,
                "stream did not become playable in time"
            );
            events.push(TimeoutEvent::TimedOut { stage });
            events.extend(self.escalation());
        }
        events
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.armed.and_then(|id| self.timers.deadline(id))
    }

    pub fn is_timeout_active(&self) -> bool {
        self.armed.is_some()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Stage of the most recent `start_timeout`.
    pub fn stage(&self) -> Option<LoadingStage> {
        self.stage
    }

    /// Cancel everything and leave the handler inert.
    pub fn destroy(&mut self) {
        self.cancel_pending();
        self.timers.clear();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn cancel_pending(&mut self) -> bool {
        match self.armed.take() {
            Some(id) => self.timers.cancel(id).is_some(),
            None => false,
        }
    }

    fn escalation(&self) -> Option<TimeoutEvent> {
        (self.consecutive_failures >= self.config.max_consecutive_failures).then_some(
            TimeoutEvent::MaxFailures {
                failures: self.consecutive_failures,
            },
        )
    }
}

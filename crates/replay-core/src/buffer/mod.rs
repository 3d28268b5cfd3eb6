//! Buffer / stall state machine for the active surface.
//!
//! Flags rather than a single enum: a seek is both "seeking" and
//! "buffering" until the surface confirms, and the UI shows one loading
//! indicator for either. The observable `BufferState` is derived with the
//! priority Errored > Stalled > Seeking > Buffering > Playing > Idle.
//!
//! Every transition is idempotent. Writers (surface events, the force-clear
//! timer, stall recovery) may overlap freely.

mod state;

use std::time::{Duration, Instant};

use crate::config::PlaybackConfig;
use crate::surface::{MediaSurface, SurfaceEvent};
use crate::timer::{TimerId, TimerQueue};

pub use state::{BufferChange, BufferOutput, BufferState, PlaybackError};

/// Forward progress smaller than this does not end a stall.
const PROGRESS_EPSILON_SECS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Buffering is force-cleared this long after `Seeked`.
    pub force_clear: Duration,
    /// Wait after a stall before checking readiness.
    pub stall_grace: Duration,
    /// Reloads per stall episode; `None` retries forever.
    pub max_recoveries: Option<u32>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for BufferConfig {
    fn from(cfg: &PlaybackConfig) -> Self {
        Self {
            force_clear: Duration::from_millis(cfg.force_clear_buffering_ms),
            stall_grace: Duration::from_millis(cfg.stall_grace_ms),
            max_recoveries: cfg.stall_recovery_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferTimer {
    ForceClear,
    StallGrace,
}

/// Error/abort suppression around a deliberate source clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suppress {
    Off,
    /// Source is being cleared.
    Clearing,
    /// New source bound; stale errors may still arrive until its LoadStart.
    UntilLoadStart,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRestore {
    position: f64,
    resume: bool,
}

#[derive(Debug)]
pub struct BufferMachine {
    config: BufferConfig,
    timers: TimerQueue<BufferTimer>,
    force_clear: Option<TimerId>,
    stall_grace: Option<TimerId>,
    seeking: bool,
    buffering: bool,
    playing: bool,
    stalled: bool,
    error: Option<PlaybackError>,
    suppress: Suppress,
    last_position: f64,
    resume_after_stall: bool,
    recoveries: u32,
    pending_restore: Option<PendingRestore>,
    last_reported: BufferChange,
}

impl BufferMachine {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            config,
            timers: TimerQueue::new(),
            force_clear: None,
            stall_grace: None,
            seeking: false,
            buffering: false,
            playing: false,
            stalled: false,
            error: None,
            suppress: Suppress::Off,
            last_position: 0.0,
            resume_after_stall: false,
            recoveries: 0,
            pending_restore: None,
            last_reported: BufferChange {
                state: BufferState::Idle,
                loading: false,
            },
        }
    }

    pub fn state(&self) -> BufferState {
        if self.error.is_some() {
            BufferState::Errored
        } else if self.stalled {
            BufferState::Stalled
        } else if self.seeking {
            BufferState::Seeking
        } else if self.buffering {
            BufferState::Buffering
        } else if self.playing {
            BufferState::Playing
        } else {
            BufferState::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.error.is_none() && (self.seeking || self.buffering)
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    pub fn error(&self) -> Option<PlaybackError> {
        self.error
    }

    /// Last position reported by the surface outside of a seek.
    pub fn last_position(&self) -> f64 {
        self.last_position
    }

    /// Reload attempts made in the current stall episode.
    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// A seek was requested: show loading until the surface is ready again.
    pub fn request_seek(&mut self, position: f64) -> Vec<BufferOutput> {
        self.cancel_timer(BufferTimer::ForceClear);
        self.seeking = true;
        self.buffering = true;
        if position.is_finite() {
            self.last_position = position;
        }
        self.report()
    }

    /// Called right before the session clears the surface source.
    pub fn begin_source_clear(&mut self) {
        self.timers.clear();
        self.force_clear = None;
        self.stall_grace = None;
        self.reset_flags();
        self.suppress = Suppress::Clearing;
        self.last_reported = BufferChange {
            state: BufferState::Idle,
            loading: false,
        };
    }

    /// A new source is bound. Errors stay suppressed until its LoadStart.
    pub fn source_bound(&mut self, start_position: f64) {
        self.reset_flags();
        self.last_position = start_position.max(0.0);
        self.suppress = Suppress::UntilLoadStart;
    }

    /// Enter `Errored` from outside the surface (e.g. stream validation).
    pub fn fail(&mut self, error: PlaybackError) -> Vec<BufferOutput> {
        if self.error.is_some() {
            return Vec::new();
        }
        self.enter_error(error)
    }

    pub fn handle_event<S: MediaSurface + ?Sized>(
        &mut self,
        now: Instant,
        event: SurfaceEvent,
        surface: &mut S,
    ) -> Vec<BufferOutput> {
        match event {
            SurfaceEvent::LoadStart => {
                if self.suppress == Suppress::UntilLoadStart {
                    self.suppress = Suppress::Off;
                }
                if self.suppress == Suppress::Off {
                    self.buffering = true;
                }
            }
            SurfaceEvent::LoadedMetadata => {
                if let Some(restore) = self.pending_restore.take() {
                    surface.set_position(restore.position);
                    if restore.resume {
                        surface.play();
                    }
                }
            }
            SurfaceEvent::LoadedData => {}
            SurfaceEvent::CanPlay => {
                self.buffering = false;
                self.cancel_timer(BufferTimer::ForceClear);
                if self.pending_restore.is_none() {
                    self.end_stall();
                }
            }
            SurfaceEvent::Playing => {
                self.playing = true;
                self.buffering = false;
                self.cancel_timer(BufferTimer::ForceClear);
                self.end_stall();
                self.recoveries = 0;
            }
            SurfaceEvent::Pause => {
                self.playing = false;
            }
            SurfaceEvent::Waiting => {
                self.buffering = true;
            }
            SurfaceEvent::Stalled => {
                if self.error.is_none() && self.suppress == Suppress::Off && !self.stalled {
                    self.stalled = true;
                    self.resume_after_stall = self.playing || !surface.is_paused();
                    tracing::warn!(position = self.last_position, "playback stalled");
                    self.arm(now, BufferTimer::StallGrace);
                }
            }
            SurfaceEvent::Seeking => {
                self.cancel_timer(BufferTimer::ForceClear);
                self.seeking = true;
                self.buffering = true;
            }
            SurfaceEvent::Seeked => {
                self.seeking = false;
                if self.buffering {
                    self.arm(now, BufferTimer::ForceClear);
                }
                self.last_position = surface.position();
            }
            SurfaceEvent::TimeUpdate(position) => {
                if position.is_finite() && !self.seeking {
                    if self.stalled && position > self.last_position + PROGRESS_EPSILON_SECS {
                        self.end_stall();
                    }
                    self.last_position = position;
                }
            }
            SurfaceEvent::Ended => {
                self.playing = false;
                self.buffering = false;
                self.seeking = false;
                self.end_stall();
            }
            SurfaceEvent::Error(code) => {
                if self.suppress != Suppress::Off {
                    tracing::debug!(?code, "ignoring media error from source clear");
                } else if self.error.is_none() {
                    return self.enter_error(PlaybackError::Media(code));
                }
            }
            SurfaceEvent::Abort => {
                tracing::debug!(suppressed = self.suppress != Suppress::Off, "media load aborted");
            }
        }
        self.report()
    }

    /// Fire due timers: force-clear and stall recovery.
    pub fn poll<S: MediaSurface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> Vec<BufferOutput> {
        let mut out = Vec::new();
        while let Some((id, timer)) = self.timers.pop_expired(now) {
            match timer {
                BufferTimer::ForceClear if self.force_clear == Some(id) => {
                    self.force_clear = None;
                    if !self.seeking && self.buffering {
                        tracing::debug!("force-clearing buffering indicator");
                        self.buffering = false;
                    }
                }
                BufferTimer::StallGrace if self.stall_grace == Some(id) => {
                    self.stall_grace = None;
                    out.extend(self.recover_stall(now, surface));
                }
                _ => {}
            }
        }
        out.extend(self.report());
        out
    }

    fn recover_stall<S: MediaSurface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> Vec<BufferOutput> {
        if !self.stalled || self.error.is_some() {
            return Vec::new();
        }
        if surface.ready_state().can_progress() {
            tracing::debug!("stall cleared on its own");
            self.end_stall();
            return Vec::new();
        }
        if let Some(max) = self.config.max_recoveries {
            if self.recoveries >= max {
                return self.enter_error(PlaybackError::Stall {
                    attempts: self.recoveries,
                });
            }
        }
        self.recoveries += 1;
        let position = self.last_position;
        let resume = self.resume_after_stall;
        tracing::info!(
            attempt = self.recoveries,
            position,
            resume,
            "reloading source to recover from stall"
        );
        self.pending_restore = Some(PendingRestore { position, resume });
        self.buffering = true;
        surface.load();
        self.arm(now, BufferTimer::StallGrace);
        vec![BufferOutput::Recovering {
            attempt: self.recoveries,
            position,
        }]
    }

    fn enter_error(&mut self, error: PlaybackError) -> Vec<BufferOutput> {
        tracing::warn!(%error, "playback errored");
        self.timers.clear();
        self.force_clear = None;
        self.stall_grace = None;
        self.error = Some(error);
        self.seeking = false;
        self.buffering = false;
        self.stalled = false;
        self.pending_restore = None;
        let mut out = vec![BufferOutput::Failed(error)];
        out.extend(self.report());
        out
    }

    fn end_stall(&mut self) {
        self.stalled = false;
        self.cancel_timer(BufferTimer::StallGrace);
    }

    fn reset_flags(&mut self) {
        self.seeking = false;
        self.buffering = false;
        self.playing = false;
        self.stalled = false;
        self.error = None;
        self.recoveries = 0;
        self.resume_after_stall = false;
        self.pending_restore = None;
    }

    fn arm(&mut self, now: Instant, timer: BufferTimer) {
        self.cancel_timer(timer);
        let delay = match timer {
            BufferTimer::ForceClear => self.config.force_clear,
            BufferTimer::StallGrace => self.config.stall_grace,
        };
        let id = self.timers.schedule(now, delay, timer);
        match timer {
            BufferTimer::ForceClear => self.force_clear = Some(id),
            BufferTimer::StallGrace => self.stall_grace = Some(id),
        }
    }

    fn cancel_timer(&mut self, timer: BufferTimer) {
        let slot = match timer {
            BufferTimer::ForceClear => &mut self.force_clear,
            BufferTimer::StallGrace => &mut self.stall_grace,
        };
        if let Some(id) = slot.take() {
            self.timers.cancel(id);
        }
    }

    fn report(&mut self) -> Vec<BufferOutput> {
        let current = BufferChange {
            state: self.state(),
            loading: self.is_loading(),
        };
        if current == self.last_reported {
            return Vec::new();
        }
        tracing::debug!(state = ?current.state, loading = current.loading, "buffer state changed");
        self.last_reported = current;
        vec![BufferOutput::Changed(current)]
    }
}

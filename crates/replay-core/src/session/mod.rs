//! Playback session controller.
//!
//! Owns one surface binding for one camera and wires the components
//! together: surface events feed the buffer machine and the loading
//! watchdog, `Ended` asks the navigator, seeks pass the seek limiter.
//!
//! The session performs no I/O. Selecting a segment returns a
//! `ProbeRequest`; the driver probes the URL and reports back through
//! `on_probe_result` with the request's generation. Any answer for an older
//! generation is dropped, so a slow probe can never bind a stale segment.
//! Switching segments or tearing down also cancels the outstanding
//! request's token.
//!
//! The previous binding is always released before a new one is acquired,
//! even when the new probe then fails.

mod events;

use std::time::{Duration, Instant};

use crate::buffer::{BufferConfig, BufferMachine, BufferOutput, BufferState, PlaybackError};
use crate::classify::{ClassifiedError, ErrorKind};
use crate::config::{PlaybackConfig, ReplayConfig};
use crate::control::CancellationToken;
use crate::loading_timeout::{LoadingStage, LoadingTimeout, TimeoutEvent};
use crate::navigator::next_after;
use crate::notice::{Locale, Notice};
use crate::probe::{validate_stream, ProbeResult};
use crate::seek::{SeekLimiter, SeekOutcome};
use crate::segments::{model::sort_newest_first, Segment, StreamResolver};
use crate::surface::{MediaSurface, SurfaceEvent};

pub use events::{ProbeRequest, SessionError, SessionEvent, UnavailableReason};

pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 16.0;

pub struct PlaybackSession<S: MediaSurface> {
    camera_id: String,
    surface: S,
    resolver: StreamResolver,
    locale: Locale,
    playback: PlaybackConfig,
    segments: Vec<Segment>,
    current: Option<Segment>,
    generation: u64,
    awaiting_probe: bool,
    /// Cancels the outstanding probe of the current generation.
    probe_cancel: Option<CancellationToken>,
    bound: bool,
    stage: Option<LoadingStage>,
    speed: f64,
    autoplay: bool,
    seek: SeekLimiter,
    buffer: BufferMachine,
    timeout: LoadingTimeout,
    events: Vec<SessionEvent>,
    torn_down: bool,
}

impl<S: MediaSurface> PlaybackSession<S> {
    pub fn new(
        config: &ReplayConfig,
        camera_id: impl Into<String>,
        surface: S,
        resolver: StreamResolver,
    ) -> Self {
        let playback = config.playback_config();
        Self {
            camera_id: camera_id.into(),
            surface,
            resolver,
            locale: config.locale,
            segments: Vec::new(),
            current: None,
            generation: 0,
            awaiting_probe: false,
            probe_cancel: None,
            bound: false,
            stage: None,
            speed: 1.0,
            autoplay: playback.autoplay,
            seek: SeekLimiter::new(playback.max_seek_secs),
            buffer: BufferMachine::new(BufferConfig::from(&playback)),
            timeout: LoadingTimeout::new(config.device_tier(), config.timeout_config()),
            playback,
            events: Vec::new(),
            torn_down: false,
        }
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stage(&self) -> Option<LoadingStage> {
        self.stage
    }

    pub fn buffer_state(&self) -> BufferState {
        self.buffer.state()
    }

    pub fn is_loading(&self) -> bool {
        self.buffer.is_loading()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Replace the segment list (sorted newest-first). The active segment
    /// keeps playing even if it is no longer listed.
    pub fn set_segments(&mut self, mut segments: Vec<Segment>) {
        if self.torn_down {
            return;
        }
        sort_newest_first(&mut segments);
        self.segments = segments;
    }

    /// Switch to segment `id`: release the current binding, arm the loading
    /// watchdog and ask for a probe.
    pub fn select_segment(&mut self, now: Instant, id: i64) -> Result<ProbeRequest, SessionError> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        let segment = self
            .segments
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(SessionError::UnknownSegment(id))?;
        Ok(self.begin_segment(now, segment))
    }

    /// Deliver the probe answered for `generation`.
    pub fn on_probe_result(
        &mut self,
        now: Instant,
        generation: u64,
        result: Result<ProbeResult, ClassifiedError>,
    ) {
        if self.torn_down || generation != self.generation || !self.awaiting_probe {
            tracing::debug!(generation, current = self.generation, "ignoring stale probe result");
            return;
        }
        self.awaiting_probe = false;
        self.probe_cancel = None;
        let Some(segment) = self.current.clone() else {
            return;
        };

        let checked = result.and_then(|probe| {
            validate_stream(&probe, segment.file_size, self.playback.min_stream_bytes)
                .map_err(|e| ClassifiedError::new(ErrorKind::Validation, e.to_string()))
        });
        match checked {
            Ok(()) => self.bind(now, &segment),
            Err(error) => {
                tracing::warn!(segment_id = segment.id, kind = %error.kind, "stream probe failed: {}", error.message);
                self.timeout.clear_timeout();
                self.set_stage(LoadingStage::Error);
                let outputs = self.buffer.fail(PlaybackError::Unavailable);
                self.push_buffer_outputs(outputs);
                let reason = self.unavailable_reason();
                self.events.push(SessionEvent::Unavailable {
                    reason,
                    message: error.message,
                });
            }
        }
    }

    /// Feed a surface event. Returns a probe request when the chain moves
    /// on to another segment.
    pub fn handle_event(&mut self, now: Instant, event: SurfaceEvent) -> Option<ProbeRequest> {
        if self.torn_down {
            return None;
        }
        let outputs = self.buffer.handle_event(now, event, &mut self.surface);
        self.push_buffer_outputs(outputs);
        if !self.bound {
            return None;
        }

        match event {
            SurfaceEvent::LoadedMetadata => {
                if self.timeout.update_stage(now, LoadingStage::Buffering) {
                    self.set_stage(LoadingStage::Buffering);
                }
            }
            SurfaceEvent::Playing => {
                self.timeout.clear_timeout();
                self.set_stage(LoadingStage::Playing);
            }
            SurfaceEvent::TimeUpdate(position) if !self.buffer.is_seeking() => {
                self.seek.reset(position);
            }
            SurfaceEvent::Ended => return self.advance(now),
            _ => {}
        }
        None
    }

    /// Seek within the active segment, limited to the maximum jump.
    pub fn seek(&mut self, target: f64) -> Option<SeekOutcome> {
        if self.torn_down || !self.bound {
            return None;
        }
        let mut outcome = self.seek.request(target);
        if let Some(duration) = self.surface.duration().filter(|d| d.is_finite()) {
            outcome.position = outcome.position.clamp(0.0, duration.max(0.0));
        } else {
            outcome.position = outcome.position.max(0.0);
        }
        self.seek.reset(outcome.position);
        if outcome.limited {
            self.events.push(SessionEvent::Notice {
                notice: Notice::seek_limited(self.locale, self.seek.max_distance()),
            });
        }
        self.surface.set_position(outcome.position);
        let outputs = self.buffer.request_seek(outcome.position);
        self.push_buffer_outputs(outputs);
        Some(outcome)
    }

    /// Playback rate, applied now and to every later binding.
    pub fn set_speed(&mut self, rate: f64) -> Result<(), SessionError> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        if !rate.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&rate) {
            return Err(SessionError::InvalidSpeed(rate));
        }
        self.speed = rate;
        if self.bound {
            self.surface.set_playback_rate(rate);
        }
        Ok(())
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        if self.torn_down || self.autoplay == enabled {
            return;
        }
        self.autoplay = enabled;
        tracing::info!(enabled, "auto-play toggled");
        self.events.push(SessionEvent::Notice {
            notice: Notice::autoplay(self.locale, enabled),
        });
    }

    /// Fire due timers (buffer force-clear, stall recovery, loading watchdog).
    pub fn poll(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        let outputs = self.buffer.poll(now, &mut self.surface);
        self.push_buffer_outputs(outputs);
        for event in self.timeout.poll(now) {
            self.push_timeout_event(event);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        match (self.buffer.next_deadline(), self.timeout.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time until `next_deadline`, for drivers that sleep by duration.
    pub fn time_until_deadline(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|d| d.saturating_duration_since(now))
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Release the surface and cancel every timer. Idempotent; nothing is
    /// emitted afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        tracing::info!(camera_id = %self.camera_id, "tearing down playback session");
        self.torn_down = true;
        self.generation += 1;
        self.awaiting_probe = false;
        self.release_binding();
        self.timeout.destroy();
        self.events.clear();
    }

    fn begin_segment(&mut self, now: Instant, segment: Segment) -> ProbeRequest {
        self.release_binding();
        self.generation += 1;
        self.awaiting_probe = true;
        self.seek.reset(0.0);
        let url = self
            .resolver
            .stream_url(&self.camera_id, &segment.filename)
            .to_string();
        tracing::info!(
            camera_id = %self.camera_id,
            segment_id = segment.id,
            generation = self.generation,
            "selecting segment"
        );
        let cancel = CancellationToken::new();
        self.probe_cancel = Some(cancel.clone());
        let request = ProbeRequest {
            generation: self.generation,
            segment_id: segment.id,
            url,
            cancel,
        };
        self.current = Some(segment);
        self.timeout.start_timeout(now, LoadingStage::Connecting);
        self.set_stage(LoadingStage::Connecting);
        request
    }

    fn bind(&mut self, now: Instant, segment: &Segment) {
        let url = self.resolver.stream_url(&self.camera_id, &segment.filename);
        self.buffer.source_bound(0.0);
        self.surface.set_source(Some(url.as_str()));
        self.surface.set_playback_rate(self.speed);
        self.surface.load();
        self.surface.play();
        self.bound = true;
        if self.timeout.update_stage(now, LoadingStage::Loading) {
            self.set_stage(LoadingStage::Loading);
        }
        self.events.push(SessionEvent::SegmentStarted {
            segment_id: segment.id,
        });
    }

    fn release_binding(&mut self) {
        if let Some(cancel) = self.probe_cancel.take() {
            tracing::debug!(generation = self.generation, "cancelling in-flight probe");
            cancel.cancel();
        }
        self.buffer.begin_source_clear();
        self.surface.pause();
        self.surface.set_source(None);
        self.surface.load();
        self.bound = false;
    }

    fn advance(&mut self, now: Instant) -> Option<ProbeRequest> {
        let current = self.current.clone()?;
        let threshold = self.playback.gap_threshold();
        let decision = next_after(&self.segments, &current, self.autoplay, threshold);
        self.events.push(SessionEvent::Notice {
            notice: decision.notice(self.locale),
        });
        let next = decision.segment().cloned();
        self.events.push(SessionEvent::Chain { decision });
        next.map(|segment| self.begin_segment(now, segment))
    }

    fn set_stage(&mut self, stage: LoadingStage) {
        if self.stage != Some(stage) {
            self.stage = Some(stage);
            self.events.push(SessionEvent::Stage { stage });
        }
    }

    fn unavailable_reason(&self) -> UnavailableReason {
        if self.current.as_ref().is_some_and(Segment::is_partially_supported) {
            UnavailableReason::Codec
        } else {
            UnavailableReason::Network
        }
    }

    fn push_buffer_outputs(&mut self, outputs: Vec<BufferOutput>) {
        for output in outputs {
            match output {
                BufferOutput::Changed(change) => self.events.push(SessionEvent::Buffer(change)),
                BufferOutput::Recovering { attempt, position } => {
                    self.events.push(SessionEvent::Recovering { attempt, position })
                }
                BufferOutput::Failed(error) => {
                    self.events.push(SessionEvent::PlaybackFailed { error });
                    // Probe failures report their own `Unavailable`.
                    if matches!(error, PlaybackError::Media(_) | PlaybackError::Stall { .. }) {
                        let escalated = self.timeout.record_failure().is_some();
                        tracing::warn!(%error, escalated, "playback failed on the surface");
                        self.report_unavailable();
                    }
                }
            }
        }
    }

    fn push_timeout_event(&mut self, event: TimeoutEvent) {
        match event {
            TimeoutEvent::TimedOut { stage } => {
                self.set_stage(LoadingStage::Timeout);
                self.events.push(SessionEvent::LoadTimedOut { stage });
            }
            TimeoutEvent::MaxFailures { failures } => {
                tracing::warn!(failures, "stream unavailable after repeated failures");
                self.report_unavailable();
            }
        }
    }

    fn report_unavailable(&mut self) {
        let reason = self.unavailable_reason();
        let message = match reason {
            UnavailableReason::Codec => {
                "This recording uses a codec this player cannot decode reliably."
            }
            UnavailableReason::Network => {
                "The recording could not be loaded. Check the connection and try again."
            }
        };
        self.events.push(SessionEvent::Unavailable {
            reason,
            message: message.to_string(),
        });
    }
}

impl<S: MediaSurface> Drop for PlaybackSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//! Playback Scheduler: play / pause / stop over a real-time audio clock.
//!
//! Scheduling is declarative: on every (re)start each path becomes a
//! [`VoicePlan`] handed to the backend ahead of time, all sharing one
//! origin so paths stay aligned. Pausing and stopping cancel those voices
//! outright, so a later `play` never replays stale automation.

use crate::config::SessionConfig;
use crate::drawing::{CanvasSize, DrawingState};
use crate::dsp::engine::{VoiceEngine, VoiceHandle};
use crate::dsp::voice::{PlanContext, VoicePlan, plan_voices};
use crate::error::{BackendError, MappingError};

/// The audio clock and voice host the scheduler drives.
pub trait AudioBackend {
    /// Clock time in seconds.
    fn current_time(&self) -> f64;

    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<(), BackendError>;

    fn start_voice(&mut self, plan: VoicePlan) -> VoiceHandle;

    /// Stop a voice and discard its pending automation.
    fn cancel_voice(&mut self, handle: VoiceHandle);
}

/// A backend fed by a pull-style audio callback (e.g. an AudioWorklet).
///
/// The clock only advances while blocks are processed, and starts
/// suspended until the first `resume`.
#[derive(Debug)]
pub struct LiveBackend {
    engine: VoiceEngine,
    suspended: bool,
}

impl LiveBackend {
    pub fn new(sample_rate: f64) -> Self {
        LiveBackend {
            engine: VoiceEngine::new(sample_rate),
            suspended: true,
        }
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn active_voices(&self) -> usize {
        self.engine.active_voices()
    }

    /// Fill one block of output. Silence, and no clock movement, while suspended.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        if self.suspended {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }
        self.engine.render(left, right);
    }
}

impl AudioBackend for LiveBackend {
    fn current_time(&self) -> f64 {
        self.engine.current_time()
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), BackendError> {
        if self.engine.sample_rate() <= 0.0 {
            return Err(BackendError::ResumeFailed {
                reason: format!("invalid sample rate {}", self.engine.sample_rate()),
            });
        }
        self.suspended = false;
        Ok(())
    }

    fn start_voice(&mut self, plan: VoicePlan) -> VoiceHandle {
        self.engine.start(plan)
    }

    fn cancel_voice(&mut self, handle: VoiceHandle) {
        self.engine.cancel(handle);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

/// Transport state plus the voices it started.
#[derive(Debug)]
pub struct PlaybackScheduler {
    state: TransportState,
    /// Clock time at which playback position 0 occurred (or would have).
    start_time: f64,
    /// Playback position frozen at the last pause; 0 when stopped.
    pause_time: f64,
    active: Vec<VoiceHandle>,
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        PlaybackScheduler {
            state: TransportState::Stopped,
            start_time: 0.0,
            pause_time: 0.0,
            active: Vec::new(),
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn pause_time(&self) -> f64 {
        self.pause_time
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn active_voices(&self) -> &[VoiceHandle] {
        &self.active
    }

    /// Seconds into the drawing at clock time `now`.
    pub fn position(&self, now: f64) -> f64 {
        match self.state {
            TransportState::Playing => now - self.start_time,
            TransportState::Paused | TransportState::Stopped => self.pause_time,
        }
    }

    /// Start or resume. A no-op while already playing.
    ///
    /// A suspended backend is resumed first; if that fails playback stays
    /// where it was and nothing is scheduled.
    pub fn play<B: AudioBackend>(
        &mut self,
        backend: &mut B,
        drawing: &DrawingState,
        canvas: CanvasSize,
        config: &SessionConfig,
    ) -> Result<(), MappingError> {
        if self.state == TransportState::Playing {
            return Ok(());
        }
        if backend.is_suspended() {
            if let Err(err) = backend.resume() {
                log::warn!("playback unavailable: {err}");
                return Ok(());
            }
        }

        let mapper = config.frequency_range.mapper(canvas.height)?;
        let now = backend.current_time();
        self.start_time = now - self.pause_time;
        self.state = TransportState::Playing;

        let ctx = PlanContext {
            mapper,
            waveform: config.waveform,
            max_x: drawing.max_x(),
            canvas_width: canvas.width,
            origin: now,
            offset: self.pause_time,
        };
        for plan in plan_voices(drawing.paths(), &ctx) {
            self.active.push(backend.start_voice(plan));
        }
        log::info!(
            "playing from {:.3}s with {} voices",
            self.pause_time,
            self.active.len()
        );
        Ok(())
    }

    /// Freeze the position and cancel every voice. A no-op unless playing.
    pub fn pause<B: AudioBackend>(&mut self, backend: &mut B) {
        if self.state != TransportState::Playing {
            return;
        }
        self.pause_time = backend.current_time() - self.start_time;
        self.state = TransportState::Paused;
        self.cancel_all(backend);
        log::info!("paused at {:.3}s", self.pause_time);
    }

    /// Cancel every voice and rewind. A no-op while stopped.
    pub fn stop<B: AudioBackend>(&mut self, backend: &mut B) {
        if self.state == TransportState::Stopped {
            return;
        }
        self.state = TransportState::Stopped;
        self.pause_time = 0.0;
        self.cancel_all(backend);
        log::info!("stopped");
    }

    fn cancel_all<B: AudioBackend>(&mut self, backend: &mut B) {
        for handle in self.active.drain(..) {
            backend.cancel_voice(handle);
        }
    }
}

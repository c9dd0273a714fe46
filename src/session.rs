//! Session: the one context object a UI drives.
//!
//! Owns the configuration, the drawing, the transport and the audio
//! backend. The UI calls these methods for pointer, transport, settings
//! and export events; nothing lives in globals.

use crate::config::{SessionConfig, parse_divisions_input, parse_frequency_input};
use crate::drawing::{CanvasSize, DrawingState, Path, Point};
use crate::dsp::oscillator::Waveform;
use crate::dsp::renderer::{self, WavExport};
use crate::error::{ConfigError, SketchError};
use crate::playback::{AudioBackend, PlaybackScheduler, TransportState};
use crate::tuning::{Guideline, LabelFormat, layout_guidelines};

/// A numeric setting the user can type into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericSetting {
    BaseFrequency,
    EdoDivisions,
    MinFrequency,
    MaxFrequency,
}

impl std::str::FromStr for NumericSetting {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseFrequency" => Ok(NumericSetting::BaseFrequency),
            "edoDivisions" => Ok(NumericSetting::EdoDivisions),
            "minFrequency" => Ok(NumericSetting::MinFrequency),
            "maxFrequency" => Ok(NumericSetting::MaxFrequency),
            _ => Err(ConfigError::UnknownSetting {
                name: s.to_string(),
            }),
        }
    }
}

pub struct Session<B: AudioBackend> {
    config: SessionConfig,
    canvas: CanvasSize,
    drawing: DrawingState,
    scheduler: PlaybackScheduler,
    backend: B,
}

impl<B: AudioBackend> Session<B> {
    pub fn new(canvas: CanvasSize, config: SessionConfig, backend: B) -> Result<Self, SketchError> {
        config.validate()?;
        config.frequency_range.mapper(canvas.height)?;
        Ok(Session {
            config,
            canvas,
            drawing: DrawingState::new(),
            scheduler: PlaybackScheduler::new(),
            backend,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn transport_state(&self) -> TransportState {
        self.scheduler.state()
    }

    /// Seconds into the drawing right now.
    pub fn position(&self) -> f64 {
        self.scheduler.position(self.backend.current_time())
    }

    // ── Pointer input ───────────────────────────────────────

    pub fn on_pointer_down(&mut self, x: f64, y: f64) {
        self.drawing.begin_stroke(Point::new(x, y));
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.drawing.extend_stroke(Point::new(x, y));
    }

    /// Pointer up or leaving the canvas.
    pub fn on_pointer_up(&mut self) -> bool {
        self.drawing.end_stroke()
    }

    /// Store a whole stroke at once.
    pub fn on_stroke_complete(&mut self, path: Path) {
        if !path.is_empty() {
            self.drawing.commit(path);
        }
    }

    pub fn on_clear(&mut self) {
        self.scheduler.stop(&mut self.backend);
        self.drawing.clear();
    }

    // ── Transport ───────────────────────────────────────────

    pub fn on_play(&mut self) -> Result<(), SketchError> {
        self.scheduler
            .play(&mut self.backend, &self.drawing, self.canvas, &self.config)?;
        Ok(())
    }

    pub fn on_pause(&mut self) {
        self.scheduler.pause(&mut self.backend);
    }

    pub fn on_stop(&mut self) {
        self.scheduler.stop(&mut self.backend);
    }

    // ── Export ──────────────────────────────────────────────

    /// Render from the start and encode. `None` when nothing has been drawn.
    pub fn on_export_requested(&self) -> Result<Option<WavExport>, SketchError> {
        Ok(renderer::export_wav(&self.drawing, self.canvas, &self.config)?)
    }

    // ── Settings ────────────────────────────────────────────

    /// Apply a typed numeric edit. On rejection nothing changes and the
    /// error carries the message to show.
    pub fn edit_numeric(&mut self, setting: NumericSetting, text: &str) -> Result<(), ConfigError> {
        let result = match setting {
            NumericSetting::BaseFrequency => parse_frequency_input(text)
                .and_then(|value| self.config.tuning.set_base_frequency(value)),
            NumericSetting::EdoDivisions => parse_divisions_input(text)
                .and_then(|value| self.config.tuning.set_edo_divisions(value)),
            NumericSetting::MinFrequency => parse_frequency_input(text)
                .and_then(|value| self.config.frequency_range.set_min_freq(value)),
            NumericSetting::MaxFrequency => parse_frequency_input(text)
                .and_then(|value| self.config.frequency_range.set_max_freq(value)),
        };
        if let Err(err) = &result {
            log::warn!("rejected {setting:?} edit '{text}': {err}");
        }
        result
    }

    /// The value the UI should show for `setting`, e.g. after a rejected edit.
    pub fn current_value(&self, setting: NumericSetting) -> f64 {
        match setting {
            NumericSetting::BaseFrequency => self.config.tuning.base_frequency,
            NumericSetting::EdoDivisions => self.config.tuning.edo_divisions as f64,
            NumericSetting::MinFrequency => self.config.frequency_range.min_freq,
            NumericSetting::MaxFrequency => self.config.frequency_range.max_freq,
        }
    }

    /// Takes effect from the next `play`.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.config.waveform = waveform;
    }

    pub fn set_show_octaves(&mut self, show: bool) {
        self.config.guidelines.show_octaves = show;
    }

    pub fn set_show_edo(&mut self, show: bool) {
        self.config.guidelines.show_edo = show;
    }

    pub fn set_show_edo_labels(&mut self, show: bool) {
        self.config.guidelines.show_edo_labels = show;
    }

    pub fn set_label_format(&mut self, format: LabelFormat) {
        self.config.guidelines.label_format = format;
    }

    pub fn guidelines(&self) -> Result<Vec<Guideline>, SketchError> {
        Ok(layout_guidelines(
            &self.config.tuning,
            &self.config.frequency_range,
            &self.config.guidelines,
            self.canvas.height,
        )?)
    }
}

pub mod config;
pub mod drawing;
pub mod dsp;
pub mod error;
pub mod mapping;
pub mod playback;
pub mod session;
pub mod tuning;

use std::fmt::Display;

use wasm_bindgen::prelude::*;

use crate::config::SessionConfig;
use crate::drawing::CanvasSize;
use crate::dsp::renderer::EXPORT_FILE_NAME;
use crate::playback::{AudioBackend, LiveBackend, TransportState};
use crate::session::{NumericSetting, Session};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed: return the crate version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: frequency at canvas row `y`.
#[wasm_bindgen(js_name = yToFrequency)]
pub fn y_to_frequency(y: f64, canvas_height: f64, min_freq: f64, max_freq: f64) -> Result<f64, JsValue> {
    mapping::y_to_frequency(y, canvas_height, min_freq, max_freq).map_err(js_error)
}

/// WASM-exposed: canvas row of `freq`, or `undefined` for non-positive input.
#[wasm_bindgen(js_name = frequencyToY)]
pub fn frequency_to_y(
    freq: f64,
    canvas_height: f64,
    min_freq: f64,
    max_freq: f64,
) -> Result<Option<f64>, JsValue> {
    mapping::frequency_to_y(freq, canvas_height, min_freq, max_freq).map_err(js_error)
}

#[wasm_bindgen(js_name = octaveFrequencies)]
pub fn octave_frequencies(base_freq: f64, min_freq: f64, max_freq: f64) -> Vec<f64> {
    tuning::octave_frequencies(base_freq, min_freq, max_freq)
}

#[wasm_bindgen(js_name = edoStepFrequencies)]
pub fn edo_step_frequencies(octave_base_freq: f64, divisions: u32) -> Vec<f64> {
    tuning::edo_step_frequencies(octave_base_freq, divisions)
}

/// WASM-exposed drawing session, driven by the page's pointer, control and
/// AudioWorklet callbacks.
#[wasm_bindgen]
pub struct Sketchpad {
    session: Session<LiveBackend>,
}

#[wasm_bindgen]
impl Sketchpad {
    /// `config_json` may be omitted for defaults; see `SessionConfig` for the shape.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_width: f64,
        canvas_height: f64,
        sample_rate: f64,
        config_json: Option<String>,
    ) -> Result<Sketchpad, JsValue> {
        let config = match config_json {
            Some(json) => SessionConfig::from_json(&json).map_err(js_error)?,
            None => SessionConfig::default(),
        };
        let session = Session::new(
            CanvasSize::new(canvas_width, canvas_height),
            config,
            LiveBackend::new(sample_rate),
        )
        .map_err(js_error)?;
        Ok(Sketchpad { session })
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.session.on_pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.session.on_pointer_move(x, y);
    }

    /// Pointer up or leave. Returns whether a stroke was stored.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> bool {
        self.session.on_pointer_up()
    }

    /// Committed paths as `[[{x, y}, ...], ...]`, for redrawing the canvas.
    pub fn paths(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.session.drawing().paths()).map_err(js_error)
    }

    pub fn clear(&mut self) {
        self.session.on_clear();
    }

    pub fn play(&mut self) -> Result<(), JsValue> {
        self.session.on_play().map_err(js_error)
    }

    pub fn pause(&mut self) {
        self.session.on_pause();
    }

    pub fn stop(&mut self) {
        self.session.on_stop();
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.session.transport_state() == TransportState::Playing
    }

    /// Seconds into the drawing.
    pub fn position(&self) -> f64 {
        self.session.position()
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.session.backend().current_time()
    }

    /// Fill one AudioWorklet block.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.session.backend_mut().process(left, right);
    }

    /// Apply a typed edit to `baseFrequency`, `edoDivisions`, `minFrequency`
    /// or `maxFrequency`. Rejections throw the message to show; the value
    /// to restore is available from `currentValue`.
    #[wasm_bindgen(js_name = editSetting)]
    pub fn edit_setting(&mut self, name: &str, text: &str) -> Result<(), JsValue> {
        let setting: NumericSetting = name.parse().map_err(js_error)?;
        self.session.edit_numeric(setting, text).map_err(js_error)
    }

    #[wasm_bindgen(js_name = currentValue)]
    pub fn current_value(&self, name: &str) -> Result<f64, JsValue> {
        let setting: NumericSetting = name.parse().map_err(js_error)?;
        Ok(self.session.current_value(setting))
    }

    #[wasm_bindgen(js_name = setWaveform)]
    pub fn set_waveform(&mut self, name: &str) -> Result<(), JsValue> {
        self.session.set_waveform(name.parse().map_err(js_error)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = setShowOctaves)]
    pub fn set_show_octaves(&mut self, show: bool) {
        self.session.set_show_octaves(show);
    }

    #[wasm_bindgen(js_name = setShowEdo)]
    pub fn set_show_edo(&mut self, show: bool) {
        self.session.set_show_edo(show);
    }

    #[wasm_bindgen(js_name = setShowEdoLabels)]
    pub fn set_show_edo_labels(&mut self, show: bool) {
        self.session.set_show_edo_labels(show);
    }

    /// `"hz"` or `"cents"`.
    #[wasm_bindgen(js_name = setLabelFormat)]
    pub fn set_label_format(&mut self, name: &str) -> Result<(), JsValue> {
        self.session.set_label_format(name.parse().map_err(js_error)?);
        Ok(())
    }

    /// Guidelines as `[{kind, frequency, y, label}, ...]`.
    pub fn guidelines(&self) -> Result<JsValue, JsValue> {
        let lines = self.session.guidelines().map_err(js_error)?;
        serde_wasm_bindgen::to_value(&lines).map_err(js_error)
    }

    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Result<String, JsValue> {
        self.session.config().to_json().map_err(js_error)
    }

    /// Render the drawing to WAV bytes; `undefined` when nothing is drawn.
    #[wasm_bindgen(js_name = exportWav)]
    pub fn export_wav(&self) -> Result<Option<Vec<u8>>, JsValue> {
        let export = self.session.on_export_requested().map_err(js_error)?;
        Ok(export.map(|wav| wav.bytes))
    }

    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name() -> String {
        EXPORT_FILE_NAME.to_string()
    }
}

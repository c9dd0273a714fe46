//! Session configuration and validated edits.
//!
//! Every user-editable number goes through a setter that either applies the
//! new value or returns a [`ConfigError`] and leaves the previous value in
//! place, so a rejected edit never leaves partial state behind.

use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::error::{ConfigError, MappingError};
use crate::mapping::FrequencyMapper;
use crate::tuning::LabelFormat;

/// Lowest frequency any bound or base may take.
pub const MIN_AUDIBLE_FREQ: f64 = 20.0;
/// Highest frequency any bound or base may take.
pub const MAX_AUDIBLE_FREQ: f64 = 20000.0;
pub const MIN_EDO_DIVISIONS: u32 = 2;
pub const MAX_EDO_DIVISIONS: u32 = 100;

/// Bounds of the log mapping. Invariant: `20 <= min_freq < max_freq <= 20000`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRange {
    pub min_freq: f64,
    pub max_freq: f64,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        FrequencyRange {
            min_freq: MIN_AUDIBLE_FREQ,
            max_freq: MAX_AUDIBLE_FREQ,
        }
    }
}

impl FrequencyRange {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min_freq(self.min_freq, self.max_freq)?;
        check_max_freq(self.max_freq, self.min_freq)
    }

    pub fn set_min_freq(&mut self, value: f64) -> Result<(), ConfigError> {
        check_min_freq(value, self.max_freq)?;
        self.min_freq = value;
        Ok(())
    }

    pub fn set_max_freq(&mut self, value: f64) -> Result<(), ConfigError> {
        check_max_freq(value, self.min_freq)?;
        self.max_freq = value;
        Ok(())
    }

    pub fn contains(&self, freq: f64) -> bool {
        freq >= self.min_freq && freq <= self.max_freq
    }

    pub fn mapper(&self, canvas_height: f64) -> Result<FrequencyMapper, MappingError> {
        FrequencyMapper::new(canvas_height, self.min_freq, self.max_freq)
    }
}

fn check_min_freq(value: f64, max_freq: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= MIN_AUDIBLE_FREQ && value < max_freq {
        Ok(())
    } else {
        Err(ConfigError::MinFrequencyOutOfRange { value, max_freq })
    }
}

fn check_max_freq(value: f64, min_freq: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value <= MAX_AUDIBLE_FREQ && value > min_freq {
        Ok(())
    } else {
        Err(ConfigError::MaxFrequencyOutOfRange { value, min_freq })
    }
}

/// Base frequency and EDO division count for the guideline grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningConfig {
    pub base_frequency: f64,
    pub edo_divisions: u32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        TuningConfig {
            base_frequency: 440.0,
            edo_divisions: 12,
        }
    }
}

impl TuningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_base_frequency(self.base_frequency)?;
        check_edo_divisions(self.edo_divisions as f64)
    }

    pub fn set_base_frequency(&mut self, value: f64) -> Result<(), ConfigError> {
        check_base_frequency(value)?;
        self.base_frequency = value;
        Ok(())
    }

    pub fn set_edo_divisions(&mut self, value: u32) -> Result<(), ConfigError> {
        check_edo_divisions(value as f64)?;
        self.edo_divisions = value;
        Ok(())
    }
}

fn check_base_frequency(value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (MIN_AUDIBLE_FREQ..=MAX_AUDIBLE_FREQ).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::BaseFrequencyOutOfRange { value })
    }
}

fn check_edo_divisions(value: f64) -> Result<(), ConfigError> {
    let in_range = (MIN_EDO_DIVISIONS as f64..=MAX_EDO_DIVISIONS as f64).contains(&value);
    if in_range && value.fract() == 0.0 {
        Ok(())
    } else {
        Err(ConfigError::EdoDivisionsOutOfRange { value })
    }
}

/// Which guideline layers are drawn and how EDO lines are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuidelineOptions {
    pub show_octaves: bool,
    pub show_edo: bool,
    pub show_edo_labels: bool,
    pub label_format: LabelFormat,
}

impl Default for GuidelineOptions {
    fn default() -> Self {
        GuidelineOptions {
            show_octaves: true,
            show_edo: false,
            show_edo_labels: false,
            label_format: LabelFormat::Hz,
        }
    }
}

/// Offline export format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            sample_rate: 44100,
            channels: 2,
        }
    }
}

/// Everything the user can configure in one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub frequency_range: FrequencyRange,
    pub tuning: TuningConfig,
    pub waveform: Waveform,
    pub guidelines: GuidelineOptions,
    pub export: ExportConfig,
}

impl SessionConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frequency_range.validate()?;
        self.tuning.validate()?;
        if self.export.sample_rate == 0 || !(1..=2).contains(&self.export.channels) {
            return Err(ConfigError::Malformed {
                reason: format!(
                    "export needs a positive sample rate and 1 or 2 channels, got {} Hz x {}",
                    self.export.sample_rate, self.export.channels
                ),
            });
        }
        Ok(())
    }
}

/// Parse the raw text of a frequency input.
pub fn parse_frequency_input(text: &str) -> Result<f64, ConfigError> {
    let value: f64 = text.trim().parse().map_err(|_| ConfigError::NotANumber {
        text: text.to_string(),
    })?;
    if value.is_nan() {
        return Err(ConfigError::NotANumber {
            text: text.to_string(),
        });
    }
    Ok(value)
}

/// Parse the raw text of the EDO divisions input. Fractions are rejected.
pub fn parse_divisions_input(text: &str) -> Result<u32, ConfigError> {
    let value = parse_frequency_input(text)?;
    check_edo_divisions(value)?;
    Ok(value as u32)
}

//! Error types.
//!
//! Nothing here is fatal to the host: validation errors carry the message
//! shown to the user, mapping errors reject an unusable frequency range
//! before it can produce NaN, and backend errors leave playback inert.

use thiserror::Error;

/// The log frequency mapping cannot be built from the given bounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("Frequency range must satisfy 0 < min < max, got min {min_freq} Hz, max {max_freq} Hz")]
    InvalidRange { min_freq: f64, max_freq: f64 },

    #[error("Canvas height must be positive, got {height}")]
    InvalidCanvasHeight { height: f64 },
}

/// A rejected configuration edit. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Please enter a valid frequency between 20 Hz and 20000 Hz.")]
    BaseFrequencyOutOfRange { value: f64 },

    #[error("Please enter a whole number of divisions between 2 and 100.")]
    EdoDivisionsOutOfRange { value: f64 },

    #[error("Minimum frequency must be at least 20 Hz and below the maximum ({max_freq} Hz).")]
    MinFrequencyOutOfRange { value: f64, max_freq: f64 },

    #[error("Maximum frequency must be at most 20000 Hz and above the minimum ({min_freq} Hz).")]
    MaxFrequencyOutOfRange { value: f64, min_freq: f64 },

    #[error("'{text}' is not a number.")]
    NotANumber { text: String },

    #[error("Unknown waveform '{name}'; expected sine, square, sawtooth or triangle.")]
    UnknownWaveform { name: String },

    #[error("Unknown label format '{name}'; expected hz or cents.")]
    UnknownLabelFormat { name: String },

    #[error("Unknown setting '{name}'.")]
    UnknownSetting { name: String },

    #[error("Invalid configuration: {reason}")]
    Malformed { reason: String },
}

/// The audio engine could not be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("Audio engine is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Audio engine could not be resumed: {reason}")]
    ResumeFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SketchError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

//! DSP: oscillators, frequency automation, voices and the sample engine.
//!
//! Live playback and WAV export share everything here, so what is heard
//! while drawing is what ends up in the exported file.

pub mod automation;
pub mod engine;
pub mod oscillator;
pub mod renderer;
pub mod voice;

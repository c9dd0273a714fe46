//! Oscillators whose frequency may change on every sample.
//!
//! Square and sawtooth are band-limited with PolyBLEP; sine is exact.

use std::f64::consts::TAU;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Voice timbre, shared by every voice of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            _ => Err(ConfigError::UnknownWaveform {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    /// Normalized phase in [0, 1).
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce one sample at `frequency` Hz and advance the phase.
    pub fn next_sample(&mut self, frequency: f64) -> f64 {
        let inc = (frequency / self.sample_rate).clamp(0.0, 0.5);
        let t = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Sawtooth => 2.0 * t - 1.0 - poly_blep(t, inc),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, inc) - poly_blep((t + 0.5) % 1.0, inc)
            }
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}

/// Polynomial band-limited step correction around the wrap at phase 0.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(waveform: Waveform, frequency: f64, n: usize) -> Vec<f64> {
        let mut osc = Oscillator::new(waveform, 44100.0);
        (0..n).map(|_| osc.next_sample(frequency)).collect()
    }

    #[test]
    fn sine_starts_at_zero() {
        let s = collect(Waveform::Sine, 440.0, 1);
        assert!(s[0].abs() < 1e-12);
    }

    #[test]
    fn shapes_stay_in_range() {
        for waveform in [Waveform::Sine, Waveform::Triangle] {
            assert!(collect(waveform, 440.0, 44100).iter().all(|s| s.abs() <= 1.0));
        }
        for waveform in [Waveform::Square, Waveform::Sawtooth] {
            assert!(collect(waveform, 440.0, 44100).iter().all(|s| s.abs() <= 1.5));
        }
    }

    #[test]
    fn sine_period_follows_frequency() {
        // 100 Hz at 44.1 kHz: 441 samples per cycle, so 100 rising zero crossings per second.
        let samples = collect(Waveform::Sine, 100.0, 44100);
        let rising = samples
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count();
        assert!((99..=100).contains(&rising), "got {rising} crossings");
    }

    #[test]
    fn frequency_change_keeps_phase_continuous() {
        let mut osc = Oscillator::new(Waveform::Sine, 44100.0);
        let mut prev = osc.next_sample(200.0);
        for i in 0..4410 {
            let freq = if i < 2205 { 200.0 } else { 400.0 };
            let s = osc.next_sample(freq);
            // Max slope of a 400 Hz sine per sample is 2*pi*400/44100 < 0.06.
            assert!((s - prev).abs() < 0.06);
            prev = s;
        }
    }

    #[test]
    fn waveform_names() {
        assert_eq!("square".parse::<Waveform>().unwrap(), Waveform::Square);
        assert_eq!("saw".parse::<Waveform>().unwrap(), Waveform::Sawtooth);
        assert!(matches!(
            "noise".parse::<Waveform>(),
            Err(ConfigError::UnknownWaveform { .. })
        ));
    }
}

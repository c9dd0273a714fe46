//! Tuning Grid: octave and equal-division-of-the-octave (EDO) frequencies,
//! and their layout as horizontal guidelines on the canvas.

use serde::{Deserialize, Serialize};

use crate::config::{
    FrequencyRange, GuidelineOptions, MAX_EDO_DIVISIONS, MIN_EDO_DIVISIONS, TuningConfig,
};
use crate::error::MappingError;

/// Octaves of `base_freq` inside `[min_freq, max_freq]`, ascending, no duplicates.
///
/// `base_freq` seeds the series even when it lies outside the range itself.
pub fn octave_frequencies(base_freq: f64, min_freq: f64, max_freq: f64) -> Vec<f64> {
    if !base_freq.is_finite() || !min_freq.is_finite() || !max_freq.is_finite() {
        return Vec::new();
    }
    if base_freq <= 0.0 || min_freq <= 0.0 || max_freq < min_freq {
        return Vec::new();
    }

    let mut frequencies = Vec::new();

    let mut freq = base_freq;
    while freq <= max_freq {
        if freq >= min_freq {
            frequencies.push(freq);
        }
        freq *= 2.0;
    }

    freq = base_freq / 2.0;
    while freq >= min_freq {
        if freq <= max_freq {
            frequencies.push(freq);
        }
        freq /= 2.0;
    }

    frequencies.sort_by(f64::total_cmp);
    frequencies.dedup();
    frequencies
}

/// The `divisions` equal steps of the octave starting at `octave_base_freq`,
/// followed by the next octave boundary (`divisions + 1` values).
///
/// Step `i` lies `i * 1200 / divisions` cents above the base. Empty when
/// `divisions` is outside the supported `2..=100`.
pub fn edo_step_frequencies(octave_base_freq: f64, divisions: u32) -> Vec<f64> {
    if !(MIN_EDO_DIVISIONS..=MAX_EDO_DIVISIONS).contains(&divisions) {
        return Vec::new();
    }
    let n = divisions as f64;
    (0..divisions)
        .map(|i| octave_base_freq * 2f64.powf(i as f64 / n))
        .chain(std::iter::once(octave_base_freq * 2.0))
        .collect()
}

/// Cents of EDO step `step` above its octave line.
pub fn step_cents(step: u32, divisions: u32) -> f64 {
    step as f64 * 1200.0 / divisions as f64
}

/// How EDO guideline labels are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelFormat {
    #[default]
    Hz,
    Cents,
}

impl std::str::FromStr for LabelFormat {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hz" => Ok(LabelFormat::Hz),
            "cents" => Ok(LabelFormat::Cents),
            _ => Err(crate::error::ConfigError::UnknownLabelFormat {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GuidelineKind {
    Octave,
    EdoStep { step: u32 },
}

/// One horizontal line for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    pub kind: GuidelineKind,
    pub frequency: f64,
    pub y: f64,
    pub label: Option<String>,
}

fn hz_label(freq: f64) -> String {
    format!("{freq:.1} Hz")
}

/// Lay out the enabled guideline layers for a canvas of `canvas_height`.
///
/// Lines outside the frequency range or the canvas are dropped. The closing
/// octave term of each EDO series is left out, and so is step 0 while octave
/// lines are shown, so no line is drawn twice.
pub fn layout_guidelines(
    tuning: &TuningConfig,
    range: &FrequencyRange,
    options: &GuidelineOptions,
    canvas_height: f64,
) -> Result<Vec<Guideline>, MappingError> {
    let mapper = range.mapper(canvas_height)?;
    let on_canvas = |freq: f64| -> Option<f64> {
        if !range.contains(freq) {
            return None;
        }
        mapper
            .frequency_to_y(freq)
            .filter(|y| (0.0..=canvas_height).contains(y))
    };

    let mut lines = Vec::new();

    if options.show_octaves {
        for freq in octave_frequencies(tuning.base_frequency, range.min_freq, range.max_freq) {
            if let Some(y) = on_canvas(freq) {
                lines.push(Guideline {
                    kind: GuidelineKind::Octave,
                    frequency: freq,
                    y,
                    label: Some(hz_label(freq)),
                });
            }
        }
    }

    if options.show_edo {
        let divisions = tuning.edo_divisions;
        // Seed one octave below the range so steps under the lowest octave line appear.
        let seeds = octave_frequencies(tuning.base_frequency, range.min_freq / 2.0, range.max_freq);
        let first_step = if options.show_octaves { 1 } else { 0 };
        for seed in seeds {
            let steps = edo_step_frequencies(seed, divisions);
            for (step, &freq) in steps.iter().enumerate().take(divisions as usize).skip(first_step) {
                let Some(y) = on_canvas(freq) else {
                    continue;
                };
                let step = step as u32;
                let label = options.show_edo_labels.then(|| match options.label_format {
                    LabelFormat::Hz => hz_label(freq),
                    LabelFormat::Cents => format!("{:.0}¢", step_cents(step, divisions)),
                });
                lines.push(Guideline {
                    kind: GuidelineKind::EdoStep { step },
                    frequency: freq,
                    y,
                    label,
                });
            }
        }
    }

    Ok(lines)
}

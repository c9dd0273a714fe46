//! Frequency Mapper: vertical canvas position to pitch on a log scale.
//!
//! The top of the canvas (`y = 0`) is the maximum frequency and the bottom
//! (`y = height`) the minimum. Both directions of the mapping share one
//! scale computation so guidelines land exactly where playback sounds.

use crate::error::MappingError;

/// A validated log10 mapping between canvas y and frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMapper {
    min_freq: f64,
    max_freq: f64,
    max_log: f64,
    /// log10 units per pixel.
    scale: f64,
    canvas_height: f64,
}

impl FrequencyMapper {
    pub fn new(canvas_height: f64, min_freq: f64, max_freq: f64) -> Result<Self, MappingError> {
        if !(min_freq.is_finite() && max_freq.is_finite()) || min_freq <= 0.0 || max_freq <= min_freq
        {
            return Err(MappingError::InvalidRange { min_freq, max_freq });
        }
        if !canvas_height.is_finite() || canvas_height <= 0.0 {
            return Err(MappingError::InvalidCanvasHeight {
                height: canvas_height,
            });
        }

        let min_log = min_freq.log10();
        let max_log = max_freq.log10();
        Ok(FrequencyMapper {
            min_freq,
            max_freq,
            max_log,
            scale: (max_log - min_log) / canvas_height,
            canvas_height,
        })
    }

    pub fn min_freq(&self) -> f64 {
        self.min_freq
    }

    pub fn max_freq(&self) -> f64 {
        self.max_freq
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Frequency at canvas row `y`. `y` is not clamped.
    pub fn y_to_frequency(&self, y: f64) -> f64 {
        // Pin the endpoints so they come out exact instead of 10^log10(x).
        if y == 0.0 {
            return self.max_freq;
        }
        if y == self.canvas_height {
            return self.min_freq;
        }
        10f64.powf(self.max_log - y * self.scale)
    }

    /// Canvas row of `freq`. Non-positive frequencies have no row.
    pub fn frequency_to_y(&self, freq: f64) -> Option<f64> {
        if freq.is_nan() || freq <= 0.0 {
            return None;
        }
        Some((self.max_log - freq.log10()) / self.scale)
    }

    /// `y_to_frequency` followed by a clamp into the mapped range.
    pub fn clamped_frequency(&self, y: f64) -> f64 {
        self.clamp(self.y_to_frequency(y))
    }

    pub fn clamp(&self, freq: f64) -> f64 {
        freq.clamp(self.min_freq, self.max_freq)
    }
}

/// One-shot form of [`FrequencyMapper::y_to_frequency`].
pub fn y_to_frequency(
    y: f64,
    canvas_height: f64,
    min_freq: f64,
    max_freq: f64,
) -> Result<f64, MappingError> {
    Ok(FrequencyMapper::new(canvas_height, min_freq, max_freq)?.y_to_frequency(y))
}

/// One-shot form of [`FrequencyMapper::frequency_to_y`].
pub fn frequency_to_y(
    freq: f64,
    canvas_height: f64,
    min_freq: f64,
    max_freq: f64,
) -> Result<Option<f64>, MappingError> {
    Ok(FrequencyMapper::new(canvas_height, min_freq, max_freq)?.frequency_to_y(freq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn endpoints_are_exact() {
        let m = FrequencyMapper::new(400.0, 20.0, 20000.0).unwrap();
        assert_eq!(m.y_to_frequency(0.0), 20000.0);
        assert_eq!(m.y_to_frequency(400.0), 20.0);
    }

    #[test]
    fn midpoint_is_geometric_mean() {
        let m = FrequencyMapper::new(300.0, 20.0, 20000.0).unwrap();
        assert_approx_eq!(m.y_to_frequency(150.0), (20.0f64 * 20000.0).sqrt(), 1e-6);
    }

    #[test]
    fn round_trip_across_canvas() {
        let m = FrequencyMapper::new(600.0, 55.0, 7040.0).unwrap();
        for step in 0..=600 {
            let y = step as f64;
            let back = m.frequency_to_y(m.y_to_frequency(y)).unwrap();
            assert_approx_eq!(back, y, 1e-9);
        }
    }

    #[test]
    fn y_outside_canvas_is_not_clamped() {
        let m = FrequencyMapper::new(100.0, 20.0, 20000.0).unwrap();
        assert!(m.y_to_frequency(-10.0) > 20000.0);
        assert!(m.y_to_frequency(110.0) < 20.0);
        assert_eq!(m.clamped_frequency(-10.0), 20000.0);
        assert_eq!(m.clamped_frequency(110.0), 20.0);
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(matches!(
            FrequencyMapper::new(100.0, 0.0, 100.0),
            Err(MappingError::InvalidRange { .. })
        ));
        assert!(matches!(
            FrequencyMapper::new(100.0, 500.0, 500.0),
            Err(MappingError::InvalidRange { .. })
        ));
        assert!(matches!(
            FrequencyMapper::new(100.0, 20.0, f64::INFINITY),
            Err(MappingError::InvalidRange { .. })
        ));
        assert!(matches!(
            FrequencyMapper::new(0.0, 20.0, 20000.0),
            Err(MappingError::InvalidCanvasHeight { .. })
        ));
    }

    #[test]
    fn non_positive_frequency_has_no_row() {
        let m = FrequencyMapper::new(100.0, 20.0, 20000.0).unwrap();
        assert_eq!(m.frequency_to_y(0.0), None);
        assert_eq!(m.frequency_to_y(-1.0), None);
    }

    #[test]
    fn free_functions_validate() {
        assert!(y_to_frequency(0.0, 100.0, 200.0, 100.0).is_err());
        assert_eq!(y_to_frequency(0.0, 100.0, 20.0, 20000.0).unwrap(), 20000.0);
        assert_approx_eq!(
            frequency_to_y(20.0, 100.0, 20.0, 20000.0).unwrap().unwrap(),
            100.0,
            1e-9
        );
    }
}

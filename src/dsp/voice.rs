//! Voice: one drawn path turned into a continuous tone.
//!
//! Planning is pure: a [`VoicePlan`] holds the immutable, time-stamped
//! instructions for one path (active window plus frequency automation) and
//! is computed the same way for live playback and offline export.
//! [`PathVoice`] renders a plan sample by sample.

use serde::Serialize;

use crate::drawing::{Path, Point};
use crate::mapping::FrequencyMapper;

use super::automation::Automation;
use super::oscillator::{Oscillator, Waveform};

/// Seconds of playback per full canvas width.
pub const BASE_DURATION_SECS: f64 = 5.0;

/// Gain of every voice, low enough that overlapping paths rarely clip.
pub const VOICE_GAIN: f64 = 0.1;

/// Oscillator frequency before any automation applies.
const DEFAULT_FREQUENCY: f64 = 440.0;

/// Length of the whole drawing in seconds: `(max_x / canvas_width) * 5`.
pub fn total_duration(max_x: f64, canvas_width: f64) -> f64 {
    if max_x <= 0.0 || canvas_width <= 0.0 {
        return 0.0;
    }
    max_x / canvas_width * BASE_DURATION_SECS
}

/// Everything needed to turn paths into voice plans.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext {
    pub mapper: FrequencyMapper,
    pub waveform: Waveform,
    pub max_x: f64,
    pub canvas_width: f64,
    /// Clock time that corresponds to playback position `offset`.
    pub origin: f64,
    /// Playback position already elapsed (the pause offset); earlier points are skipped.
    pub offset: f64,
}

impl PlanContext {
    fn point_time(&self, point: &Point, total: f64) -> f64 {
        point.x / self.max_x * total - self.offset
    }
}

/// Immutable instructions for one voice, in absolute clock seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoicePlan {
    pub waveform: Waveform,
    pub gain: f64,
    /// First instant the voice sounds.
    pub start: f64,
    /// First instant the voice is silent again.
    pub stop: f64,
    pub frequency: Automation,
}

impl VoicePlan {
    /// Plan one path. Paths that cannot sound from the current offset yield `None`.
    pub fn for_path(path: &[Point], ctx: &PlanContext) -> Option<VoicePlan> {
        let (first, last) = match path {
            [first, .., last] => (first, last),
            _ => return None,
        };
        let total = total_duration(ctx.max_x, ctx.canvas_width);
        if total <= 0.0 {
            return None;
        }

        let start = ctx.point_time(first, total).max(0.0);
        let end = ctx.point_time(last, total);
        if !start.is_finite() || !end.is_finite() || end <= start {
            return None;
        }

        let mut frequency = Automation::new(DEFAULT_FREQUENCY);
        let mut skipped: Option<(f64, f64)> = None;
        let mut previous: Option<f64> = None;
        for point in path {
            let t = ctx.point_time(point, total);
            let freq = ctx.mapper.clamped_frequency(point.y);
            if !t.is_finite() || !freq.is_finite() {
                continue;
            }
            if t < 0.0 {
                skipped = Some((t, freq));
                continue;
            }
            match previous {
                None => {
                    match skipped {
                        // Resuming inside a segment: pick the glide up where it was paused.
                        Some((t0, f0)) if t > 0.0 => {
                            let resumed = f0 + (freq - f0) * (-t0 / (t - t0));
                            frequency.set_value_at_time(resumed, ctx.origin + start);
                            frequency.linear_ramp_to_value_at_time(freq, ctx.origin + t);
                        }
                        _ => frequency.set_value_at_time(freq, ctx.origin + t),
                    }
                    previous = Some(t);
                }
                // Points drawn backwards in x would move time backwards.
                Some(prev) if t < prev => continue,
                Some(_) => {
                    frequency.linear_ramp_to_value_at_time(freq, ctx.origin + t);
                    previous = Some(t);
                }
            }
        }
        if frequency.is_empty() {
            return None;
        }

        Some(VoicePlan {
            waveform: ctx.waveform,
            gain: VOICE_GAIN,
            start: ctx.origin + start,
            stop: ctx.origin + end,
            frequency,
        })
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// Plan every path that can sound. Empty when nothing has positive extent.
pub fn plan_voices(paths: &[Path], ctx: &PlanContext) -> Vec<VoicePlan> {
    if ctx.max_x <= 0.0 {
        return Vec::new();
    }
    let plans: Vec<VoicePlan> = paths
        .iter()
        .filter_map(|path| VoicePlan::for_path(path, ctx))
        .collect();
    log::debug!(
        "planned {} of {} paths from offset {:.3}s",
        plans.len(),
        paths.len(),
        ctx.offset
    );
    plans
}

/// A plan being rendered.
#[derive(Debug, Clone)]
pub struct PathVoice {
    plan: VoicePlan,
    oscillator: Oscillator,
}

impl PathVoice {
    pub fn new(plan: VoicePlan, sample_rate: f64) -> Self {
        PathVoice {
            oscillator: Oscillator::new(plan.waveform, sample_rate),
            plan,
        }
    }

    pub fn plan(&self) -> &VoicePlan {
        &self.plan
    }

    /// Sample at clock time `time`; silent outside `[start, stop)`.
    pub fn sample_at(&mut self, time: f64) -> f64 {
        if time < self.plan.start || time >= self.plan.stop {
            return 0.0;
        }
        let frequency = self.plan.frequency.value_at(time);
        self.oscillator.next_sample(frequency) * self.plan.gain
    }

    pub fn is_finished(&self, time: f64) -> bool {
        time >= self.plan.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::automation::AutomationEvent;
    use assert_approx_eq::assert_approx_eq;

    fn ctx(max_x: f64, canvas_width: f64, offset: f64) -> PlanContext {
        PlanContext {
            mapper: FrequencyMapper::new(100.0, 20.0, 20000.0).unwrap(),
            waveform: Waveform::Sine,
            max_x,
            canvas_width,
            origin: 0.0,
            offset,
        }
    }

    #[test]
    fn duration_scales_with_extent() {
        assert_eq!(total_duration(100.0, 100.0), 5.0);
        assert_eq!(total_duration(50.0, 200.0), 1.25);
        assert_eq!(total_duration(0.0, 200.0), 0.0);
    }

    #[test]
    fn full_width_diagonal() {
        let path = vec![Point::new(0.0, 0.0), Point::new(100.0, 100.0)];
        let plan = VoicePlan::for_path(&path, &ctx(100.0, 100.0, 0.0)).unwrap();

        assert_eq!(plan.start, 0.0);
        assert_eq!(plan.stop, 5.0);
        assert_eq!(plan.gain, 0.1);
        assert_eq!(
            plan.frequency.events(),
            &[
                AutomationEvent::SetValue {
                    value: 20000.0,
                    time: 0.0
                },
                AutomationEvent::LinearRamp {
                    value: 20.0,
                    time: 5.0
                },
            ]
        );
        assert_approx_eq!(plan.frequency.value_at(2.5), 10010.0, 1e-9);
    }

    #[test]
    fn path_starting_midway() {
        let path = vec![Point::new(50.0, 50.0), Point::new(75.0, 50.0)];
        let plan = VoicePlan::for_path(&path, &ctx(100.0, 200.0, 0.0)).unwrap();
        // Total is 2.5 s; x = 50 of 100 is 1.25 s in.
        assert_eq!(plan.start, 1.25);
        assert_eq!(plan.stop, 1.875);
    }

    #[test]
    fn resume_skips_past_points() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(40.0, 50.0),
            Point::new(100.0, 100.0),
        ];
        let mut c = ctx(100.0, 100.0, 2.5);
        c.origin = 10.0;
        let plan = VoicePlan::for_path(&path, &c).unwrap();

        assert_eq!(plan.start, 10.0);
        assert_eq!(plan.stop, 12.5);
        // The first two points are behind; the glide from x = 40 to x = 100
        // continues from where it was at the pause.
        let events = plan.frequency.events();
        assert_eq!(events.len(), 2);
        let at_40 = c.mapper.y_to_frequency(50.0);
        assert_eq!(events[0].time(), 10.0);
        assert_approx_eq!(events[0].value(), at_40 + (20.0 - at_40) * (0.5 / 3.0), 1e-9);
        assert_eq!(
            events[1],
            AutomationEvent::LinearRamp {
                value: 20.0,
                time: 12.5
            }
        );
    }

    #[test]
    fn silent_paths_are_not_planned() {
        let c = ctx(100.0, 100.0, 0.0);
        assert!(VoicePlan::for_path(&[Point::new(10.0, 10.0)], &c).is_none());
        assert!(VoicePlan::for_path(&[], &c).is_none());
        // Entirely in the past after a pause.
        let past = vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0)];
        assert!(VoicePlan::for_path(&past, &ctx(100.0, 100.0, 2.0)).is_none());
        // Drawn right to left.
        let backwards = vec![Point::new(80.0, 0.0), Point::new(20.0, 0.0)];
        assert!(VoicePlan::for_path(&backwards, &c).is_none());
    }

    #[test]
    fn non_finite_points_never_plan_an_endless_voice() {
        let c = ctx(100.0, 100.0, 0.0);
        let open_ended = vec![Point::new(0.0, 50.0), Point::new(f64::NAN, 50.0)];
        assert!(VoicePlan::for_path(&open_ended, &c).is_none());

        // A bad point in the middle is skipped; the rest still plays and ends.
        let path = vec![
            Point::new(0.0, 50.0),
            Point::new(f64::INFINITY, 20.0),
            Point::new(50.0, 50.0),
        ];
        let plan = VoicePlan::for_path(&path, &c).unwrap();
        assert_eq!(plan.frequency.events().len(), 2);
        let voice = PathVoice::new(plan, 8000.0);
        assert!(voice.is_finished(1e6));
    }

    #[test]
    fn zero_extent_plans_nothing() {
        let paths = vec![
            vec![Point::new(0.0, 0.0), Point::new(0.0, 50.0)],
            vec![Point::new(0.0, 10.0), Point::new(0.0, 20.0)],
        ];
        assert!(plan_voices(&paths, &ctx(0.0, 100.0, 0.0)).is_empty());
    }

    #[test]
    fn frequencies_are_clamped() {
        let path = vec![Point::new(0.0, -40.0), Point::new(100.0, 140.0)];
        let plan = VoicePlan::for_path(&path, &ctx(100.0, 100.0, 0.0)).unwrap();
        let values: Vec<f64> = plan.frequency.events().iter().map(|e| e.value()).collect();
        assert_eq!(values, vec![20000.0, 20.0]);
    }

    #[test]
    fn backtracking_points_are_dropped() {
        let path = vec![
            Point::new(0.0, 50.0),
            Point::new(60.0, 50.0),
            Point::new(40.0, 0.0),
            Point::new(100.0, 50.0),
        ];
        let plan = VoicePlan::for_path(&path, &ctx(100.0, 100.0, 0.0)).unwrap();
        let times: Vec<f64> = plan.frequency.events().iter().map(|e| e.time()).collect();
        assert_eq!(times, vec![0.0, 3.0, 5.0]);
    }

    #[test]
    fn voice_sounds_only_inside_its_window() {
        let path = vec![Point::new(20.0, 50.0), Point::new(40.0, 50.0)];
        let plan = VoicePlan::for_path(&path, &ctx(100.0, 100.0, 0.0)).unwrap();
        let mut voice = PathVoice::new(plan, 8000.0);

        assert_eq!(voice.sample_at(0.5), 0.0);
        let mut peak: f64 = 0.0;
        for i in 8000..16000 {
            peak = peak.max(voice.sample_at(i as f64 / 8000.0).abs());
        }
        assert!(peak > 0.05 && peak <= 0.1);
        assert_eq!(voice.sample_at(2.0), 0.0);
        assert!(voice.is_finished(2.0));
    }
}

//! Voice Engine: a sample clock and the set of voices scheduled against it.
//!
//! The same engine backs live playback (pulled block by block from an audio
//! callback) and offline export (run once for the whole buffer). Voices are
//! summed at their fixed gain; each voice is mono and copied to both channels.

use super::voice::{PathVoice, VoicePlan};

/// Handle of a started voice, valid until it finishes or is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(u64);

#[derive(Debug)]
pub struct VoiceEngine {
    sample_rate: f64,
    /// Frames rendered so far; the clock.
    frame: u64,
    next_handle: u64,
    voices: Vec<(VoiceHandle, PathVoice)>,
}

impl VoiceEngine {
    pub fn new(sample_rate: f64) -> Self {
        VoiceEngine {
            sample_rate,
            frame: 0,
            next_handle: 0,
            voices: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Clock time in seconds.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate
    }

    pub fn start(&mut self, plan: VoicePlan) -> VoiceHandle {
        let handle = VoiceHandle(self.next_handle);
        self.next_handle += 1;
        self.voices.push((handle, PathVoice::new(plan, self.sample_rate)));
        handle
    }

    /// Stop a voice and discard what remains of its schedule.
    pub fn cancel(&mut self, handle: VoiceHandle) -> bool {
        let before = self.voices.len();
        self.voices.retain(|(h, _)| *h != handle);
        self.voices.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.voices.clear();
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn is_active(&self, handle: VoiceHandle) -> bool {
        self.voices.iter().any(|(h, _)| *h == handle)
    }

    /// Render `left.len()` frames into both channels and advance the clock.
    ///
    /// `right` may be shorter than `left` (or empty for mono output).
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (i, out) in left.iter_mut().enumerate() {
            let time = (self.frame + i as u64) as f64 / self.sample_rate;
            let mixed: f64 = self
                .voices
                .iter_mut()
                .map(|(_, voice)| voice.sample_at(time))
                .sum();
            *out = mixed as f32;
            if let Some(r) = right.get_mut(i) {
                *r = mixed as f32;
            }
        }
        self.frame += left.len() as u64;

        let now = self.current_time();
        self.voices.retain(|(_, voice)| !voice.is_finished(now));
    }

    /// Move the clock forward without producing output.
    pub fn skip(&mut self, frames: u64) {
        self.frame += frames;
        let now = self.current_time();
        self.voices.retain(|(_, voice)| !voice.is_finished(now));
    }
}

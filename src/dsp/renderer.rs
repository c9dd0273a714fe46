//! Offline renderer: renders the drawing into a fixed-length buffer and
//! encodes it as a 16-bit PCM WAV file.

use crate::config::SessionConfig;
use crate::drawing::{CanvasSize, DrawingState};
use crate::error::MappingError;

use super::engine::VoiceEngine;
use super::voice::{PlanContext, plan_voices, total_duration};

/// File name of every export.
pub const EXPORT_FILE_NAME: &str = "composition.wav";
pub const WAV_MIME_TYPE: &str = "audio/wav";
const WAV_HEADER_LEN: usize = 44;

/// Planar float audio, one `Vec` per channel, all the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn silent(sample_rate: u32, channels: u16, frames: usize) -> Self {
        AudioBuffer {
            sample_rate,
            channels: vec![vec![0.0; frames]; channels as usize],
        }
    }

    pub fn num_channels(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples interleaved frame by frame (L, R, L, R, ...).
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }
}

/// A finished export, ready to hand to a download.
#[derive(Debug, Clone, PartialEq)]
pub struct WavExport {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render every path from the start into a buffer of
/// `floor(sample_rate * total_duration)` frames.
pub fn render_offline(
    drawing: &DrawingState,
    canvas: CanvasSize,
    config: &SessionConfig,
) -> Result<AudioBuffer, MappingError> {
    let sample_rate = config.export.sample_rate;
    let duration = total_duration(drawing.max_x(), canvas.width);
    let frames = (sample_rate as f64 * duration).floor() as usize;
    let mut buffer = AudioBuffer::silent(sample_rate, config.export.channels, frames);
    if frames == 0 {
        return Ok(buffer);
    }

    let ctx = PlanContext {
        mapper: config.frequency_range.mapper(canvas.height)?,
        waveform: config.waveform,
        max_x: drawing.max_x(),
        canvas_width: canvas.width,
        origin: 0.0,
        offset: 0.0,
    };
    let mut engine = VoiceEngine::new(sample_rate as f64);
    for plan in plan_voices(drawing.paths(), &ctx) {
        engine.start(plan);
    }

    match buffer.channels.as_mut_slice() {
        [mono] => engine.render(mono, &mut []),
        [left, right, ..] => engine.render(left, right),
        [] => {}
    }
    Ok(buffer)
}

/// Convert one float sample to 16-bit PCM: clamp to [-1, 1], scale negative
/// values by 32768 and the rest by 32767, truncating toward zero.
pub fn float_to_pcm16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a buffer as a canonical 44-byte-header 16-bit PCM WAV file.
pub fn encode_wav(buffer: &AudioBuffer) -> Vec<u8> {
    let channels = buffer.num_channels();
    let sample_rate = buffer.sample_rate;
    let bits_per_sample: u16 = 16;
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * block_align as u32;
    let samples = buffer.interleaved();
    let data_size = (samples.len() * 2) as u32;

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for sample in samples {
        buf.extend_from_slice(&float_to_pcm16(sample).to_le_bytes());
    }

    buf
}

/// Render and encode. `None` when the drawing has no extent to play.
pub fn export_wav(
    drawing: &DrawingState,
    canvas: CanvasSize,
    config: &SessionConfig,
) -> Result<Option<WavExport>, MappingError> {
    if drawing.max_x() <= 0.0 {
        log::debug!("nothing drawn, skipping export");
        return Ok(None);
    }
    let buffer = render_offline(drawing, canvas, config)?;
    let bytes = encode_wav(&buffer);
    log::info!(
        "exported {} frames at {} Hz ({} bytes) as {}",
        buffer.frames(),
        buffer.sample_rate,
        bytes.len(),
        EXPORT_FILE_NAME
    );
    Ok(Some(WavExport {
        file_name: EXPORT_FILE_NAME,
        mime_type: WAV_MIME_TYPE,
        bytes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::Point;
    use std::io::Cursor;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn diagonal() -> DrawingState {
        let mut drawing = DrawingState::new();
        drawing.commit(vec![Point::new(0.0, 0.0), Point::new(50.0, 100.0)]);
        drawing
    }

    #[test]
    fn header_fields() {
        let frames = 1234;
        let wav = encode_wav(&AudioBuffer::silent(44100, 2, frames));

        assert_eq!(wav.len(), 44 + frames * 2 * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + (frames * 4) as u32);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 44100);
        assert_eq!(u32_at(&wav, 28), 44100 * 4);
        assert_eq!(u16_at(&wav, 32), 4);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), (frames * 4) as u32);
    }

    #[test]
    fn mono_header() {
        let wav = encode_wav(&AudioBuffer::silent(22050, 1, 10));
        assert_eq!(wav.len(), 44 + 20);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 28), 44100);
        assert_eq!(u16_at(&wav, 32), 2);
    }

    #[test]
    fn asymmetric_scaling() {
        assert_eq!(float_to_pcm16(1.0), 32767);
        assert_eq!(float_to_pcm16(-1.0), -32768);
        assert_eq!(float_to_pcm16(2.5), 32767);
        assert_eq!(float_to_pcm16(-7.0), -32768);
        assert_eq!(float_to_pcm16(0.0), 0);
        assert_eq!(float_to_pcm16(0.5), 16383);
        assert_eq!(float_to_pcm16(-0.5), -16384);
    }

    #[test]
    fn channels_are_interleaved() {
        let buffer = AudioBuffer {
            sample_rate: 8000,
            channels: vec![vec![1.0, 0.0], vec![-1.0, 0.5]],
        };
        let wav = encode_wav(&buffer);
        let samples: Vec<i16> = wav[44..]
            .chunks(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(samples, vec![32767, -32768, 0, 16383]);
    }

    #[test]
    fn offline_render_length_follows_extent() {
        let config = SessionConfig::default();
        let buffer = render_offline(&diagonal(), CanvasSize::new(100.0, 100.0), &config).unwrap();
        // max_x 50 of a 100 px canvas is 2.5 s.
        assert_eq!(buffer.frames(), 110250);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.channels[0], buffer.channels[1]);
        assert!(buffer.channels[0].iter().any(|s| s.abs() > 0.05));
        assert!(buffer.channels[0].iter().all(|s| s.abs() <= 0.1 + 1e-6));
    }

    #[test]
    fn export_parses_as_wav() {
        let mut config = SessionConfig::default();
        config.export.sample_rate = 8000;
        let export = export_wav(&diagonal(), CanvasSize::new(100.0, 100.0), &config)
            .unwrap()
            .unwrap();
        assert_eq!(export.file_name, "composition.wav");
        assert_eq!(export.mime_type, "audio/wav");

        let reader = hound::WavReader::new(Cursor::new(export.bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.duration(), 20000);
    }

    #[test]
    fn empty_drawing_exports_nothing() {
        let config = SessionConfig::default();
        let drawing = DrawingState::new();
        assert_eq!(
            export_wav(&drawing, CanvasSize::new(100.0, 100.0), &config).unwrap(),
            None
        );
        // Single-point paths still set the extent; the export is silent.
        let mut dot = DrawingState::new();
        dot.commit(vec![Point::new(20.0, 20.0)]);
        let mut small = config.clone();
        small.export.sample_rate = 1000;
        let export = export_wav(&dot, CanvasSize::new(100.0, 100.0), &small)
            .unwrap()
            .unwrap();
        assert_eq!(export.bytes.len(), 44 + 1000 * 4);
        assert!(export.bytes[44..].iter().all(|&b| b == 0));
    }
}

//! Offline tone sink driven by synthetic time.
//!
//! Acts as the audio clock for recording mode and for tests: time only moves
//! when `advance` is called, and finished tones are reported afterwards.
//! Optionally captures the rendered signal to a WAV file.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::synth::Mixer;
use super::{Tone, ToneId, ToneSink};
use crate::error::AudioError;
use crate::params::ToneParams;

type WavWriter = hound::WavWriter<BufWriter<File>>;

pub struct OfflineAudio {
    mixer: Mixer,
    writer: Option<WavWriter>,
    scratch: Vec<f32>,
    /// Fractional samples carried between advances
    carry: f64,
}

impl OfflineAudio {
    /// Sink without capture
    pub fn new(params: ToneParams) -> Result<Self, AudioError> {
        params.validate().map_err(AudioError::InvalidConfig)?;
        Ok(Self {
            mixer: Mixer::new(params.sample_rate_hz, params),
            writer: None,
            scratch: Vec::new(),
            carry: 0.0,
        })
    }

    /// Sink that writes a mono float WAV to `path`
    pub fn recording(params: ToneParams, path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: params.sample_rate_hz,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut sink = Self::new(params)?;
        sink.writer = Some(hound::WavWriter::create(path, spec)?);
        Ok(sink)
    }

    /// Render `dt` seconds of audio
    pub fn advance(&mut self, dt: f32) -> Result<(), AudioError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Ok(());
        }
        let exact = dt as f64 * self.mixer.sample_rate() as f64 + self.carry;
        let frames = exact.floor();
        self.carry = exact - frames;

        self.scratch.clear();
        self.scratch.resize(frames as usize, 0.0);
        self.mixer.render(&mut self.scratch, 1);

        if let Some(writer) = &mut self.writer {
            for &sample in &self.scratch {
                writer.write_sample(sample)?;
            }
        }
        Ok(())
    }

    /// Audio time rendered so far (seconds)
    pub fn clock_s(&self) -> f64 {
        self.mixer.clock_s()
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.active_voices()
    }

    /// Flush and close the WAV capture, if any
    pub fn finalize(self) -> Result<(), AudioError> {
        if let Some(writer) = self.writer {
            writer.finalize()?;
        }
        Ok(())
    }
}

impl ToneSink for OfflineAudio {
    fn play_tone(&mut self, tone: Tone) -> Result<ToneId, AudioError> {
        Ok(self.mixer.start(tone))
    }

    fn cancel_tone(&mut self, id: ToneId) {
        self.mixer.cancel(id);
    }

    fn poll_finished(&mut self) -> Vec<ToneId> {
        self.mixer.take_finished()
    }
}

//! Triangle-wave voices with an exponential decay, and the mixer that owns them.

use super::{Tone, ToneId};
use crate::params::ToneParams;

/// One sounding tone
#[derive(Debug, Clone)]
pub struct Voice {
    id: ToneId,
    /// Oscillator phase in [0, 1)
    phase: f32,
    /// Phase advance per sample (frequency / sample rate)
    phase_step: f32,
    total_samples: u64,
    rendered: u64,
    initial_gain: f32,
    /// release_gain / initial_gain
    decay_ratio: f32,
}

impl Voice {
    pub fn new(id: ToneId, tone: Tone, sample_rate: u32, params: &ToneParams) -> Self {
        let rate = sample_rate.max(1) as f32;
        let phase_step = if tone.frequency_hz.is_finite() && tone.frequency_hz > 0.0 {
            tone.frequency_hz / rate
        } else {
            0.0
        };
        // Always at least one sample so completion is reported
        let total_samples = if tone.duration_s.is_finite() && tone.duration_s > 0.0 {
            ((tone.duration_s * rate).round() as u64).max(1)
        } else {
            1
        };
        let level = if tone.level.is_finite() {
            tone.level.max(0.0)
        } else {
            0.0
        };
        let decay_ratio = if params.initial_gain > 0.0 {
            (params.release_gain / params.initial_gain).clamp(f32::MIN_POSITIVE, 1.0)
        } else {
            1.0
        };

        Self {
            id,
            phase: 0.0,
            phase_step,
            total_samples,
            rendered: 0,
            initial_gain: params.initial_gain * level,
            decay_ratio,
        }
    }

    pub fn id(&self) -> ToneId {
        self.id
    }

    /// Envelope gain at the current position (exponential ramp to the release gain)
    pub fn gain(&self) -> f32 {
        let progress = self.rendered as f32 / self.total_samples as f32;
        self.initial_gain * self.decay_ratio.powf(progress)
    }

    /// Next output sample; silence once done
    pub fn next_sample(&mut self) -> f32 {
        if self.is_done() {
            return 0.0;
        }
        let triangle = 4.0 * (self.phase - 0.5).abs() - 1.0;
        let sample = triangle * self.gain();
        self.phase = (self.phase + self.phase_step).fract();
        self.rendered += 1;
        sample
    }

    pub fn is_done(&self) -> bool {
        self.rendered >= self.total_samples
    }

    /// Samples left before the voice ends
    pub fn remaining(&self) -> u64 {
        self.total_samples - self.rendered.min(self.total_samples)
    }
}

/// Sums active voices and records which ones ended
#[derive(Debug)]
pub struct Mixer {
    sample_rate: u32,
    params: ToneParams,
    voices: Vec<Voice>,
    finished: Vec<ToneId>,
    next_id: u64,
    /// Frames rendered since creation
    clock: u64,
}

impl Mixer {
    pub fn new(sample_rate: u32, params: ToneParams) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            params,
            voices: Vec::new(),
            finished: Vec::new(),
            next_id: 0,
            clock: 0,
        }
    }

    /// Start a voice at the current clock
    pub fn start(&mut self, tone: Tone) -> ToneId {
        let id = ToneId(self.next_id);
        self.next_id += 1;
        self.voices
            .push(Voice::new(id, tone, self.sample_rate, &self.params));
        id
    }

    /// Drop a voice without reporting it as finished
    pub fn cancel(&mut self, id: ToneId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|voice| voice.id != id);
        before != self.voices.len()
    }

    /// Fill interleaved `out` (every channel gets the same signal)
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let limiter = self.params.limiter.abs();
        for frame in out.chunks_mut(channels) {
            let mut sum = 0.0;
            let mut any_done = false;
            for voice in &mut self.voices {
                sum += voice.next_sample();
                any_done |= voice.is_done();
            }
            frame.fill(sum.clamp(-limiter, limiter));
            self.clock += 1;

            if any_done {
                let finished = &mut self.finished;
                self.voices.retain(|voice| {
                    if voice.is_done() {
                        finished.push(voice.id);
                        false
                    } else {
                        true
                    }
                });
            }
        }
    }

    /// Ids of voices that ended since the last call
    pub fn take_finished(&mut self) -> Vec<ToneId> {
        std::mem::take(&mut self.finished)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Rendered time (seconds)
    pub fn clock_s(&self) -> f64 {
        self.clock as f64 / self.sample_rate as f64
    }
}

//! Tone synthesis and sequencer timing parameters.

/// Audio synthesis constants
pub mod audio_constants {
    /// Smallest accepted speed multiplier
    pub const MIN_SPEED_MULTIPLIER: f32 = 0.05;
}

/// Tone synthesis parameters
#[derive(Debug, Clone)]
pub struct ToneParams {
    /// Sample rate used for offline rendering (Hz)
    /// Real-time output follows the device rate instead
    pub sample_rate_hz: u32,

    /// Gain at note onset (linear)
    pub initial_gain: f32,

    /// Gain reached at the end of the note (linear, exponential ramp)
    pub release_gain: f32,

    /// Hard clip applied to the mixed output
    pub limiter: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            initial_gain: 0.14,
            release_gain: 0.01,
            limiter: 0.5,
        }
    }
}

impl ToneParams {
    /// Validate configuration (positive rate, decaying envelope)
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if !(self.release_gain > 0.0 && self.release_gain <= self.initial_gain) {
            return Err(format!(
                "Release gain must be in (0, {}], got {}",
                self.initial_gain, self.release_gain
            ));
        }
        Ok(())
    }
}

/// Sing-along sequencer parameters
#[derive(Debug, Clone)]
pub struct SequencerParams {
    /// Initial speed multiplier (note duration = base duration * multiplier)
    pub speed_multiplier: f32,

    /// Multiplier change per speed key press
    pub speed_step: f32,

    /// Extra time past a note's duration before a missing completion is
    /// given up on and the chain moves on (seconds)
    pub completion_grace_s: f32,
}

impl Default for SequencerParams {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            speed_step: 0.1,
            completion_grace_s: 0.5,
        }
    }
}

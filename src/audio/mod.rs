//! Tone output: synthesis, real-time playback and offline capture.
//!
//! The sequencer talks to [`ToneSink`] only. The sink is an explicitly owned
//! value created once at startup and lent to whoever needs to emit tones.

mod offline;
mod synth;
mod system;

// Re-export public types
pub use offline::OfflineAudio;
pub use synth::{Mixer, Voice};
pub use system::AudioOutput;

use crate::error::AudioError;

/// Identifier of one started tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToneId(pub(crate) u64);

/// A single note to sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Pitch (Hz)
    pub frequency_hz: f32,
    /// Time until the tone stops and completion is reported (seconds)
    pub duration_s: f32,
    /// Scale on the envelope gain (1.0 = full note level)
    pub level: f32,
}

impl Tone {
    /// Tone at full note level
    pub fn new(frequency_hz: f32, duration_s: f32) -> Self {
        Self {
            frequency_hz,
            duration_s,
            level: 1.0,
        }
    }

    pub fn with_level(self, level: f32) -> Self {
        Self { level, ..self }
    }
}

/// Audio output able to sound a tone and report when it has ended
pub trait ToneSink {
    /// Start `tone` now; its id is reported by `poll_finished` once it ends
    fn play_tone(&mut self, tone: Tone) -> Result<ToneId, AudioError>;

    /// Stop a tone early. Cancelled tones are never reported as finished.
    fn cancel_tone(&mut self, id: ToneId);

    /// Tones that ended since the last poll, in completion order
    fn poll_finished(&mut self) -> Vec<ToneId>;
}

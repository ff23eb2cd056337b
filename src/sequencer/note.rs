//! Note data: pitch, base duration and the lyric span it lights up.

use std::fmt;

/// Piece of lyric text bound to exactly one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Lyric line the span belongs to
    pub line: usize,
    pub text: String,
}

impl TextSpan {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One entry of a chain as handed to the sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSpec {
    /// Pitch (Hz)
    pub frequency_hz: f32,
    /// Duration at speed multiplier 1.0 (seconds)
    pub duration_s: f32,
    pub span: TextSpan,
}

impl NoteSpec {
    pub fn new(frequency_hz: f32, duration_s: f32, span: TextSpan) -> Self {
        Self {
            frequency_hz,
            duration_s,
            span,
        }
    }

    /// Duration when started under `multiplier`
    pub fn playback_duration(&self, multiplier: f32) -> f32 {
        self.duration_s * multiplier
    }
}

/// Per-note lifecycle within one run of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Idle,
    Playing,
    Ceased,
}

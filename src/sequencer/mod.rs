//! Sing-along note chain with lockstep lyric highlighting.
//!
//! Note *i* starts only when the sink reports note *i-1* finished, so the
//! chain follows the audio clock rather than a fixed timer.

mod note;
mod songs;
mod system;

// Re-export public types
pub use note::{NoteSpec, NoteState, TextSpan};
pub use songs::happy_birthday;
pub use system::{NoteSequencer, SequencerState, Transition};

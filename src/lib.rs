//! Confetti library - drifting shapes, particle bursts and a note sequencer

pub mod audio;
pub mod burst;
pub mod canvas;
pub mod cli;
pub mod compositor;
pub mod error;
pub mod field;
pub mod frame_loop;
pub mod lyrics;
pub mod palette;
pub mod params;
pub mod random;
pub mod recording;
pub mod rendering;
pub mod scene;
pub mod sequencer;

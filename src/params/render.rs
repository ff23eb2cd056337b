//! Window and headless-capture settings.

use std::path::PathBuf;

use crate::palette::Color;

/// Window settings
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial viewport width (px)
    pub width_px: u32,

    /// Initial viewport height (px)
    pub height_px: u32,

    /// Painted under every layer
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width_px: 1280,
            height_px: 720,
            background: Color::rgb(0x07, 0x06, 0x12),
        }
    }
}

/// Headless capture settings: PNG per frame plus one WAV
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Captured length (s)
    pub duration_secs: f32,

    /// Root of `frames/` and `audio.wav`
    pub output_dir: PathBuf,

    /// Synthetic clock rate (frames/s)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            fps: 60,
        }
    }

    /// Frames needed to cover the duration, rounding up
    pub fn total_frames(&self) -> usize {
        (self.duration_secs.max(0.0) * self.fps as f32).ceil() as usize
    }

    pub fn frame_dt(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.frames_dir().join(format!("frame_{frame:05}.png"))
    }

    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join("audio.wav")
    }
}

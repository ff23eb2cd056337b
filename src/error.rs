//! Error types for audio output, presentation and recording.
//!
//! None of these are fatal to the frame loop: callers log them and degrade
//! (skip a tone, skip a frame) instead of halting.

use thiserror::Error;

/// Failures of the tone output
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be found
    #[error("No audio output device found")]
    NoDevice,

    /// Error querying the device configuration
    #[error("Failed to get audio config: {0}")]
    Config(String),

    /// Error building the output stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuild(String),

    /// Error starting the output stream (e.g. playback not yet permitted)
    #[error("Failed to start audio stream: {0}")]
    StreamStart(String),

    /// The mixer lock was poisoned by a panicking audio callback
    #[error("Audio mixer unavailable")]
    MixerPoisoned,

    /// Invalid tone parameters
    #[error("Invalid tone config: {0}")]
    InvalidConfig(String),

    /// Error writing the WAV capture
    #[error("Failed to write audio capture: {0}")]
    Capture(#[from] hound::Error),
}

/// Failures of the windowed presenter
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    Surface(String),

    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    Device(String),

    /// The swapchain frame could not be acquired; the frame is skipped
    #[error("Surface frame unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

/// Failures of headless recording
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to save frame {frame}: {source}")]
    Frame {
        frame: usize,
        source: image::ImageError,
    },

    #[error(transparent)]
    Audio(#[from] AudioError),
}

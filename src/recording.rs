//! Headless recording: drives a `Scene` on synthetic time and writes
//! numbered PNG frames plus a WAV of the sing-along.

use std::path::Path;

use log::{info, warn};

use crate::audio::OfflineAudio;
use crate::error::RecordingError;
use crate::lyrics::LyricView;
use crate::params::{RecordingConfig, ToneParams};
use crate::scene::Scene;

/// What a finished recording produced
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub frames: usize,
    /// Navigations (click + burst) captured, all from auto-advance
    pub navigations: usize,
    pub lyric_lines: Vec<String>,
}

fn create_dir(path: &Path) -> Result<(), RecordingError> {
    std::fs::create_dir_all(path).map_err(|source| RecordingError::OutputDir {
        path: path.display().to_string(),
        source,
    })
}

/// Record `config.duration_secs` of the scene.
///
/// The sing-along starts on the first frame; navigation follows the scene's
/// auto-advance cadence, with its clicks mixed into the WAV.
pub fn record(
    config: &RecordingConfig,
    scene: &mut Scene,
    tone: ToneParams,
    view: &LyricView,
) -> Result<RecordingSummary, RecordingError> {
    create_dir(&config.output_dir)?;
    create_dir(&config.frames_dir())?;

    let mut audio = OfflineAudio::recording(tone, config.audio_path())?;
    if !scene.start_singalong(&mut audio) {
        warn!("Sing-along did not start; recording visuals only");
    }

    let total = config.total_frames();
    let dt = config.frame_dt();
    let navigations_before = scene.navigations();
    let mut lyric_lines = Vec::new();

    info!(
        "Recording {} frames at {} fps to {}",
        total,
        config.fps,
        config.output_dir.display()
    );

    for frame_num in 0..total {
        let transitions = scene.step(dt, &mut audio);
        for line in view.observe(&transitions) {
            println!("{line}");
            lyric_lines.push(line);
        }

        let frame = scene.compose();
        image::save_buffer(
            config.frame_path(frame_num),
            frame.as_bytes(),
            frame.width(),
            frame.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|source| RecordingError::Frame {
            frame: frame_num,
            source,
        })?;

        audio.advance(dt)?;

        if frame_num > 0 && frame_num % config.fps.max(1) as usize == 0 {
            info!("Recorded {}/{} frames", frame_num, total);
        }
    }

    scene.shutdown(&mut audio);
    audio.finalize()?;
    info!("Recording complete: {} frames", total);

    Ok(RecordingSummary {
        frames: total,
        navigations: scene.navigations() - navigations_before,
        lyric_lines,
    })
}

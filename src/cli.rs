//! Command-line argument parsing.

use clap::Parser;
use glam::UVec2;

use crate::palette::Palette;
use crate::params::{
    BurstParams, FieldParams, NavigationParams, RecordingConfig, RenderConfig, SequencerParams,
};
use crate::scene::SceneConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Confetti")]
#[command(about = "Drifting neon shapes, particle bursts and a sing-along", long_about = None)]
pub struct Args {
    /// Number of drifting shapes in the background field
    #[arg(long, value_name = "N")]
    pub shapes: Option<usize>,

    /// Initial sing-along speed multiplier
    #[arg(long, value_name = "X", default_value = "1.0")]
    pub speed: f32,

    /// Record headlessly to PNG frames + WAV (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Auto-advance navigation interval; 0 disables
    #[arg(long, value_name = "SECONDS")]
    pub auto_advance: Option<f32>,

    /// Viewport width (pixels)
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Viewport height (pixels)
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,
}

impl Args {
    /// Window configuration with any size overrides applied
    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default();
        if let Some(width) = self.width {
            config.width_px = width.max(1);
        }
        if let Some(height) = self.height {
            config.height_px = height.max(1);
        }
        config
    }

    /// Scene configuration from defaults plus flags
    pub fn scene_config(&self) -> SceneConfig {
        let render = self.render_config();
        let mut field = FieldParams::default();
        if let Some(shapes) = self.shapes {
            field.shape_count = shapes;
        }
        let mut navigation = NavigationParams::default();
        if let Some(interval) = self.auto_advance {
            navigation.auto_advance_s = interval;
        }
        let sequencer = SequencerParams {
            speed_multiplier: self.speed,
            ..SequencerParams::default()
        };

        SceneConfig {
            size: UVec2::new(render.width_px, render.height_px),
            background: render.background,
            field,
            burst: BurstParams::default(),
            navigation,
            sequencer,
            palette: Palette::neon(),
        }
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.map(RecordingConfig::new)
    }
}

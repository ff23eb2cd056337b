//! Tunables for the field, bursts, navigation, tones and capture.
//!
//! Every field names its unit (px, px/s, rad/s, s, Hz, steps). Defaults are
//! the shipped look; the CLI overrides a handful of them.

mod audio;
mod burst;
mod field;
mod navigation;
mod render;

pub use audio::{audio_constants, SequencerParams, ToneParams};
pub use burst::BurstParams;
pub use field::{FieldParams, REFERENCE_FPS};
pub use navigation::NavigationParams;
pub use render::{RecordingConfig, RenderConfig};

//! Ambient shape field parameters.

/// Frame rate the per-frame drift and fade speeds are expressed against
pub const REFERENCE_FPS: f32 = 60.0;

/// Ambient field parameters
#[derive(Debug, Clone)]
pub struct FieldParams {
    /// Number of shapes kept alive in the field
    pub shape_count: usize,

    /// Smallest shape radius (pixels)
    pub radius_min_px: f32,

    /// Number of whole-pixel radius steps above the minimum (radius is 12..=33)
    pub radius_steps: u32,

    /// Upward drift speed range (pixels per second)
    /// 0.12..1.02 px per frame at 60 fps
    pub drift_speed_px_s: (f32, f32),

    /// Maximum absolute rotation speed (radians per second)
    /// 0.01 rad per frame at 60 fps
    pub max_rotation_speed_rad_s: f32,

    /// Outline stroke width (pixels)
    pub stroke_width_px: f32,

    /// Outline opacity (0..1)
    pub stroke_alpha: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            shape_count: 28,
            radius_min_px: 12.0,
            radius_steps: 22,
            drift_speed_px_s: (0.12 * REFERENCE_FPS, 1.02 * REFERENCE_FPS),
            max_rotation_speed_rad_s: 0.01 * REFERENCE_FPS,
            stroke_width_px: 2.2,
            stroke_alpha: 0.95,
        }
    }
}

impl FieldParams {
    /// Largest radius a shape can be assigned (exclusive upper bound)
    pub fn radius_max_px(&self) -> f32 {
        self.radius_min_px + self.radius_steps as f32
    }
}

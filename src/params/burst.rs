//! Particle burst parameters.

/// Particle burst parameters
#[derive(Debug, Clone)]
pub struct BurstParams {
    /// Particles created per burst
    pub particle_count: usize,

    /// Side of the square surface each burst draws into (pixels)
    pub surface_size_px: u32,

    /// Radial speed range (pixels per step)
    pub speed_px: (f32, f32),

    /// Particle disc radius range (pixels)
    pub radius_px: (f32, f32),

    /// Opacity lost per step; 1.0 / 0.02 = 50 steps to fade out
    pub fade_per_step: f32,

    /// Vertical offset of the burst anchor from the top of the window (pixels)
    pub anchor_offset_y_px: f32,
}

impl Default for BurstParams {
    fn default() -> Self {
        Self {
            particle_count: 26,
            surface_size_px: 260,
            speed_px: (2.0, 6.0),
            radius_px: (3.0, 9.0),
            fade_per_step: 0.02,
            anchor_offset_y_px: 60.0,
        }
    }
}

impl BurstParams {
    /// Steps until a particle at full opacity has faded out
    pub fn max_steps(&self) -> u32 {
        // Slack absorbs f32 error in 1/fade (1/0.02 is slightly above 50)
        (1.0 / self.fade_per_step.max(f32::EPSILON) - 1.0e-3).ceil() as u32
    }
}

//! Slide navigation: auto-advance cadence and the click that accompanies each advance.

/// Navigation parameters
#[derive(Debug, Clone)]
pub struct NavigationParams {
    /// Time between automatic advances (seconds); 0 disables auto-advance
    pub auto_advance_s: f32,

    /// Click pitch (Hz)
    pub click_frequency_hz: f32,

    /// Click length (seconds)
    pub click_duration_s: f32,

    /// Click level relative to a sung note (linear)
    pub click_level: f32,
}

impl Default for NavigationParams {
    fn default() -> Self {
        Self {
            auto_advance_s: 4.2,
            click_frequency_hz: 1320.0,
            click_duration_s: 0.05,
            click_level: 0.38,
        }
    }
}

impl NavigationParams {
    /// Auto-advance interval, if enabled
    pub fn auto_advance_interval(&self) -> Option<f32> {
        (self.auto_advance_s.is_finite() && self.auto_advance_s > 0.0)
            .then_some(self.auto_advance_s)
    }
}

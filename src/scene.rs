//! Everything one frame needs: field, bursts, sing-along and the layers they draw into.
//!
//! Both the windowed app and the headless recorder drive a `Scene`; they only
//! differ in where ticks come from and where the composited frame goes.

use glam::UVec2;

use crate::audio::{Tone, ToneSink};
use crate::burst::BurstSpawner;
use crate::canvas::PixelCanvas;
use crate::compositor::Compositor;
use crate::field::FieldSimulator;
use crate::frame_loop::FrameLoop;
use crate::palette::{Color, Palette};
use crate::params::{BurstParams, FieldParams, NavigationParams, SequencerParams};
use crate::sequencer::{NoteSequencer, NoteSpec, Transition};

/// Scene construction options
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub size: UVec2,
    pub background: Color,
    pub field: FieldParams,
    pub burst: BurstParams,
    pub navigation: NavigationParams,
    pub sequencer: SequencerParams,
    pub palette: Palette,
}

/// Owns every simulator plus the surfaces they render into
pub struct Scene {
    size: UVec2,
    background: Color,
    surfaces: Compositor,
    frames: FrameLoop,
    field: FieldSimulator,
    bursts: BurstSpawner,
    sequencer: NoteSequencer,
    speed_step: f32,
    navigation: NavigationParams,
    /// Time since the last automatic advance (seconds)
    auto_elapsed_s: f32,
    auto_paused: bool,
    navigations: usize,
    frame: PixelCanvas,
}

impl Scene {
    /// Build the scene and start the field
    pub fn new(config: SceneConfig, chain: Vec<NoteSpec>) -> Self {
        let size = config.size.max(UVec2::ONE);
        let mut surfaces = Compositor::new();
        let shape_count = config.field.shape_count;
        let mut field = FieldSimulator::new(config.field, config.palette.clone());
        field.start(&mut surfaces, size, shape_count);

        let mut sequencer = NoteSequencer::build(chain);
        sequencer.set_speed(config.sequencer.speed_multiplier);
        sequencer.set_completion_grace(config.sequencer.completion_grace_s);

        Self {
            size,
            background: config.background,
            surfaces,
            frames: FrameLoop::new(),
            field,
            bursts: BurstSpawner::new(config.burst, config.palette),
            sequencer,
            speed_step: config.sequencer.speed_step,
            navigation: config.navigation,
            auto_elapsed_s: 0.0,
            auto_paused: false,
            navigations: 0,
            frame: PixelCanvas::new(size),
        }
    }

    /// Advance one frame: sing-along, auto-advance, field, then bursts.
    ///
    /// Returns the sequencer transitions that happened during the frame.
    pub fn step<S: ToneSink + ?Sized>(&mut self, dt: f32, audio: &mut S) -> Vec<Transition> {
        self.sequencer.pump(audio);
        self.sequencer.tick(dt, audio);
        self.auto_advance(dt, audio);
        self.field.step(dt, &mut self.surfaces);
        self.frames.tick(dt, &mut self.surfaces);
        self.sequencer.drain_transitions()
    }

    /// Fires at most one navigation per frame, however long the frame was
    fn auto_advance<S: ToneSink + ?Sized>(&mut self, dt: f32, audio: &mut S) {
        let Some(interval) = self.navigation.auto_advance_interval() else {
            return;
        };
        if self.auto_paused || !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.auto_elapsed_s += dt;
        if self.auto_elapsed_s >= interval {
            self.auto_elapsed_s = self.auto_elapsed_s.rem_euclid(interval);
            self.navigate(audio);
        }
    }

    /// Composite every layer into the frame buffer and return it
    pub fn compose(&mut self) -> &PixelCanvas {
        self.surfaces.compose(self.background, &mut self.frame);
        &self.frame
    }

    /// Forward/back navigation: a click plus one burst at the anchor point.
    ///
    /// The burst fires even when the click cannot be played.
    pub fn navigate<S: ToneSink + ?Sized>(&mut self, audio: &mut S) {
        let click = Tone::new(
            self.navigation.click_frequency_hz,
            self.navigation.click_duration_s,
        )
        .with_level(self.navigation.click_level);
        if let Err(e) = audio.play_tone(click) {
            log::debug!("navigation click unavailable: {}", e);
        }

        let x = self.size.x as f32 / 2.0;
        let y = self.bursts.params().anchor_offset_y_px;
        self.burst_at(x, y);
        self.navigations += 1;
    }

    pub fn burst_at(&mut self, x: f32, y: f32) {
        self.bursts
            .spawn_at(x, y, &mut self.frames, &mut self.surfaces);
    }

    /// Pause or resume auto-advance. Returns `true` if it is now paused.
    ///
    /// Resuming restarts the interval from zero.
    pub fn toggle_auto_advance(&mut self) -> bool {
        self.auto_paused = !self.auto_paused;
        self.auto_elapsed_s = 0.0;
        self.auto_paused
    }

    pub fn auto_advance_paused(&self) -> bool {
        self.auto_paused
    }

    /// Navigations so far, manual and automatic
    pub fn navigations(&self) -> usize {
        self.navigations
    }

    /// Start gesture for the sing-along; ignored while it is running
    pub fn start_singalong<S: ToneSink + ?Sized>(&mut self, audio: &mut S) -> bool {
        self.sequencer.start(audio)
    }

    /// Nudge the speed multiplier by `steps` key presses
    pub fn nudge_speed(&mut self, steps: i32) -> f32 {
        let target = self.sequencer.speed() + steps as f32 * self.speed_step;
        self.sequencer.set_speed(target)
    }

    pub fn set_speed(&mut self, multiplier: f32) -> f32 {
        self.sequencer.set_speed(multiplier)
    }

    /// Viewport changed; the field keeps running
    pub fn resize(&mut self, size: UVec2) {
        let size = size.max(UVec2::ONE);
        self.size = size;
        self.field.on_resize(size, &mut self.surfaces);
        self.frame.resize(size);
    }

    /// Stop every loop and release every surface
    pub fn shutdown<S: ToneSink + ?Sized>(&mut self, audio: &mut S) {
        self.sequencer.stop(audio);
        self.frames.clear(&mut self.surfaces);
        self.field.stop(&mut self.surfaces);
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn sequencer(&self) -> &NoteSequencer {
        &self.sequencer
    }

    pub fn field(&self) -> &FieldSimulator {
        &self.field
    }

    /// Bursts still animating
    pub fn live_bursts(&self) -> usize {
        self.frames.len()
    }

    pub fn surfaces(&self) -> &Compositor {
        &self.surfaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{OfflineAudio, ToneId};
    use crate::error::AudioError;
    use crate::params::ToneParams;
    use crate::sequencer::happy_birthday;

    const FRAME: f32 = 1.0 / 60.0;

    fn config() -> SceneConfig {
        SceneConfig {
            size: UVec2::new(320, 200),
            background: Color::rgb(0, 0, 0),
            field: FieldParams::default(),
            burst: BurstParams::default(),
            navigation: NavigationParams::default(),
            sequencer: SequencerParams::default(),
            palette: Palette::neon(),
        }
    }

    fn scene() -> Scene {
        Scene::new(config(), happy_birthday())
    }

    fn audio() -> OfflineAudio {
        OfflineAudio::new(ToneParams::default()).unwrap()
    }

    /// Sink with no output device
    struct Muted;

    impl ToneSink for Muted {
        fn play_tone(&mut self, _tone: Tone) -> Result<ToneId, AudioError> {
            Err(AudioError::NoDevice)
        }
        fn cancel_tone(&mut self, _id: ToneId) {}
        fn poll_finished(&mut self) -> Vec<ToneId> {
            Vec::new()
        }
    }

    #[test]
    fn test_bursts_come_and_go_while_field_keeps_running() {
        let mut scene = scene();
        let mut audio = audio();
        scene.navigate(&mut audio);
        scene.navigate(&mut audio);
        assert_eq!(scene.live_bursts(), 2);
        assert_eq!(scene.surfaces().len(), 3);

        for _ in 0..50 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.live_bursts(), 0);
        assert_eq!(scene.surfaces().len(), 1);
        assert!(scene.field().is_running());
    }

    #[test]
    fn test_navigation_clicks_through_the_sink() {
        let mut scene = scene();
        let mut audio = audio();
        scene.navigate(&mut audio);
        assert_eq!(audio.active_voices(), 1);

        audio.advance(0.06).unwrap();
        assert_eq!(audio.poll_finished().len(), 1);
        assert_eq!(scene.navigations(), 1);
    }

    #[test]
    fn test_navigation_bursts_without_audio() {
        let mut scene = scene();
        scene.navigate(&mut Muted);
        assert_eq!(scene.live_bursts(), 1);
    }

    #[test]
    fn test_auto_advance_fires_every_interval() {
        let mut scene = scene();
        let mut audio = audio();

        for _ in 0..240 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.navigations(), 0);

        // 4.2 s lands between frame 252 and 253
        for _ in 240..260 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.navigations(), 1);
        assert_eq!(scene.live_bursts(), 1);

        for _ in 260..520 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.navigations(), 2);
    }

    #[test]
    fn test_paused_auto_advance_restarts_on_resume() {
        let mut scene = scene();
        let mut audio = audio();
        for _ in 0..200 {
            scene.step(FRAME, &mut audio);
        }

        assert!(scene.toggle_auto_advance());
        assert!(scene.auto_advance_paused());
        for _ in 0..600 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.navigations(), 0);

        assert!(!scene.toggle_auto_advance());
        for _ in 0..200 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.navigations(), 0);
        for _ in 0..60 {
            scene.step(FRAME, &mut audio);
        }
        assert_eq!(scene.navigations(), 1);
    }

    #[test]
    fn test_long_frame_fires_a_single_advance() {
        let mut scene = scene();
        scene.step(30.0, &mut Muted);
        assert_eq!(scene.navigations(), 1);
    }

    #[test]
    fn test_resize_keeps_field_and_resizes_frame() {
        let mut scene = scene();
        scene.resize(UVec2::new(0, 90));
        assert_eq!(scene.size(), UVec2::new(1, 90));
        assert!(scene.field().is_running());
        assert_eq!(scene.compose().width(), 1);
    }

    #[test]
    fn test_speed_nudges_clamp_at_minimum() {
        let mut scene = scene();
        assert!((scene.nudge_speed(3) - 1.3).abs() < 1e-5);
        assert_eq!(
            scene.nudge_speed(-100),
            crate::params::audio_constants::MIN_SPEED_MULTIPLIER
        );
    }

    #[test]
    fn test_singalong_transitions_surface_through_step() {
        let mut scene = scene();
        let mut audio = audio();
        scene.set_speed(0.05);
        assert!(scene.start_singalong(&mut audio));

        let mut playing = 0;
        let mut first = scene.step(0.0, &mut audio);
        for _ in 0..200 {
            playing += first
                .iter()
                .filter(|t| matches!(t, Transition::Playing { .. }))
                .count();
            audio.advance(FRAME).unwrap();
            first = scene.step(FRAME, &mut audio);
        }
        playing += first
            .iter()
            .filter(|t| matches!(t, Transition::Playing { .. }))
            .count();

        assert_eq!(playing, 24);
        assert!(!scene.sequencer().is_running());

        scene.shutdown(&mut audio);
        assert!(scene.surfaces().is_empty());
    }
}

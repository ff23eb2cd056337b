//! Continuous field simulator owning the shape arena and its surface.

use glam::{IVec2, UVec2, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::shape::Shape;
use crate::canvas::Canvas;
use crate::compositor::{Compositor, SurfaceId};
use crate::palette::Palette;
use crate::params::FieldParams;

/// Fixed-capacity arena of shapes drawn into one full-window surface
pub struct FieldSimulator {
    shapes: Vec<Shape>,
    bounds: Vec2,
    params: FieldParams,
    palette: Palette,
    rng: StdRng,
    surface: Option<SurfaceId>,
    resets: u64,
}

impl FieldSimulator {
    /// Create an idle field; nothing is allocated until `start` or `initialize`
    pub fn new(params: FieldParams, palette: Palette) -> Self {
        Self::with_rng(params, palette, StdRng::from_entropy())
    }

    /// Create an idle field drawing randomness from `rng`
    pub fn with_rng(params: FieldParams, palette: Palette, rng: StdRng) -> Self {
        Self {
            shapes: Vec::new(),
            bounds: Vec2::ONE,
            params,
            palette,
            rng,
            surface: None,
            resets: 0,
        }
    }

    /// Fill the arena with `count` shapes randomized inside `bounds`
    pub fn initialize(&mut self, count: usize, bounds: Vec2) {
        self.bounds = clamp_bounds(bounds);
        self.shapes.clear();
        self.shapes.reserve_exact(count);
        for _ in 0..count {
            let shape = Shape::random(&mut self.rng, self.bounds, &self.params, &self.palette);
            self.shapes.push(shape);
        }
    }

    /// Allocate the field surface and populate the arena.
    ///
    /// Calling `start` on a running field is ignored.
    pub fn start(&mut self, surfaces: &mut Compositor, size: UVec2, count: usize) {
        if self.is_running() {
            log::warn!("field already running, ignoring start");
            return;
        }
        let size = size.max(UVec2::ONE);
        self.surface = Some(surfaces.allocate(size, IVec2::ZERO));
        self.initialize(count, size.as_vec2());
        log::info!(
            "Field: {} shapes in {}x{}",
            self.shapes.len(),
            size.x,
            size.y
        );
    }

    /// Advance every shape by `dt` seconds, recycling those that left the top.
    ///
    /// Returns the number of shapes reset during this update.
    pub fn update(&mut self, dt: f32) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut reset = 0;
        for shape in &mut self.shapes {
            shape.advance(dt);
            if shape.has_left_top() {
                shape.reset(&mut self.rng, self.bounds, &self.params, &self.palette);
                reset += 1;
            }
        }
        self.resets += reset as u64;
        reset
    }

    /// Stroke every shape onto `canvas`
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for shape in &self.shapes {
            shape.draw(canvas, self.params.stroke_width_px, self.params.stroke_alpha);
        }
    }

    /// One frame: update, then clear and redraw the whole field surface.
    ///
    /// No-op when the field is not running or its surface is gone.
    pub fn step(&mut self, dt: f32, surfaces: &mut Compositor) -> usize {
        let Some(id) = self.surface else {
            return 0;
        };
        let reset = self.update(dt);
        if let Some(canvas) = surfaces.canvas_mut(id) {
            canvas.clear();
            self.draw(canvas);
        }
        reset
    }

    /// Update the bounds used by future resets; bounds below 1x1 are clamped
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = clamp_bounds(bounds);
    }

    /// Viewport changed: resize bounds and the field surface without stopping
    pub fn on_resize(&mut self, size: UVec2, surfaces: &mut Compositor) {
        let size = size.max(UVec2::ONE);
        self.resize(size.as_vec2());
        if let Some(id) = self.surface {
            surfaces.resize(id, size);
        }
    }

    /// Tear down: release the surface and drop every shape. Safe to repeat.
    pub fn stop(&mut self, surfaces: &mut Compositor) {
        if let Some(id) = self.surface.take() {
            surfaces.release(id);
            log::info!("Field stopped after {} resets", self.resets);
        }
        self.shapes.clear();
    }

    pub fn is_running(&self) -> bool {
        self.surface.is_some()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Total shapes recycled since creation
    pub fn total_resets(&self) -> u64 {
        self.resets
    }
}

fn clamp_bounds(bounds: Vec2) -> Vec2 {
    // f32::max maps NaN to the other operand
    bounds.max(Vec2::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::REFERENCE_FPS;
    use approx::assert_relative_eq;

    const FRAME: f32 = 1.0 / REFERENCE_FPS;

    fn field(seed: u64) -> FieldSimulator {
        FieldSimulator::with_rng(
            FieldParams::default(),
            Palette::neon(),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_initialize_creates_count_shapes_in_bounds() {
        let mut sim = field(1);
        sim.initialize(28, Vec2::new(800.0, 600.0));

        assert_eq!(sim.shapes().len(), 28);
        for shape in sim.shapes() {
            assert!(shape.position.x < 800.0 && shape.position.y < 600.0);
        }
    }

    #[test]
    fn test_attributes_fixed_between_resets() {
        let mut sim = field(2);
        // Tall enough that nothing reaches the top within the run
        sim.initialize(28, Vec2::new(800.0, 1.0e6));
        for shape in &mut sim.shapes {
            shape.position.y += 1.0e5;
        }
        let before: Vec<(f32, f32, f32)> = sim
            .shapes()
            .iter()
            .map(|s| (s.radius, s.drift_speed, s.rotation_speed))
            .collect();

        for _ in 0..600 {
            assert_eq!(sim.update(FRAME), 0);
        }

        let params = FieldParams::default();
        for (shape, (radius, drift, spin)) in sim.shapes().iter().zip(before) {
            assert_eq!(shape.radius, radius);
            assert_eq!(shape.drift_speed, drift);
            assert_eq!(shape.rotation_speed, spin);
            assert!(shape.radius >= params.radius_min_px && shape.radius < params.radius_max_px());
        }
    }

    #[test]
    fn test_one_step_moves_one_reference_frame() {
        let mut sim = field(3);
        sim.initialize(1, Vec2::new(100.0, 1.0e4));
        sim.shapes[0].position.y = 5000.0;
        let speed_per_frame = sim.shapes()[0].drift_speed / REFERENCE_FPS;

        sim.update(FRAME);

        assert_relative_eq!(
            sim.shapes()[0].position.y,
            5000.0 - speed_per_frame,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_crossing_top_resets_exactly_once() {
        let mut sim = field(4);
        let bounds = Vec2::new(640.0, 1.0e4);
        sim.initialize(5, bounds);
        for shape in &mut sim.shapes[1..] {
            shape.position.y = 5000.0;
        }
        let crossing = &mut sim.shapes[0];
        let step = crossing.drift_speed * FRAME;
        crossing.position.y = -crossing.radius + step * 0.5;

        assert_eq!(sim.update(FRAME), 1);
        let recycled = &sim.shapes()[0];
        assert!(recycled.position.x >= 0.0 && recycled.position.x < bounds.x);
        assert!(recycled.position.y >= 0.0 && recycled.position.y < bounds.y);

        assert_eq!(sim.update(FRAME), 0);
        assert_eq!(sim.total_resets(), 1);
    }

    #[test]
    fn test_reset_uses_resized_bounds() {
        let mut sim = field(5);
        sim.initialize(1, Vec2::new(2000.0, 2000.0));
        sim.resize(Vec2::new(50.0, 40.0));
        sim.shapes[0].position.y = -1000.0;

        sim.update(FRAME);

        let shape = &sim.shapes()[0];
        assert!(shape.position.x < 50.0 && shape.position.y < 40.0);
    }

    #[test]
    fn test_degenerate_bounds_are_clamped() {
        let mut sim = field(6);
        sim.initialize(10, Vec2::new(0.0, -5.0));
        assert_eq!(sim.bounds(), Vec2::ONE);

        sim.resize(Vec2::new(f32::NAN, 0.0));
        assert_eq!(sim.bounds(), Vec2::ONE);

        for _ in 0..200 {
            sim.update(FRAME);
        }
        for shape in sim.shapes() {
            assert!(shape.position.is_finite());
        }
    }

    #[test]
    fn test_step_redraws_surface_and_stop_releases_it() {
        let mut surfaces = Compositor::new();
        let mut sim = field(7);
        sim.start(&mut surfaces, UVec2::new(320, 240), 28);
        let id = sim.surface().unwrap();

        sim.step(FRAME, &mut surfaces);
        assert!(surfaces.canvas(id).unwrap().has_ink());

        sim.on_resize(UVec2::new(200, 100), &mut surfaces);
        assert!(sim.is_running());
        assert_eq!(surfaces.canvas(id).unwrap().width(), 200);
        assert_eq!(sim.bounds(), Vec2::new(200.0, 100.0));

        sim.stop(&mut surfaces);
        sim.stop(&mut surfaces);
        assert!(!sim.is_running());
        assert!(surfaces.is_empty());
        assert_eq!(sim.step(FRAME, &mut surfaces), 0);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut sim = field(8);
        sim.initialize(3, Vec2::new(100.0, 100.0));
        let before = sim.shapes().to_vec();
        sim.update(-1.0);
        sim.update(f32::NAN);
        assert_eq!(sim.shapes(), &before[..]);
    }
}

//! Self-terminating particle bursts.
//!
//! Each burst owns a private square surface centered on its spawn point,
//! expands its particles radially while they fade, and releases the surface
//! once every particle is dead.

use std::f32::consts::TAU;

use glam::{UVec2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{Canvas, Paint};
use crate::compositor::{Compositor, SurfaceId};
use crate::frame_loop::{FrameLoop, FrameTask, TaskId, TaskStatus};
use crate::palette::{Color, Palette};
use crate::params::BurstParams;
use crate::random;

/// Opacity at or below this counts as fully faded; absorbs the f32 drift of
/// repeated fades so a default burst ends on exactly step 50, not 51
const DEAD_OPACITY: f32 = 1.0e-4;

/// One expanding, fading disc
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Offset from the burst center (pixels)
    pub offset: Vec2,
    /// Direction of travel (radians)
    pub angle: f32,
    /// Pixels travelled per step
    pub speed: f32,
    pub radius: f32,
    pub color: Color,
    /// 1.0 at spawn, only ever decreases
    pub opacity: f32,
}

impl Particle {
    fn random<R: Rng + ?Sized>(rng: &mut R, params: &BurstParams, palette: &Palette) -> Self {
        Self {
            offset: Vec2::ZERO,
            angle: random::within(rng, TAU),
            speed: random::uniform(rng, params.speed_px),
            radius: random::uniform(rng, params.radius_px),
            color: palette.pick(rng),
            opacity: 1.0,
        }
    }

    fn step(&mut self, fade: f32) {
        self.offset += Vec2::from_angle(self.angle) * self.speed;
        self.opacity -= fade;
    }

    pub fn is_dead(&self) -> bool {
        self.opacity <= DEAD_OPACITY
    }
}

/// A single burst and its private surface
#[derive(Debug)]
pub struct Burst {
    center: Vec2,
    particles: Vec<Particle>,
    surface: Option<SurfaceId>,
    surface_size: UVec2,
    fade_per_step: f32,
    steps: u32,
}

impl Burst {
    /// Create a burst at `center`, allocating its surface
    pub fn spawn<R: Rng + ?Sized>(
        center: Vec2,
        params: &BurstParams,
        palette: &Palette,
        rng: &mut R,
        surfaces: &mut Compositor,
    ) -> Self {
        let side = params.surface_size_px.max(1);
        let surface_size = UVec2::splat(side);
        let origin = (center - surface_size.as_vec2() * 0.5).round().as_ivec2();
        let surface = surfaces.allocate(surface_size, origin);
        let particles = (0..params.particle_count)
            .map(|_| Particle::random(rng, params, palette))
            .collect();

        Self {
            center,
            particles,
            surface: Some(surface),
            surface_size,
            fade_per_step: params.fade_per_step.max(f32::EPSILON),
            steps: 0,
        }
    }

    /// Advance one step and redraw. Tears the surface down when all particles are dead.
    pub fn step(&mut self, surfaces: &mut Compositor) -> TaskStatus {
        if self.is_finished() {
            self.teardown(surfaces);
            return TaskStatus::Done;
        }

        self.steps += 1;
        for particle in &mut self.particles {
            particle.step(self.fade_per_step);
        }

        if let Some(canvas) = self.surface.and_then(|id| surfaces.canvas_mut(id)) {
            canvas.clear();
            let local_center = self.surface_size.as_vec2() * 0.5;
            for particle in &self.particles {
                let paint = Paint {
                    color: particle.color,
                    alpha: particle.opacity.max(0.0),
                };
                canvas.fill_circle(local_center + particle.offset, particle.radius, paint);
            }
        }

        if self.is_finished() {
            self.teardown(surfaces);
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }

    /// Release the surface; tolerates it already being gone
    pub fn teardown(&mut self, surfaces: &mut Compositor) {
        if let Some(id) = self.surface.take() {
            surfaces.release(id);
            log::debug!(
                "burst at ({:.0}, {:.0}) done after {} steps",
                self.center.x,
                self.center.y,
                self.steps
            );
        }
    }

    pub fn is_finished(&self) -> bool {
        self.particles.iter().all(Particle::is_dead)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Screen position of a particle
    pub fn position_of(&self, particle: &Particle) -> Vec2 {
        self.center + particle.offset
    }

    pub fn alive(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_dead()).count()
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }
}

impl FrameTask for Burst {
    fn tick(&mut self, _dt: f32, surfaces: &mut Compositor) -> TaskStatus {
        self.step(surfaces)
    }

    fn teardown(&mut self, surfaces: &mut Compositor) {
        Burst::teardown(self, surfaces);
    }
}

/// Spawns independent bursts into a frame loop
pub struct BurstSpawner {
    params: BurstParams,
    palette: Palette,
    rng: StdRng,
}

impl BurstSpawner {
    pub fn new(params: BurstParams, palette: Palette) -> Self {
        Self::with_rng(params, palette, StdRng::from_entropy())
    }

    pub fn with_rng(params: BurstParams, palette: Palette, rng: StdRng) -> Self {
        Self {
            params,
            palette,
            rng,
        }
    }

    /// Build a burst at `(x, y)` without scheduling it
    pub fn burst_at(&mut self, x: f32, y: f32, surfaces: &mut Compositor) -> Burst {
        Burst::spawn(
            Vec2::new(x, y),
            &self.params,
            &self.palette,
            &mut self.rng,
            surfaces,
        )
    }

    /// Fire and forget: the burst runs on `frames` until it finishes
    pub fn spawn_at(
        &mut self,
        x: f32,
        y: f32,
        frames: &mut FrameLoop,
        surfaces: &mut Compositor,
    ) -> TaskId {
        log::debug!("burst at ({:.0}, {:.0})", x, y);
        let burst = self.burst_at(x, y, surfaces);
        frames.register(Box::new(burst))
    }

    pub fn params(&self) -> &BurstParams {
        &self.params
    }
}

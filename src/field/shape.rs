//! Single drifting glyph and its outline geometry.

use std::f32::consts::TAU;

use glam::{Affine2, Vec2};
use rand::Rng;

use crate::canvas::{Canvas, Paint, Stroke};
use crate::palette::{Color, Palette};
use crate::params::FieldParams;
use crate::random;

/// Outline drawn for a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Triangle,
    Circle,
    Square,
    Cross,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Triangle,
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Cross,
    ];

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// One shape in the field arena
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Center (pixels, y grows downward)
    pub position: Vec2,
    /// Size in pixels; fixed until the next reset
    pub radius: f32,
    pub kind: ShapeKind,
    /// Orientation (radians)
    pub rotation: f32,
    /// Upward speed (pixels per second); fixed until the next reset
    pub drift_speed: f32,
    /// Signed angular speed (radians per second)
    pub rotation_speed: f32,
    pub color: Color,
}

impl Shape {
    /// Fully randomized shape anywhere inside `bounds`
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        bounds: Vec2,
        params: &FieldParams,
        palette: &Palette,
    ) -> Self {
        let radius_step = if params.radius_steps > 0 {
            rng.gen_range(0..params.radius_steps)
        } else {
            0
        };
        let spin = params.max_rotation_speed_rad_s.abs();

        Self {
            position: Vec2::new(
                random::within(rng, bounds.x),
                random::within(rng, bounds.y),
            ),
            radius: params.radius_min_px + radius_step as f32,
            kind: ShapeKind::random(rng),
            rotation: random::within(rng, TAU),
            drift_speed: random::uniform(rng, params.drift_speed_px_s),
            rotation_speed: random::uniform(rng, (-spin, spin)),
            color: palette.pick(rng),
        }
    }

    /// Re-randomize every attribute in place
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        bounds: Vec2,
        params: &FieldParams,
        palette: &Palette,
    ) {
        *self = Self::random(rng, bounds, params, palette);
    }

    /// Drift up and spin for `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.position.y -= self.drift_speed * dt;
        self.rotation = (self.rotation + self.rotation_speed * dt).rem_euclid(TAU);
    }

    /// Fully above the top edge
    pub fn has_left_top(&self) -> bool {
        self.position.y < -self.radius
    }

    /// Shape-local to canvas transform
    pub fn frame(&self) -> Affine2 {
        Affine2::from_angle_translation(self.rotation, self.position)
    }

    /// Stroke the outline in the shape's rotated frame
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, width: f32, alpha: f32) {
        let stroke = Stroke {
            paint: Paint {
                color: self.color,
                alpha,
            },
            width,
        };
        let frame = self.frame();
        let s = self.radius;
        let to_canvas = |x: f32, y: f32| frame.transform_point2(Vec2::new(x, y));

        match self.kind {
            ShapeKind::Triangle => {
                let points = [
                    to_canvas(0.0, -s),
                    to_canvas(s * 0.9, s * 0.75),
                    to_canvas(-s * 0.9, s * 0.75),
                ];
                canvas.stroke_polygon(&points, stroke);
            }
            ShapeKind::Circle => {
                canvas.stroke_circle(self.position, s * 0.9, stroke);
            }
            ShapeKind::Square => {
                let half = s * 1.4 / 2.0;
                let points = [
                    to_canvas(-half, -half),
                    to_canvas(half, -half),
                    to_canvas(half, half),
                    to_canvas(-half, half),
                ];
                canvas.stroke_polygon(&points, stroke);
            }
            ShapeKind::Cross => {
                let half = s * 1.3 / 2.0;
                canvas.stroke_line(to_canvas(-half, -half), to_canvas(half, half), stroke);
                canvas.stroke_line(to_canvas(half, -half), to_canvas(-half, half), stroke);
            }
        }
    }
}

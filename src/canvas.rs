//! CPU drawing surface with anti-aliased strokes and discs.
//!
//! The simulators only talk to the [`Canvas`] trait; [`PixelCanvas`] is the
//! RGBA8 implementation the compositor, presenter and recorder share.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, UVec2, Vec2};

use crate::palette::Color;

/// RGBA8 pixel, straight (non-premultiplied) alpha
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub fn opaque(color: Color) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            a: 255,
        }
    }
}

/// Color plus opacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub alpha: f32,
}

/// Outline style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
}

/// Minimal 2D drawing surface
pub trait Canvas {
    /// Pixel dimensions
    fn size(&self) -> UVec2;

    /// Reset every pixel to transparent
    fn clear(&mut self);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: Stroke);

    /// Ring centered on `center`
    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint);

    /// Closed outline through `points`
    fn stroke_polygon(&mut self, points: &[Vec2], stroke: Stroke) {
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.stroke_line(from, to, stroke);
        }
    }
}

/// Number of pixels in a `size` canvas, computed without `u32` overflow
fn pixel_count(size: UVec2) -> usize {
    size.x as usize * size.y as usize
}

/// Heap-backed RGBA8 canvas
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelCanvas {
    /// Create a transparent canvas; dimensions are clamped to at least 1x1
    pub fn new(size: UVec2) -> Self {
        let size = size.max(UVec2::ONE);
        Self {
            width: size.x,
            height: size.y,
            pixels: vec![Rgba::TRANSPARENT; pixel_count(size)],
        }
    }

    /// Resize and clear (contents are not preserved)
    pub fn resize(&mut self, size: UVec2) {
        let size = size.max(UVec2::ONE);
        self.width = size.x;
        self.height = size.y;
        self.pixels.clear();
        self.pixels
            .resize(pixel_count(size), Rgba::TRANSPARENT);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Row-major offset of an in-bounds pixel
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Fill every pixel with an opaque color
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(Rgba::opaque(color));
    }

    /// Raw RGBA8 bytes, row-major, tightly packed
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// True if any pixel has non-zero alpha
    pub fn has_ink(&self) -> bool {
        self.pixels.iter().any(|p| p.a > 0)
    }

    /// Source-over composite of `self` onto `target` with top-left at `origin`
    pub fn draw_onto(&self, target: &mut PixelCanvas, origin: IVec2) {
        for y in 0..self.height as i32 {
            let ty = origin.y + y;
            if ty < 0 || ty >= target.height as i32 {
                continue;
            }
            for x in 0..self.width as i32 {
                let tx = origin.x + x;
                if tx < 0 || tx >= target.width as i32 {
                    continue;
                }
                let src = self.pixels[self.index(x as u32, y as u32)];
                if src.a == 0 {
                    continue;
                }
                let alpha = src.a as f32 / 255.0;
                let color = Color::rgb(src.r, src.g, src.b);
                target.blend(tx as u32, ty as u32, color, alpha);
            }
        }
    }

    /// Source-over blend of one pixel
    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let index = self.index(x, y);
        let dst = &mut self.pixels[index];
        let dst_a = dst.a as f32 / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            let value = (s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba {
            r: mix(color.r, dst.r),
            g: mix(color.g, dst.g),
            b: mix(color.b, dst.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        };
    }

    /// Visit pixels inside `[min, max]` whose centers get non-zero coverage
    fn cover<F>(&mut self, min: Vec2, max: Vec2, paint: Paint, coverage: F)
    where
        F: Fn(Vec2) -> f32,
    {
        if !(min.is_finite() && max.is_finite()) {
            return;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let c = coverage(center).clamp(0.0, 1.0);
                if c > 0.0 {
                    self.blend(x, y, paint.color, paint.alpha * c);
                }
            }
        }
    }
}

impl Canvas for PixelCanvas {
    fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let half = stroke.width * 0.5;
        let pad = Vec2::splat(half + 1.0);
        let segment = to - from;
        let len_sq = segment.length_squared();
        self.cover(from.min(to) - pad, from.max(to) + pad, stroke.paint, |p| {
            let t = if len_sq > 0.0 {
                ((p - from).dot(segment) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let distance = p.distance(from + segment * t);
            half + 0.5 - distance
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke) {
        let half = stroke.width * 0.5;
        let pad = Vec2::splat(radius.abs() + half + 1.0);
        self.cover(center - pad, center + pad, stroke.paint, |p| {
            let distance = (p.distance(center) - radius).abs();
            half + 0.5 - distance
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        let pad = Vec2::splat(radius.abs() + 1.0);
        self.cover(center - pad, center + pad, paint, |p| {
            radius + 0.5 - p.distance(center)
        });
    }
}

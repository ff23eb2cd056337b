//! Layer host owning every rendering surface.
//!
//! The field and each burst allocate their own surface here and are the only
//! writers to it. Layers composite in allocation order, so bursts spawned
//! after the field draw on top of it.

use std::collections::BTreeMap;

use glam::{IVec2, UVec2};

use crate::canvas::PixelCanvas;
use crate::palette::Color;

/// Handle to an allocated surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(u64);

/// One positioned surface
#[derive(Debug)]
struct Layer {
    canvas: PixelCanvas,
    origin: IVec2,
}

/// Owns all surfaces and flattens them into a frame
#[derive(Debug, Default)]
pub struct Compositor {
    layers: BTreeMap<SurfaceId, Layer>,
    next_id: u64,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a transparent surface with its top-left corner at `origin`
    pub fn allocate(&mut self, size: UVec2, origin: IVec2) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.layers.insert(
            id,
            Layer {
                canvas: PixelCanvas::new(size),
                origin,
            },
        );
        id
    }

    /// Remove a surface. Returns `false` if it was already gone.
    pub fn release(&mut self, id: SurfaceId) -> bool {
        let removed = self.layers.remove(&id).is_some();
        if !removed {
            log::debug!("surface {:?} already released", id);
        }
        removed
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn canvas(&self, id: SurfaceId) -> Option<&PixelCanvas> {
        self.layers.get(&id).map(|layer| &layer.canvas)
    }

    pub fn canvas_mut(&mut self, id: SurfaceId) -> Option<&mut PixelCanvas> {
        self.layers.get_mut(&id).map(|layer| &mut layer.canvas)
    }

    /// Resize a surface in place (contents cleared). No-op for unknown ids.
    pub fn resize(&mut self, id: SurfaceId, size: UVec2) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.canvas.resize(size);
        }
    }

    pub fn origin(&self, id: SurfaceId) -> Option<IVec2> {
        self.layers.get(&id).map(|layer| layer.origin)
    }

    /// Number of live surfaces
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Flatten every layer over `background` into `target`
    pub fn compose(&self, background: Color, target: &mut PixelCanvas) {
        target.fill(background);
        for layer in self.layers.values() {
            layer.canvas.draw_onto(target, layer.origin);
        }
    }
}

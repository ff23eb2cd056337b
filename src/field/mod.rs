//! Ambient field of drifting, rotating outlined shapes.

mod shape;
mod system;

// Re-export public types
pub use shape::{Shape, ShapeKind};
pub use system::FieldSimulator;

//! Shared types for fractaline: colors, generated geometry, and the
//! versioned buffer-layout schema.
//!
//! # Invariants
//! - Slot numbers and color-mode codes are defined once, in [`schema`].
//! - Geometry is immutable once produced by a generator.

pub mod geometry;
pub mod schema;
pub mod types;

pub use geometry::{GeometryBuffer, GeometryError, gradient_position};
pub use schema::{BufferRole, ColorMode, LayoutGeneration, Primitive, SCHEMA_VERSION};
pub use types::{Point, Rgba};

pub fn crate_info() -> &'static str {
    "fractaline-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}

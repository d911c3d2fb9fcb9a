//! Color Gradient Engine.
//!
//! A [`Gradient`] is an ordered list of [`ColorStop`]s defining a color
//! function over `[0, 1]`. [`resolve`] and [`resolve_many`] evaluate it on the
//! CPU; [`Gradient::pack`] plus [`wgsl::gradient_functions`] evaluate the same
//! function on the GPU.
//!
//! # Invariants
//! - Stops are ordered by position; ties keep insertion order.
//! - Evaluation is pure: the same gradient and position always give the same
//!   color, regardless of call history.
//! - `resolve_many(g, ps)[i] == resolve(g, ps[i])`.

mod error;
mod gradient;
pub mod lab;
mod sampler;
pub mod wgsl;

pub use error::GradientError;
pub use gradient::{ColorStop, GpuColorStop, Gradient, InterpolationSpace};
pub use sampler::GradientSampler;

use fractaline_common::Rgba;

/// Color of `gradient` at `position` (clamped to `[0, 1]`).
pub fn resolve(gradient: &Gradient, position: f32) -> Result<Rgba, GradientError> {
    gradient.resolve(position)
}

/// Colors of `gradient` at every position, in order.
pub fn resolve_many(gradient: &Gradient, positions: &[f32]) -> Result<Vec<Rgba>, GradientError> {
    gradient.resolve_many(positions)
}

pub fn crate_info() -> &'static str {
    "fractaline-gradient v0.1.0"
}

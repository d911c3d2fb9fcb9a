//! Render planning: turns a color-mode request into slot assignments and a
//! validated transform block, independent of any GPU API.
//!
//! # Invariants
//! - Planning and composition are pure; stages never mutate the plan or the
//!   geometry it describes.
//! - Slot numbers come only from [`fractaline_common::LayoutGeneration`].
//! - Every failure is a typed [`RenderError`] returned from the producing call.
//!
//! [`DebugTextStage`] and [`ReferenceStage`] run anywhere; the wgpu backend
//! lives in `fractaline-render-wgpu` behind the same [`ShadingStage`] trait.

mod camera;
mod config;
mod descriptor;
mod error;
mod stage;
mod uniforms;

pub use camera::{EYE_DISTANCE, ProjectionMode, View};
pub use config::{ConfigError, RenderConfig};
pub use descriptor::{
    Binding, BindingPlan, BindingResource, DEFAULT_POINT_SIZE, PlanRequest, plan,
};
pub use error::{MatrixKind, RenderError};
pub use stage::{DebugTextStage, ReferenceStage, ShadingStage};
pub use uniforms::{GpuUniforms, UniformTransform, compose};

pub fn crate_info() -> &'static str {
    "fractaline-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}

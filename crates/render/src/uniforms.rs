//! Per-frame transform block shared by every color mode.

use crate::error::{MatrixKind, RenderError};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Validated projection and model-view pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformTransform {
    projection: Mat4,
    model_view: Mat4,
}

/// GPU layout of [`UniformTransform`]: two column-major `mat4x4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuUniforms {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
}

/// Pack a projection and model-view matrix into the uniform block.
///
/// Fails with [`RenderError::NonFiniteTransform`] on the first NaN or infinite
/// element, reported by column-major index. The projection is checked first.
pub fn compose(projection: Mat4, model_view: Mat4) -> Result<UniformTransform, RenderError> {
    check_finite(&projection, MatrixKind::Projection)?;
    check_finite(&model_view, MatrixKind::ModelView)?;
    Ok(UniformTransform {
        projection,
        model_view,
    })
}

fn check_finite(m: &Mat4, matrix: MatrixKind) -> Result<(), RenderError> {
    match m.to_cols_array().iter().position(|v| !v.is_finite()) {
        Some(index) => Err(RenderError::NonFiniteTransform { matrix, index }),
        None => Ok(()),
    }
}

impl UniformTransform {
    pub const IDENTITY: Self = Self {
        projection: Mat4::IDENTITY,
        model_view: Mat4::IDENTITY,
    };

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn model_view(&self) -> Mat4 {
        self.model_view
    }

    /// `projection * model_view`, the matrix applied to each position.
    pub fn clip_from_model(&self) -> Mat4 {
        self.projection * self.model_view
    }

    pub fn to_gpu(&self) -> GpuUniforms {
        GpuUniforms {
            projection: self.projection.to_cols_array_2d(),
            model_view: self.model_view.to_cols_array_2d(),
        }
    }
}

impl Default for UniformTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

use crate::error::RenderError;
use crate::uniforms::{UniformTransform, compose};
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Distance from the eye to the model origin along -Z.
pub const EYE_DISTANCE: f32 = 8.0;

/// How the view volume maps to clip space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Orbit-style view of a figure: the figure is scaled, rotated about an axis
/// and panned in its own plane, then pushed [`EYE_DISTANCE`] units in front of
/// the eye.
///
/// View motion is caller state. Nothing here is fed back into geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct View {
    pub projection: ProjectionMode,
    /// Rotation about `rotation_axis`, in radians.
    pub rotation: f32,
    pub rotation_axis: Vec3,
    pub scale: f32,
    pub translation: Vec2,
    /// Vertical field of view in degrees (perspective only).
    pub fov_degrees: f32,
    /// Half the visible height at the model plane (orthographic only).
    pub ortho_half_height: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            projection: ProjectionMode::Perspective,
            rotation: 0.0,
            rotation_axis: Vec3::Z,
            scale: 1.0,
            translation: Vec2::ZERO,
            fov_degrees: 65.0,
            ortho_half_height: 4.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl View {
    /// Match the aspect ratio to a drawable size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn rotate(&mut self, radians: f32) {
        self.rotation += radians;
    }

    pub fn zoom(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Pan by a screen-space delta. The delta is taken back through the
    /// current rotation so the figure follows the pointer at any angle.
    pub fn translate_in_view(&mut self, dx: f32, dy: f32) {
        let unrotated = self
            .rotation_matrix()
            .inverse()
            .transform_vector3(Vec3::new(dx, dy, 0.0));
        self.translation += unrotated.truncate();
    }

    fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(self.rotation_axis.normalize(), self.rotation)
    }

    pub fn model_matrix(&self) -> Mat4 {
        let scale = Mat4::from_scale(Vec3::splat(self.scale));
        let translation = Mat4::from_translation(self.translation.extend(0.0));
        scale * self.rotation_matrix() * translation
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -EYE_DISTANCE))
    }

    pub fn model_view(&self) -> Mat4 {
        self.view_matrix() * self.model_matrix()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionMode::Perspective => Mat4::perspective_rh(
                self.fov_degrees.to_radians(),
                self.aspect,
                self.near,
                self.far,
            ),
            ProjectionMode::Orthographic => {
                let h = self.ortho_half_height;
                let w = h * self.aspect;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        }
    }

    /// Uniform block for the current view.
    ///
    /// A degenerate view (zero rotation axis, zero aspect, NaN input) surfaces
    /// as [`RenderError::NonFiniteTransform`] instead of reaching the GPU.
    pub fn uniforms(&self) -> Result<UniformTransform, RenderError> {
        compose(self.projection_matrix(), self.model_view())
    }
}

//! Render descriptor: validates a color-mode request and lays it out over the
//! stable slot table.
//!
//! Planning never touches GPU state. The resulting [`BindingPlan`] is the only
//! thing a [`crate::ShadingStage`] receives about what to bind where.

use crate::error::RenderError;
use fractaline_common::{BufferRole, ColorMode, LayoutGeneration, Rgba};
use fractaline_gradient::{GpuColorStop, Gradient, InterpolationSpace};

/// Point size used by the extended layout when the caller supplies none.
pub const DEFAULT_POINT_SIZE: f32 = 1.0;

/// What a slot carries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingResource<'a> {
    /// The caller's `len` positions, uploaded by the stage as `vec4<f32>`.
    Geometry { len: usize },
    Colors(&'a [Rgba]),
    /// One color standing in for `count` identical per-vertex colors.
    SplatColor { color: Rgba, count: usize },
    /// The per-frame [`crate::UniformTransform`].
    Transform,
    ColorMode(u32),
    PointSize(f32),
    BaseColor(Rgba),
    /// Aligned stops, colors already encoded into `space`.
    GradientStops {
        stops: Vec<GpuColorStop>,
        space: InterpolationSpace,
    },
    GradientStopCount(u32),
    /// Slot exists in this generation but the mode does not read it.
    Reserved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding<'a> {
    pub role: BufferRole,
    pub slot: u32,
    pub resource: BindingResource<'a>,
}

/// Ordered slot assignments for one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingPlan<'a> {
    generation: LayoutGeneration,
    mode: ColorMode,
    point_count: usize,
    bindings: Vec<Binding<'a>>,
}

impl<'a> BindingPlan<'a> {
    pub fn generation(&self) -> LayoutGeneration {
        self.generation
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Bindings in ascending slot order, one per role of the generation.
    pub fn bindings(&self) -> &[Binding<'a>] {
        &self.bindings
    }

    pub fn binding(&self, role: BufferRole) -> Option<&Binding<'a>> {
        self.bindings.iter().find(|b| b.role == role)
    }

    pub fn slot(&self, role: BufferRole) -> Option<u32> {
        self.binding(role).map(|b| b.slot)
    }

    pub fn color_mode_code(&self) -> u32 {
        self.mode.gpu_code()
    }

    /// Interpolation space of the bound gradient, if one is bound.
    pub fn gradient_space(&self) -> Option<InterpolationSpace> {
        self.bindings.iter().find_map(|b| match &b.resource {
            BindingResource::GradientStops { space, .. } => Some(*space),
            _ => None,
        })
    }
}

/// Inputs to [`PlanRequest::plan`].
#[derive(Debug, Clone, Copy)]
pub struct PlanRequest<'a> {
    pub mode: ColorMode,
    pub point_count: usize,
    pub gradient: Option<&'a Gradient>,
    pub flat_color: Option<Rgba>,
    pub per_vertex_colors: Option<&'a [Rgba]>,
    pub point_size: Option<f32>,
}

impl<'a> PlanRequest<'a> {
    pub fn new(mode: ColorMode, point_count: usize) -> Self {
        Self {
            mode,
            point_count,
            gradient: None,
            flat_color: None,
            per_vertex_colors: None,
            point_size: None,
        }
    }

    pub fn with_gradient(mut self, gradient: &'a Gradient) -> Self {
        self.gradient = Some(gradient);
        self
    }

    pub fn with_flat_color(mut self, color: Rgba) -> Self {
        self.flat_color = Some(color);
        self
    }

    pub fn with_per_vertex_colors(mut self, colors: &'a [Rgba]) -> Self {
        self.per_vertex_colors = Some(colors);
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = Some(size);
        self
    }

    /// Layout generation this request selects: extended as soon as an
    /// extended-only input (point size, gradient) is present.
    pub fn generation(&self) -> LayoutGeneration {
        if self.point_size.is_some() || self.gradient.is_some() {
            LayoutGeneration::Extended
        } else {
            LayoutGeneration::Legacy
        }
    }

    fn validate(&self) -> Result<(), RenderError> {
        let mode = self.mode;
        let invalid = |reason: &'static str| -> Result<(), RenderError> {
            Err(RenderError::InvalidModeInputs { mode, reason })
        };
        match mode {
            ColorMode::Uniform => {
                if self.flat_color.is_none() {
                    return invalid("a flat color is required");
                }
                if self.gradient.is_some() {
                    return invalid("a gradient is not accepted");
                }
                if self.per_vertex_colors.is_some() {
                    return invalid("per-vertex colors are not accepted");
                }
            }
            ColorMode::PerVertex => {
                let Some(colors) = self.per_vertex_colors else {
                    return invalid("per-vertex colors are required");
                };
                if colors.len() != self.point_count {
                    return Err(RenderError::LengthMismatch {
                        expected: self.point_count,
                        actual: colors.len(),
                    });
                }
            }
            ColorMode::Gradient => {
                let Some(gradient) = self.gradient else {
                    return invalid("a gradient is required");
                };
                if gradient.is_empty() {
                    return Err(RenderError::EmptyGradient);
                }
                if self.per_vertex_colors.is_some() {
                    return invalid("per-vertex colors are not accepted");
                }
            }
        }
        if let Some(size) = self.point_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(RenderError::InvalidPointSize(size));
            }
        }
        Ok(())
    }

    /// Validate the request and assign every role of its generation a slot.
    pub fn plan(&self) -> Result<BindingPlan<'a>, RenderError> {
        self.validate()?;
        let generation = self.generation();

        let mut gradient_stops = match (self.mode, self.gradient) {
            (ColorMode::Gradient, Some(gradient)) => Some((gradient.pack()?, gradient.space())),
            _ => None,
        };
        let stop_count = gradient_stops
            .as_ref()
            .map_or(0, |(stops, _)| stops.len() as u32);
        let mut bindings = Vec::with_capacity(generation.slot_count());
        for (role, slot) in generation.roles() {
            let resource = match role {
                BufferRole::Positions => BindingResource::Geometry {
                    len: self.point_count,
                },
                BufferRole::Colors => self.color_slot(generation),
                BufferRole::TexCoord => BindingResource::Reserved,
                BufferRole::Uniforms => BindingResource::Transform,
                BufferRole::ColorMode => BindingResource::ColorMode(self.mode.gpu_code()),
                BufferRole::PointSize => {
                    BindingResource::PointSize(self.point_size.unwrap_or(DEFAULT_POINT_SIZE))
                }
                BufferRole::BaseColor => {
                    BindingResource::BaseColor(self.flat_color.unwrap_or(Rgba::WHITE))
                }
                BufferRole::GradientStops => match gradient_stops.take() {
                    Some((stops, space)) => BindingResource::GradientStops { stops, space },
                    None => BindingResource::Reserved,
                },
                BufferRole::GradientStopCount => BindingResource::GradientStopCount(stop_count),
            };
            bindings.push(Binding {
                role,
                slot,
                resource,
            });
        }

        tracing::debug!(
            mode = %self.mode,
            %generation,
            points = self.point_count,
            stops = stop_count,
            "planned draw"
        );

        Ok(BindingPlan {
            generation,
            mode: self.mode,
            point_count: self.point_count,
            bindings,
        })
    }

    fn color_slot(&self, generation: LayoutGeneration) -> BindingResource<'a> {
        match (self.mode, generation) {
            (ColorMode::PerVertex, _) => self
                .per_vertex_colors
                .map_or(BindingResource::Reserved, BindingResource::Colors),
            // legacy has no base color slot
            (ColorMode::Uniform, LayoutGeneration::Legacy) => match self.flat_color {
                Some(color) => BindingResource::SplatColor {
                    color,
                    count: self.point_count,
                },
                None => BindingResource::Reserved,
            },
            _ => BindingResource::Reserved,
        }
    }
}

/// Plan a draw without extended-only inputs other than an optional gradient.
pub fn plan<'a>(
    mode: ColorMode,
    point_count: usize,
    gradient: Option<&'a Gradient>,
    flat_color: Option<Rgba>,
    per_vertex_colors: Option<&'a [Rgba]>,
) -> Result<BindingPlan<'a>, RenderError> {
    PlanRequest {
        mode,
        point_count,
        gradient,
        flat_color,
        per_vertex_colors,
        point_size: None,
    }
    .plan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractaline_gradient::ColorStop;

    fn rgb_gradient() -> Gradient {
        Gradient::from_stops([
            ColorStop::new(Rgba::RED, 0.0),
            ColorStop::new(Rgba::BLUE, 0.5),
            ColorStop::new(Rgba::GREEN, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn uniform_mode_uses_legacy_layout_by_default() {
        let plan = plan(ColorMode::Uniform, 4, None, Some(Rgba::RED), None).unwrap();
        assert_eq!(plan.generation(), LayoutGeneration::Legacy);
        assert_eq!(plan.bindings().len(), 5);
        assert_eq!(plan.slot(BufferRole::ColorMode), Some(4));
        assert_eq!(plan.slot(BufferRole::BaseColor), None);
        assert_eq!(
            plan.binding(BufferRole::Colors).unwrap().resource,
            BindingResource::SplatColor {
                color: Rgba::RED,
                count: 4
            }
        );
        assert_eq!(plan.color_mode_code(), ColorMode::Uniform.gpu_code());
    }

    #[test]
    fn uniform_with_point_size_moves_flat_color_to_base_color() {
        let plan = PlanRequest::new(ColorMode::Uniform, 4)
            .with_flat_color(Rgba::GREEN)
            .with_point_size(3.0)
            .plan()
            .unwrap();
        assert_eq!(plan.generation(), LayoutGeneration::Extended);
        assert_eq!(
            plan.binding(BufferRole::BaseColor).unwrap().resource,
            BindingResource::BaseColor(Rgba::GREEN)
        );
        assert_eq!(
            plan.binding(BufferRole::Colors).unwrap().resource,
            BindingResource::Reserved
        );
        assert_eq!(
            plan.binding(BufferRole::PointSize).unwrap().resource,
            BindingResource::PointSize(3.0)
        );
    }

    #[test]
    fn uniform_requires_flat_color_only() {
        assert!(matches!(
            plan(ColorMode::Uniform, 4, None, None, None),
            Err(RenderError::InvalidModeInputs {
                mode: ColorMode::Uniform,
                ..
            })
        ));
        let g = rgb_gradient();
        assert!(matches!(
            plan(ColorMode::Uniform, 4, Some(&g), Some(Rgba::RED), None),
            Err(RenderError::InvalidModeInputs { .. })
        ));
        let colors = [Rgba::RED; 4];
        assert!(matches!(
            plan(ColorMode::Uniform, 4, None, Some(Rgba::RED), Some(&colors)),
            Err(RenderError::InvalidModeInputs { .. })
        ));
    }

    #[test]
    fn per_vertex_length_must_match() {
        let colors = vec![Rgba::RED; 99];
        assert_eq!(
            plan(ColorMode::PerVertex, 100, None, None, Some(&colors)),
            Err(RenderError::LengthMismatch {
                expected: 100,
                actual: 99
            })
        );
        assert!(matches!(
            plan(ColorMode::PerVertex, 100, None, None, None),
            Err(RenderError::InvalidModeInputs { .. })
        ));
    }

    #[test]
    fn per_vertex_binds_caller_colors() {
        let colors = vec![Rgba::BLUE; 3];
        let plan = plan(ColorMode::PerVertex, 3, None, None, Some(&colors)).unwrap();
        assert_eq!(plan.generation(), LayoutGeneration::Legacy);
        match &plan.binding(BufferRole::Colors).unwrap().resource {
            BindingResource::Colors(bound) => assert_eq!(*bound, &colors[..]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_gradient_is_rejected() {
        let empty = Gradient::new();
        assert_eq!(
            plan(ColorMode::Gradient, 10, Some(&empty), None, None),
            Err(RenderError::EmptyGradient)
        );
        assert!(matches!(
            plan(ColorMode::Gradient, 10, None, None, None),
            Err(RenderError::InvalidModeInputs { .. })
        ));
    }

    #[test]
    fn gradient_mode_binds_aligned_stops() {
        let g = Gradient::from_stops([
            ColorStop::new(Rgba::RED, 0.2),
            ColorStop::new(Rgba::BLUE, 0.7),
        ])
        .unwrap();
        let plan = plan(ColorMode::Gradient, 1000, Some(&g), None, None).unwrap();
        assert_eq!(plan.generation(), LayoutGeneration::Extended);
        assert_eq!(plan.bindings().len(), 9);
        assert_eq!(plan.slot(BufferRole::GradientStops), Some(7));
        assert_eq!(plan.slot(BufferRole::GradientStopCount), Some(8));
        match &plan.binding(BufferRole::GradientStops).unwrap().resource {
            BindingResource::GradientStops { stops, space } => {
                assert_eq!(*space, InterpolationSpace::Rgb);
                assert_eq!(stops.len(), 4);
                assert_eq!(stops[0].position, 0.0);
                assert_eq!(stops[3].position, 1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            plan.binding(BufferRole::GradientStopCount).unwrap().resource,
            BindingResource::GradientStopCount(4)
        );
        assert_eq!(plan.gradient_space(), Some(InterpolationSpace::Rgb));
    }

    #[test]
    fn gradient_rejects_per_vertex_colors() {
        let g = rgb_gradient();
        let colors = [Rgba::RED; 2];
        assert!(matches!(
            plan(ColorMode::Gradient, 2, Some(&g), None, Some(&colors)),
            Err(RenderError::InvalidModeInputs {
                mode: ColorMode::Gradient,
                ..
            })
        ));
    }

    #[test]
    fn flat_color_outside_uniform_mode_becomes_base_color() {
        let g = rgb_gradient();
        let plan = plan(ColorMode::Gradient, 2, Some(&g), Some(Rgba::BLACK), None).unwrap();
        assert_eq!(
            plan.binding(BufferRole::BaseColor).unwrap().resource,
            BindingResource::BaseColor(Rgba::BLACK)
        );
    }

    #[test]
    fn per_vertex_with_point_size_reserves_gradient_slots() {
        let colors = [Rgba::RED; 2];
        let plan = PlanRequest::new(ColorMode::PerVertex, 2)
            .with_per_vertex_colors(&colors)
            .with_point_size(2.0)
            .plan()
            .unwrap();
        assert_eq!(
            plan.binding(BufferRole::GradientStops).unwrap().resource,
            BindingResource::Reserved
        );
        assert_eq!(
            plan.binding(BufferRole::GradientStopCount).unwrap().resource,
            BindingResource::GradientStopCount(0)
        );
        assert_eq!(plan.gradient_space(), None);
    }

    #[test]
    fn bad_point_size_is_rejected() {
        for size in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = PlanRequest::new(ColorMode::Uniform, 1)
                .with_flat_color(Rgba::WHITE)
                .with_point_size(size)
                .plan()
                .unwrap_err();
            assert!(matches!(err, RenderError::InvalidPointSize(_)));
        }
    }

    #[test]
    fn shared_roles_keep_their_slots_across_generations() {
        let legacy = plan(ColorMode::Uniform, 4, None, Some(Rgba::RED), None).unwrap();
        let g = rgb_gradient();
        let extended = plan(ColorMode::Gradient, 4, Some(&g), None, None).unwrap();
        for role in [
            BufferRole::Positions,
            BufferRole::Colors,
            BufferRole::TexCoord,
            BufferRole::Uniforms,
        ] {
            assert_eq!(legacy.slot(role), extended.slot(role));
        }
        assert_eq!(legacy.slot(BufferRole::Positions), Some(0));
        assert_eq!(legacy.slot(BufferRole::Uniforms), Some(3));
    }

    #[test]
    fn bindings_are_dense_and_ordered() {
        let g = rgb_gradient();
        let plan = plan(ColorMode::Gradient, 4, Some(&g), None, None).unwrap();
        for (i, b) in plan.bindings().iter().enumerate() {
            assert_eq!(b.slot, i as u32);
        }
    }

    #[test]
    fn planning_is_repeatable() {
        let g = rgb_gradient();
        let a = plan(ColorMode::Gradient, 8, Some(&g), None, None).unwrap();
        let b = plan(ColorMode::Gradient, 8, Some(&g), None, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn plan_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BindingPlan<'static>>();
    }
}

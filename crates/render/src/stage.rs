use crate::descriptor::{BindingPlan, BindingResource};
use crate::error::RenderError;
use crate::uniforms::UniformTransform;
use fractaline_common::{BufferRole, ColorMode, Rgba, gradient_position};
use fractaline_gradient::GradientSampler;
use std::fmt::Write;

/// Consumer of a [`BindingPlan`]. All backends implement this trait.
///
/// A stage reads the plan and the frame's uniforms and produces output. It
/// never feeds anything back into the plan or the geometry.
pub trait ShadingStage {
    /// The output type produced by this stage.
    type Output;

    /// Consume one planned draw.
    fn submit(&self, plan: &BindingPlan<'_>, uniforms: &UniformTransform) -> Self::Output;
}

/// Human-readable dump of a plan, slot by slot.
#[derive(Debug, Default)]
pub struct DebugTextStage;

impl DebugTextStage {
    pub fn new() -> Self {
        Self
    }
}

impl ShadingStage for DebugTextStage {
    type Output = String;

    fn submit(&self, plan: &BindingPlan<'_>, uniforms: &UniformTransform) -> String {
        let mut out = String::new();
        let generation = plan.generation();
        let _ = writeln!(
            out,
            "=== Binding Plan (layout={}, schema v{}, mode={}) ===",
            generation,
            generation.schema_version(),
            plan.mode()
        );
        let _ = writeln!(out, "Points: {}", plan.point_count());
        let eye = uniforms.model_view().transform_point3(glam::Vec3::ZERO);
        let _ = writeln!(
            out,
            "Model origin in eye space: ({:.2}, {:.2}, {:.2})",
            eye.x, eye.y, eye.z
        );
        for binding in plan.bindings() {
            let _ = writeln!(
                out,
                "  [slot {}] {:<20} {}",
                binding.slot,
                binding.role.name(),
                describe(&binding.resource)
            );
        }
        out
    }
}

fn describe(resource: &BindingResource<'_>) -> String {
    match resource {
        BindingResource::Geometry { len } => format!("geometry ({len} points)"),
        BindingResource::Colors(colors) => format!("per-vertex colors ({})", colors.len()),
        BindingResource::SplatColor { color, count } => format!(
            "splat ({:.3}, {:.3}, {:.3}, {:.3}) x{count}",
            color.r, color.g, color.b, color.a
        ),
        BindingResource::Transform => "projection + model-view".to_string(),
        BindingResource::ColorMode(code) => format!("code {code}"),
        BindingResource::PointSize(size) => format!("{size:.2}"),
        BindingResource::BaseColor(c) => {
            format!("({:.3}, {:.3}, {:.3}, {:.3})", c.r, c.g, c.b, c.a)
        }
        BindingResource::GradientStops { stops, space } => {
            format!("{} stops ({space:?})", stops.len())
        }
        BindingResource::GradientStopCount(n) => format!("{n}"),
        BindingResource::Reserved => "reserved".to_string(),
    }
}

/// CPU evaluation of the color every vertex receives under a plan.
///
/// Gradient mode reads the packed stops exactly as the shader does, so its
/// output is the reference the GPU path is checked against.
#[derive(Debug, Default)]
pub struct ReferenceStage;

impl ReferenceStage {
    pub fn new() -> Self {
        Self
    }
}

impl ShadingStage for ReferenceStage {
    type Output = Result<Vec<Rgba>, RenderError>;

    fn submit(&self, plan: &BindingPlan<'_>, _uniforms: &UniformTransform) -> Self::Output {
        let n = plan.point_count();
        let mode = plan.mode();
        match mode {
            ColorMode::Uniform => {
                let color = plan
                    .bindings()
                    .iter()
                    .find_map(|b| match b.resource {
                        BindingResource::BaseColor(c) => Some(c),
                        BindingResource::SplatColor { color, .. } => Some(color),
                        _ => None,
                    })
                    .ok_or(RenderError::InvalidModeInputs {
                        mode,
                        reason: "plan carries no flat color",
                    })?;
                Ok(vec![color; n])
            }
            ColorMode::PerVertex => match plan.binding(BufferRole::Colors).map(|b| &b.resource) {
                Some(BindingResource::Colors(colors)) => Ok(colors.to_vec()),
                _ => Err(RenderError::InvalidModeInputs {
                    mode,
                    reason: "plan carries no per-vertex colors",
                }),
            },
            ColorMode::Gradient => {
                let Some(BindingResource::GradientStops { stops, space }) =
                    plan.binding(BufferRole::GradientStops).map(|b| &b.resource)
                else {
                    return Err(RenderError::EmptyGradient);
                };
                let sampler = GradientSampler::from_packed(stops, *space)?;
                Ok((0..n)
                    .map(|i| sampler.resolve(gradient_position(i, n)))
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PlanRequest, plan};
    use fractaline_gradient::{ColorStop, Gradient, InterpolationSpace};

    fn three_stop(space: InterpolationSpace) -> Gradient {
        let mut g = Gradient::with_options(space, false);
        g.extend_stops([
            ColorStop::new(Rgba::RED, 0.1),
            ColorStop::new(Rgba::BLUE, 0.5),
            ColorStop::new(Rgba::new(0.2, 0.9, 0.4, 0.5), 0.8),
        ])
        .unwrap();
        g
    }

    #[test]
    fn debug_stage_lists_every_slot() {
        let g = three_stop(InterpolationSpace::Rgb);
        let plan = plan(ColorMode::Gradient, 10, Some(&g), None, None).unwrap();
        let out = DebugTextStage::new().submit(&plan, &UniformTransform::IDENTITY);
        assert!(out.contains("layout=extended"));
        assert!(out.contains("schema v2"));
        assert!(out.contains("Points: 10"));
        for slot in 0..9 {
            assert!(out.contains(&format!("[slot {slot}]")));
        }
        assert!(out.contains("5 stops (Rgb)"));
    }

    #[test]
    fn debug_stage_legacy_uniform() {
        let plan = plan(ColorMode::Uniform, 3, None, Some(Rgba::RED), None).unwrap();
        let out = DebugTextStage::new().submit(&plan, &UniformTransform::IDENTITY);
        assert!(out.contains("layout=legacy"));
        assert!(out.contains("splat"));
        assert!(!out.contains("[slot 5]"));
    }

    #[test]
    fn reference_gradient_matches_resolve_many() {
        for space in [InterpolationSpace::Rgb, InterpolationSpace::Lab] {
            let g = three_stop(space);
            let n = 257;
            let plan = plan(ColorMode::Gradient, n, Some(&g), None, None).unwrap();
            let colors = ReferenceStage::new()
                .submit(&plan, &UniformTransform::IDENTITY)
                .unwrap();
            let positions: Vec<f32> = (0..n).map(|i| gradient_position(i, n)).collect();
            let expected = g.resolve_many(&positions).unwrap();
            assert_eq!(colors.len(), n);
            for (a, b) in colors.iter().zip(&expected) {
                assert!(a.max_abs_diff(*b) < 1e-5, "{space:?}: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn reference_uniform_in_both_generations() {
        let legacy = plan(ColorMode::Uniform, 4, None, Some(Rgba::GREEN), None).unwrap();
        let extended = PlanRequest::new(ColorMode::Uniform, 4)
            .with_flat_color(Rgba::GREEN)
            .with_point_size(2.0)
            .plan()
            .unwrap();
        let stage = ReferenceStage::new();
        for p in [legacy, extended] {
            assert_eq!(
                stage.submit(&p, &UniformTransform::IDENTITY).unwrap(),
                vec![Rgba::GREEN; 4]
            );
        }
    }

    #[test]
    fn reference_per_vertex_passes_colors_through() {
        let colors = vec![Rgba::RED, Rgba::GREEN, Rgba::BLUE];
        let plan = plan(ColorMode::PerVertex, 3, None, None, Some(&colors)).unwrap();
        let out = ReferenceStage::new()
            .submit(&plan, &UniformTransform::IDENTITY)
            .unwrap();
        assert_eq!(out, colors);
    }

    #[test]
    fn reference_empty_draw() {
        let g = three_stop(InterpolationSpace::Rgb);
        let plan = plan(ColorMode::Gradient, 0, Some(&g), None, None).unwrap();
        let out = ReferenceStage::new()
            .submit(&plan, &UniformTransform::IDENTITY)
            .unwrap();
        assert!(out.is_empty());
    }
}

//! WGSL generation. Every `@binding(n)` is read from the slot schema, so a
//! shader and a [`fractaline_render::BindingPlan`] of the same generation
//! always agree.

use fractaline_common::{BufferRole, ColorMode, LayoutGeneration, Primitive};
use fractaline_gradient::{InterpolationSpace, wgsl};
use std::fmt::Write;

/// Everything that selects a distinct shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderKey {
    pub generation: LayoutGeneration,
    pub primitive: Primitive,
    pub space: InterpolationSpace,
}

impl ShaderKey {
    /// All variants worth compiling. Legacy layouts carry no gradient, so
    /// they only come in the RGB space.
    pub fn all() -> Vec<ShaderKey> {
        let mut keys = Vec::new();
        for primitive in [Primitive::Points, Primitive::Lines] {
            keys.push(ShaderKey {
                generation: LayoutGeneration::Legacy,
                primitive,
                space: InterpolationSpace::Rgb,
            });
            for space in [InterpolationSpace::Rgb, InterpolationSpace::Lab] {
                keys.push(ShaderKey {
                    generation: LayoutGeneration::Extended,
                    primitive,
                    space,
                });
            }
        }
        keys
    }

    pub fn label(&self) -> String {
        format!("{}_{:?}_{:?}", self.generation, self.primitive, self.space).to_lowercase()
    }
}

/// How a role is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Storage,
    Uniform,
}

pub fn buffer_kind(role: BufferRole) -> BufferKind {
    match role {
        BufferRole::Positions
        | BufferRole::Colors
        | BufferRole::TexCoord
        | BufferRole::GradientStops => BufferKind::Storage,
        BufferRole::Uniforms
        | BufferRole::ColorMode
        | BufferRole::PointSize
        | BufferRole::BaseColor
        | BufferRole::GradientStopCount => BufferKind::Uniform,
    }
}

fn declaration(role: BufferRole) -> &'static str {
    match role {
        BufferRole::Positions => "var<storage, read> positions: array<vec4<f32>>;",
        BufferRole::Colors => "var<storage, read> colors: array<vec4<f32>>;",
        BufferRole::TexCoord => "var<storage, read> tex_coords: array<vec2<f32>>;",
        BufferRole::Uniforms => "var<uniform> uniforms: Uniforms;",
        BufferRole::ColorMode => "var<uniform> color_mode: vec4<u32>;",
        BufferRole::PointSize => "var<uniform> point_size: vec4<f32>;",
        BufferRole::BaseColor => "var<uniform> base_color: vec4<f32>;",
        BufferRole::GradientStops => "var<storage, read> gradient_stops: array<ColorStop>;",
        BufferRole::GradientStopCount => "var<uniform> gradient_stop_count: vec4<u32>;",
    }
}

const UNIFORMS_STRUCT: &str = "struct Uniforms {\n    projection: mat4x4<f32>,\n    model_view: mat4x4<f32>,\n};\n";

const VERTEX_OUTPUT: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};
"#;

const LEGACY_COLOR_FN: &str = r#"
fn vertex_color(index: u32) -> vec4<f32> {
    if (color_mode.x == COLOR_MODE_PER_VERTEX) {
        return colors[index];
    }
    return colors[0];
}
"#;

const EXTENDED_COLOR_FN: &str = r#"
fn gradient_parameter(index: u32) -> f32 {
    let n = arrayLength(&positions);
    if (n <= 1u) {
        return 0.0;
    }
    return f32(index) / f32(n - 1u);
}

fn vertex_color(index: u32) -> vec4<f32> {
    let mode = color_mode.x;
    if (mode == COLOR_MODE_PER_VERTEX) {
        return colors[index];
    }
    if (mode == COLOR_MODE_GRADIENT) {
        return gradient_sample(gradient_parameter(index));
    }
    return base_color;
}
"#;

/// Backend-private group holding the drawable size in pixels.
pub const VIEWPORT_DECLARATION: &str = "@group(1) @binding(0)\nvar<uniform> viewport: vec4<f32>;\n";

const POINTS_VERTEX: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    let index = vertex_index / 6u;
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index % 6u];
    let clip = uniforms.projection * uniforms.model_view * positions[index];
    let offset = corner * POINT_SIZE / viewport.xy * clip.w;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy + offset, clip.zw);
    out.color = vertex_color(index);
    return out;
}
"#;

const LINES_VERTEX: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.projection * uniforms.model_view * positions[index];
    out.color = vertex_color(index);
    return out;
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Full WGSL module for one shader variant.
pub fn plan_shader(key: ShaderKey) -> String {
    let extended = key.generation == LayoutGeneration::Extended;
    let mut src = String::new();

    src.push_str(&ColorMode::wgsl_constants());
    src.push('\n');
    src.push_str(UNIFORMS_STRUCT);
    if extended {
        src.push_str(wgsl::COLOR_STOP_STRUCT);
    }
    src.push('\n');
    for (role, slot) in key.generation.roles() {
        let _ = writeln!(src, "@group(0) @binding({slot})\n{}", declaration(role));
    }
    src.push_str(VERTEX_OUTPUT);

    if extended {
        src.push_str(&wgsl::gradient_functions(key.space));
        src.push_str(EXTENDED_COLOR_FN);
    } else {
        src.push_str(LEGACY_COLOR_FN);
    }

    match key.primitive {
        Primitive::Points => {
            src.push('\n');
            src.push_str(VIEWPORT_DECLARATION);
            // legacy layouts have no point size slot
            let size = if extended { "point_size.x" } else { "1.0" };
            src.push_str(&POINTS_VERTEX.replace("POINT_SIZE", size));
        }
        Primitive::Lines => src.push_str(LINES_VERTEX),
    }
    src.push_str(FRAGMENT);
    src
}

//! WGSL source for GPU-side gradient evaluation.
//!
//! The emitted functions mirror [`crate::GradientSampler::resolve`] step for
//! step: clamp, partition-point binary search, boundary colors, channel-wise
//! `a + (b - a) * t`, then decode out of the interpolation space. They expect
//! the including shader to declare
//!
//! ```text
//! struct ColorStop { color: vec4<f32>, position: f32 }
//! var<storage, read> gradient_stops: array<ColorStop>;
//! var<uniform> gradient_stop_count: vec4<u32>;   // .x = stop count
//! ```

use crate::gradient::InterpolationSpace;
use crate::lab::{WHITE_D65, XYZ_TO_B, XYZ_TO_G, XYZ_TO_R};

/// WGSL declaration of the stop struct, laid out like [`crate::GpuColorStop`].
pub const COLOR_STOP_STRUCT: &str = "struct ColorStop {\n    color: vec4<f32>,\n    position: f32,\n};\n";

const SAMPLE_FN: &str = r#"
fn gradient_sample(position: f32) -> vec4<f32> {
    let count = gradient_stop_count.x;
    let p = clamp(position, 0.0, 1.0);
    var lo: u32 = 0u;
    var hi: u32 = count;
    while (lo < hi) {
        let mid = lo + (hi - lo) / 2u;
        if (gradient_stops[mid].position <= p) {
            lo = mid + 1u;
        } else {
            hi = mid;
        }
    }
    var value: vec4<f32>;
    if (lo == 0u) {
        value = gradient_stops[0].color;
    } else if (lo >= count) {
        value = gradient_stops[count - 1u].color;
    } else {
        let a = gradient_stops[lo - 1u];
        let b = gradient_stops[lo];
        let span = b.position - a.position;
        var t = 1.0;
        if (span > 0.0) {
            t = (p - a.position) / span;
        }
        value = a.color + (b.color - a.color) * t;
    }
    return gradient_decode(value);
}
"#;

const RGB_DECODE_FN: &str = r#"
fn gradient_decode(value: vec4<f32>) -> vec4<f32> {
    return value;
}
"#;

fn vec3_lit(v: [f32; 3]) -> String {
    format!("vec3<f32>({:?}, {:?}, {:?})", v[0], v[1], v[2])
}

fn lab_decode_fn() -> String {
    format!(
        r#"
fn lab_f_inv(t: f32) -> f32 {{
    let delta = 6.0 / 29.0;
    if (t > delta) {{
        return t * t * t;
    }}
    return 3.0 * delta * delta * (t - 4.0 / 29.0);
}}

fn linear_to_srgb(c: f32) -> f32 {{
    let a = abs(c);
    var s: f32;
    if (a <= 0.0031308) {{
        s = a * 12.92;
    }} else {{
        s = 1.055 * pow(a, 1.0 / 2.4) - 0.055;
    }}
    if (c < 0.0) {{
        return -s;
    }}
    return s;
}}

fn gradient_decode(value: vec4<f32>) -> vec4<f32> {{
    let fy = (value.x + 16.0) / 116.0;
    let fx = fy + value.y / 500.0;
    let fz = fy - value.z / 200.0;
    let xyz = vec3<f32>(lab_f_inv(fx), lab_f_inv(fy), lab_f_inv(fz)) * {white};
    return vec4<f32>(
        linear_to_srgb(dot({r}, xyz)),
        linear_to_srgb(dot({g}, xyz)),
        linear_to_srgb(dot({b}, xyz)),
        value.w,
    );
}}
"#,
        white = vec3_lit(WHITE_D65),
        r = vec3_lit(XYZ_TO_R),
        g = vec3_lit(XYZ_TO_G),
        b = vec3_lit(XYZ_TO_B),
    )
}

/// Gradient evaluation functions for the given interpolation space.
pub fn gradient_functions(space: InterpolationSpace) -> String {
    let decode = match space {
        InterpolationSpace::Rgb => RGB_DECODE_FN.to_string(),
        InterpolationSpace::Lab => lab_decode_fn(),
    };
    format!("{decode}{SAMPLE_FN}")
}

//! sRGB <-> CIE L*a*b* (D65) conversion.
//!
//! The WGSL in [`crate::wgsl`] uses the same constants and formulas, so a
//! Lab gradient evaluated on the GPU matches [`crate::GradientSampler`]
//! within float tolerance.

use fractaline_common::Rgba;
use glam::Vec3;

pub(crate) const RGB_TO_X: [f32; 3] = [0.412_456_4, 0.357_576_1, 0.180_437_5];
pub(crate) const RGB_TO_Y: [f32; 3] = [0.212_672_9, 0.715_152_2, 0.072_175_0];
pub(crate) const RGB_TO_Z: [f32; 3] = [0.019_333_9, 0.119_192_0, 0.950_304_1];

pub(crate) const XYZ_TO_R: [f32; 3] = [3.240_454_2, -1.537_138_5, -0.498_531_4];
pub(crate) const XYZ_TO_G: [f32; 3] = [-0.969_266_0, 1.876_010_8, 0.041_556_0];
pub(crate) const XYZ_TO_B: [f32; 3] = [0.055_643_4, -0.204_025_9, 1.057_225_2];

pub(crate) const WHITE_D65: [f32; 3] = [0.950_47, 1.0, 1.088_83];

const DELTA: f32 = 6.0 / 29.0;

fn srgb_to_linear(c: f32) -> f32 {
    let a = c.abs();
    let l = if a <= 0.040_45 {
        a / 12.92
    } else {
        ((a + 0.055) / 1.055).powf(2.4)
    };
    l.copysign(c)
}

fn linear_to_srgb(c: f32) -> f32 {
    let a = c.abs();
    let s = if a <= 0.003_130_8 {
        a * 12.92
    } else {
        1.055 * a.powf(1.0 / 2.4) - 0.055
    };
    s.copysign(c)
}

fn lab_f(t: f32) -> f32 {
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f32) -> f32 {
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

fn row(r: [f32; 3], v: Vec3) -> f32 {
    Vec3::from_array(r).dot(v)
}

/// Convert an sRGB color to Lab, stored as `(L, a, b, alpha)`.
pub fn srgb_to_lab(color: Rgba) -> Rgba {
    let rgb = Vec3::new(
        srgb_to_linear(color.r),
        srgb_to_linear(color.g),
        srgb_to_linear(color.b),
    );
    let white = Vec3::from_array(WHITE_D65);
    let xyz = Vec3::new(row(RGB_TO_X, rgb), row(RGB_TO_Y, rgb), row(RGB_TO_Z, rgb)) / white;
    let (fx, fy, fz) = (lab_f(xyz.x), lab_f(xyz.y), lab_f(xyz.z));
    Rgba::new(
        116.0 * fy - 16.0,
        500.0 * (fx - fy),
        200.0 * (fy - fz),
        color.a,
    )
}

/// Inverse of [`srgb_to_lab`].
pub fn lab_to_srgb(lab: Rgba) -> Rgba {
    let fy = (lab.r + 16.0) / 116.0;
    let fx = fy + lab.g / 500.0;
    let fz = fy - lab.b / 200.0;
    let xyz = Vec3::new(lab_f_inv(fx), lab_f_inv(fy), lab_f_inv(fz)) * Vec3::from_array(WHITE_D65);
    Rgba::new(
        linear_to_srgb(row(XYZ_TO_R, xyz)),
        linear_to_srgb(row(XYZ_TO_G, xyz)),
        linear_to_srgb(row(XYZ_TO_B, xyz)),
        lab.a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_l100() {
        let lab = srgb_to_lab(Rgba::WHITE);
        assert!((lab.r - 100.0).abs() < 1e-2, "L = {}", lab.r);
        assert!(lab.g.abs() < 1e-2);
        assert!(lab.b.abs() < 1e-2);
    }

    #[test]
    fn black_is_l0() {
        let lab = srgb_to_lab(Rgba::BLACK);
        assert!(lab.r.abs() < 1e-3);
    }

    #[test]
    fn round_trip_primaries() {
        for c in [
            Rgba::RED,
            Rgba::GREEN,
            Rgba::BLUE,
            Rgba::new(0.25, 0.5, 0.75, 0.5),
            Rgba::new(0.01, 0.02, 0.03, 1.0),
        ] {
            let back = lab_to_srgb(srgb_to_lab(c));
            assert!(back.max_abs_diff(c) < 1e-4, "{c:?} -> {back:?}");
        }
    }

    #[test]
    fn alpha_passes_through() {
        let c = Rgba::new(0.3, 0.3, 0.3, 0.125);
        assert_eq!(srgb_to_lab(c).a, 0.125);
        assert_eq!(lab_to_srgb(srgb_to_lab(c)).a, 0.125);
    }

    #[test]
    fn transfer_is_odd() {
        assert_eq!(srgb_to_linear(-0.5), -srgb_to_linear(0.5));
        assert_eq!(linear_to_srgb(-0.2), -linear_to_srgb(0.2));
    }
}

//! Versioned buffer-layout schema shared by every visualizer.
//!
//! The CPU side and the generated shaders both read slot numbers and color
//! mode codes from here. Slots are append-only: a newer layout generation may
//! add roles but never renumber a role that already existed with the same
//! meaning in an older one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current revision of the slot schema. Bumped whenever a role is appended.
pub const SCHEMA_VERSION: u32 = 2;

/// Strategy used to assign a color to each rendered point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// One flat color for every point.
    Uniform,
    /// One color per point, supplied by the generator.
    PerVertex,
    /// Color looked up from a gradient keyed by the point's normalized index.
    Gradient,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [Self::Uniform, Self::PerVertex, Self::Gradient];

    /// Numeric code written into the colorMode slot and matched by shaders.
    pub const fn gpu_code(self) -> u32 {
        match self {
            Self::Uniform => 0,
            Self::PerVertex => 1,
            Self::Gradient => 2,
        }
    }

    pub fn from_gpu_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.gpu_code() == code)
    }

    /// Name of the WGSL constant carrying this mode's code.
    pub const fn wgsl_const_name(self) -> &'static str {
        match self {
            Self::Uniform => "COLOR_MODE_UNIFORM",
            Self::PerVertex => "COLOR_MODE_PER_VERTEX",
            Self::Gradient => "COLOR_MODE_GRADIENT",
        }
    }

    /// WGSL `const` declarations for every mode, generated from this enum.
    pub fn wgsl_constants() -> String {
        Self::ALL
            .iter()
            .map(|m| format!("const {}: u32 = {}u;\n", m.wgsl_const_name(), m.gpu_code()))
            .collect()
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uniform => "uniform",
            Self::PerVertex => "per_vertex",
            Self::Gradient => "gradient",
        };
        f.write_str(name)
    }
}

/// Logical role of a buffer handed to the shading stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferRole {
    Positions,
    Colors,
    TexCoord,
    Uniforms,
    PointSize,
    ColorMode,
    BaseColor,
    GradientStops,
    GradientStopCount,
}

impl BufferRole {
    pub const ALL: [BufferRole; 9] = [
        Self::Positions,
        Self::Colors,
        Self::TexCoord,
        Self::Uniforms,
        Self::PointSize,
        Self::ColorMode,
        Self::BaseColor,
        Self::GradientStops,
        Self::GradientStopCount,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Positions => "positions",
            Self::Colors => "colors",
            Self::TexCoord => "tex_coord",
            Self::Uniforms => "uniforms",
            Self::PointSize => "point_size",
            Self::ColorMode => "color_mode",
            Self::BaseColor => "base_color",
            Self::GradientStops => "gradient_stops",
            Self::GradientStopCount => "gradient_stop_count",
        }
    }
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffer-layout generation.
///
/// `Legacy` is the first, five-slot layout; `Extended` appends point size,
/// base color and gradient roles. `Extended` moves colorMode from slot 4 to 5
/// because pointSize took slot 4 when the layout was extended; the
/// [`LayoutGeneration::slot`] table is the only place that encodes this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutGeneration {
    Legacy,
    Extended,
}

impl LayoutGeneration {
    pub const fn schema_version(self) -> u32 {
        match self {
            Self::Legacy => 1,
            Self::Extended => SCHEMA_VERSION,
        }
    }

    /// Number of slots in this generation.
    pub const fn slot_count(self) -> usize {
        match self {
            Self::Legacy => 5,
            Self::Extended => 9,
        }
    }

    /// Slot index of `role`, or `None` if the role does not exist in this generation.
    pub const fn slot(self, role: BufferRole) -> Option<u32> {
        match (self, role) {
            (_, BufferRole::Positions) => Some(0),
            (_, BufferRole::Colors) => Some(1),
            (_, BufferRole::TexCoord) => Some(2),
            (_, BufferRole::Uniforms) => Some(3),
            (Self::Legacy, BufferRole::ColorMode) => Some(4),
            (Self::Legacy, _) => None,
            (Self::Extended, BufferRole::PointSize) => Some(4),
            (Self::Extended, BufferRole::ColorMode) => Some(5),
            (Self::Extended, BufferRole::BaseColor) => Some(6),
            (Self::Extended, BufferRole::GradientStops) => Some(7),
            (Self::Extended, BufferRole::GradientStopCount) => Some(8),
        }
    }

    /// Roles present in this generation, ordered by slot.
    pub fn roles(self) -> Vec<(BufferRole, u32)> {
        let mut roles: Vec<(BufferRole, u32)> = BufferRole::ALL
            .into_iter()
            .filter_map(|role| self.slot(role).map(|slot| (role, slot)))
            .collect();
        roles.sort_by_key(|(_, slot)| *slot);
        roles
    }
}

impl fmt::Display for LayoutGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Extended => f.write_str("extended"),
        }
    }
}

/// Primitive assembled from the positions buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Point cloud, as drawn for attractor trajectories.
    #[default]
    Points,
    /// Line list (pairs of positions), as drawn for L-system turtle paths.
    Lines,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn gpu_codes_round_trip() {
        for mode in ColorMode::ALL {
            assert_eq!(ColorMode::from_gpu_code(mode.gpu_code()), Some(mode));
        }
        assert_eq!(ColorMode::from_gpu_code(7), None);
    }

    #[test]
    fn gpu_codes_are_distinct() {
        let codes: HashSet<u32> = ColorMode::ALL.iter().map(|m| m.gpu_code()).collect();
        assert_eq!(codes.len(), ColorMode::ALL.len());
    }

    #[test]
    fn wgsl_constants_come_from_enum() {
        let src = ColorMode::wgsl_constants();
        assert!(src.contains("const COLOR_MODE_UNIFORM: u32 = 0u;"));
        assert!(src.contains("const COLOR_MODE_PER_VERTEX: u32 = 1u;"));
        assert!(src.contains("const COLOR_MODE_GRADIENT: u32 = 2u;"));
    }

    #[test]
    fn legacy_layout_matches_table() {
        let g = LayoutGeneration::Legacy;
        assert_eq!(g.slot(BufferRole::Positions), Some(0));
        assert_eq!(g.slot(BufferRole::Colors), Some(1));
        assert_eq!(g.slot(BufferRole::TexCoord), Some(2));
        assert_eq!(g.slot(BufferRole::Uniforms), Some(3));
        assert_eq!(g.slot(BufferRole::ColorMode), Some(4));
        assert_eq!(g.slot(BufferRole::PointSize), None);
        assert_eq!(g.slot(BufferRole::GradientStops), None);
    }

    #[test]
    fn extended_layout_matches_table() {
        let g = LayoutGeneration::Extended;
        assert_eq!(g.slot(BufferRole::PointSize), Some(4));
        assert_eq!(g.slot(BufferRole::ColorMode), Some(5));
        assert_eq!(g.slot(BufferRole::BaseColor), Some(6));
        assert_eq!(g.slot(BufferRole::GradientStops), Some(7));
        assert_eq!(g.slot(BufferRole::GradientStopCount), Some(8));
    }

    #[test]
    fn slots_are_dense() {
        for g in [LayoutGeneration::Legacy, LayoutGeneration::Extended] {
            let slots: Vec<u32> = g.roles().into_iter().map(|(_, s)| s).collect();
            let expected: Vec<u32> = (0..g.slot_count() as u32).collect();
            assert_eq!(slots, expected, "{g} slots not dense");
        }
    }

    #[test]
    fn shared_roles_keep_their_slots() {
        for role in [
            BufferRole::Positions,
            BufferRole::Colors,
            BufferRole::TexCoord,
            BufferRole::Uniforms,
        ] {
            assert_eq!(
                LayoutGeneration::Legacy.slot(role),
                LayoutGeneration::Extended.slot(role)
            );
        }
    }

    #[test]
    fn color_mode_config_names() {
        assert_eq!(ColorMode::PerVertex.to_string(), "per_vertex");
        assert_eq!(BufferRole::GradientStopCount.to_string(), "gradient_stop_count");
    }
}

use crate::types::{Point, Rgba};
use glam::Vec3;

/// Errors from building a geometry buffer out of generator output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("flat buffer of {len} floats is not a multiple of stride {stride}")]
    RaggedBuffer { len: usize, stride: usize },
    #[error("unsupported component stride {0}; expected 2 or 3")]
    UnsupportedStride(usize),
    #[error("per-vertex color count {colors} does not match point count {points}")]
    LengthMismatch { points: usize, colors: usize },
}

/// Ordered positions produced by an external generator, with optional
/// per-vertex colors of matching length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffer {
    points: Vec<Point>,
    colors: Option<Vec<Rgba>>,
}

impl GeometryBuffer {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            colors: None,
        }
    }

    /// Build from a flat float array as emitted by turtle/attractor generators.
    ///
    /// `stride` is 3 for `x y z` triples or 2 for planar `x y` pairs (z = 0).
    pub fn from_flat(data: &[f32], stride: usize) -> Result<Self, GeometryError> {
        if stride != 2 && stride != 3 {
            return Err(GeometryError::UnsupportedStride(stride));
        }
        if data.len() % stride != 0 {
            return Err(GeometryError::RaggedBuffer {
                len: data.len(),
                stride,
            });
        }
        let points = data
            .chunks_exact(stride)
            .map(|c| Vec3::new(c[0], c[1], c.get(2).copied().unwrap_or(0.0)))
            .collect();
        Ok(Self::new(points))
    }

    /// Attach per-vertex colors. The count must equal the point count.
    pub fn with_colors(mut self, colors: Vec<Rgba>) -> Result<Self, GeometryError> {
        if colors.len() != self.points.len() {
            return Err(GeometryError::LengthMismatch {
                points: self.points.len(),
                colors: colors.len(),
            });
        }
        self.colors = Some(colors);
        Ok(self)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn colors(&self) -> Option<&[Rgba]> {
        self.colors.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Homogeneous `[x, y, z, 1]` positions, the layout the GPU reads.
    pub fn homogeneous(&self) -> Vec<[f32; 4]> {
        self.points.iter().map(|p| p.extend(1.0).to_array()).collect()
    }

    /// Normalized gradient key of every point: `i / (n - 1)`.
    pub fn gradient_positions(&self) -> Vec<f32> {
        (0..self.points.len())
            .map(|i| gradient_position(i, self.points.len()))
            .collect()
    }

    /// Axis-aligned bounds, or `None` for an empty buffer.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

/// Normalized gradient key of point `index` out of `count`.
///
/// Shaders compute the same value from `vertex_index / (count - 1)`; a single
/// point maps to 0.0.
pub fn gradient_position(index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        index as f32 / (count - 1) as f32
    }
}

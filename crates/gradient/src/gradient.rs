use crate::error::GradientError;
use crate::lab;
use crate::sampler::GradientSampler;
use bytemuck::{Pod, Zeroable};
use fractaline_common::Rgba;
use serde::{Deserialize, Serialize};

/// One `(color, position)` control point of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub color: Rgba,
    pub position: f32,
}

impl ColorStop {
    pub const fn new(color: Rgba, position: f32) -> Self {
        Self { color, position }
    }
}

/// Color space in which stop colors are interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationSpace {
    /// Channel-wise linear interpolation of the stored values.
    #[default]
    Rgb,
    /// Interpolate in CIE L*a*b*; stops are treated as sRGB.
    Lab,
}

impl InterpolationSpace {
    /// Map a stop color into the interpolation space.
    pub fn encode(self, color: Rgba) -> Rgba {
        match self {
            Self::Rgb => color,
            Self::Lab => lab::srgb_to_lab(color),
        }
    }

    /// Map an interpolated value back to output color.
    pub fn decode(self, value: Rgba) -> Rgba {
        match self {
            Self::Rgb => value,
            Self::Lab => lab::lab_to_srgb(value),
        }
    }
}

/// GPU image of one stop. Matches WGSL `struct ColorStop` in a storage array
/// (32-byte stride).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuColorStop {
    pub color: [f32; 4],
    pub position: f32,
    pub _pad: [f32; 3],
}

/// Ordered color stops defining a color function over `[0, 1]`.
///
/// Stops stay sorted by position; stops sharing a position keep the order in
/// which they were added. A gradient may be empty while it is being edited,
/// but every evaluation of an empty gradient fails with
/// [`GradientError::EmptyGradient`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
    space: InterpolationSpace,
    allow_hdr: bool,
}

impl Gradient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty gradient with an explicit interpolation space and HDR policy.
    pub fn with_options(space: InterpolationSpace, allow_hdr: bool) -> Self {
        Self {
            stops: Vec::new(),
            space,
            allow_hdr,
        }
    }

    /// Build a gradient from stops in any order.
    pub fn from_stops(stops: impl IntoIterator<Item = ColorStop>) -> Result<Self, GradientError> {
        let mut gradient = Self::new();
        gradient.extend_stops(stops)?;
        Ok(gradient)
    }

    /// Single-stop gradient: `color` everywhere.
    pub fn constant(color: Rgba) -> Result<Self, GradientError> {
        Self::from_stops([ColorStop::new(color, 0.0)])
    }

    /// Add several stops; nothing is added if any stop is invalid.
    pub fn extend_stops(
        &mut self,
        stops: impl IntoIterator<Item = ColorStop>,
    ) -> Result<(), GradientError> {
        let stops: Vec<ColorStop> = stops.into_iter().collect();
        for stop in &stops {
            self.validate(stop)?;
        }
        self.stops.extend(stops.into_iter().map(normalized));
        self.sort();
        Ok(())
    }

    /// Add one stop, keeping the sequence ordered.
    pub fn add_stop(&mut self, stop: ColorStop) -> Result<(), GradientError> {
        self.validate(&stop)?;
        self.stops.push(normalized(stop));
        self.sort();
        Ok(())
    }

    pub fn remove_stop(&mut self, index: usize) -> Result<ColorStop, GradientError> {
        if index >= self.stops.len() {
            return Err(GradientError::IndexOutOfBounds {
                index,
                len: self.stops.len(),
            });
        }
        Ok(self.stops.remove(index))
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn space(&self) -> InterpolationSpace {
        self.space
    }

    pub fn allows_hdr(&self) -> bool {
        self.allow_hdr
    }

    /// Evaluator for this gradient. Fails only when the gradient is empty.
    pub fn sampler(&self) -> Result<GradientSampler<'_>, GradientError> {
        GradientSampler::new(&self.stops, self.space)
    }

    pub fn resolve(&self, position: f32) -> Result<Rgba, GradientError> {
        Ok(self.sampler()?.resolve(position))
    }

    pub fn resolve_many(&self, positions: &[f32]) -> Result<Vec<Rgba>, GradientError> {
        Ok(self.sampler()?.resolve_many(positions))
    }

    /// Copy with boundary stops at exactly 0.0 and 1.0.
    ///
    /// The first and last colors are duplicated at the ends when missing, so
    /// the result resolves identically to `self` while every query falls
    /// between two stops.
    pub fn aligned(&self) -> Self {
        let mut aligned = self.clone();
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return aligned;
        };
        if first.position != 0.0 {
            aligned.stops.insert(0, ColorStop::new(first.color, 0.0));
        }
        if last.position != 1.0 {
            aligned.stops.push(ColorStop::new(last.color, 1.0));
        }
        aligned
    }

    /// Aligned stops in GPU layout, colors pre-encoded into the interpolation
    /// space.
    pub fn pack(&self) -> Result<Vec<GpuColorStop>, GradientError> {
        if self.stops.is_empty() {
            return Err(GradientError::EmptyGradient);
        }
        Ok(self
            .aligned()
            .stops
            .iter()
            .map(|s| GpuColorStop {
                color: self.space.encode(s.color).to_array(),
                position: s.position,
                _pad: [0.0; 3],
            })
            .collect())
    }

    fn validate(&self, stop: &ColorStop) -> Result<(), GradientError> {
        if !stop.position.is_finite() || !stop.color.is_finite() {
            return Err(GradientError::NonFinite);
        }
        if !(0.0..=1.0).contains(&stop.position) {
            return Err(GradientError::PositionOutOfRange(stop.position));
        }
        if !self.allow_hdr && !stop.color.is_unit_range() {
            return Err(GradientError::ColorOutOfRange(stop.color));
        }
        Ok(())
    }

    fn sort(&mut self) {
        // stable: equal positions keep insertion order
        self.stops
            .sort_by(|a, b| a.position.total_cmp(&b.position));
    }
}

/// `-0.0` is stored as `0.0` so it ties with other stops at zero.
fn normalized(stop: ColorStop) -> ColorStop {
    ColorStop {
        position: stop.position + 0.0,
        ..stop
    }
}

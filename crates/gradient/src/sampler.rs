use crate::error::GradientError;
use crate::gradient::{ColorStop, GpuColorStop, InterpolationSpace};
use fractaline_common::Rgba;
use std::borrow::Cow;

/// Infallible evaluator over a non-empty, ordered stop sequence.
///
/// In [`InterpolationSpace::Lab`] the stop colors are converted once on
/// construction; in RGB the stops are borrowed as-is.
#[derive(Debug, Clone)]
pub struct GradientSampler<'a> {
    stops: Cow<'a, [ColorStop]>,
    space: InterpolationSpace,
}

impl<'a> GradientSampler<'a> {
    /// `stops` must already be sorted by position.
    pub(crate) fn new(
        stops: &'a [ColorStop],
        space: InterpolationSpace,
    ) -> Result<Self, GradientError> {
        if stops.is_empty() {
            return Err(GradientError::EmptyGradient);
        }
        let stops = match space {
            InterpolationSpace::Rgb => Cow::Borrowed(stops),
            InterpolationSpace::Lab => Cow::Owned(
                stops
                    .iter()
                    .map(|s| ColorStop::new(space.encode(s.color), s.position))
                    .collect(),
            ),
        };
        Ok(Self { stops, space })
    }

    /// Evaluator over stops already packed for the GPU.
    ///
    /// Packed colors are in the interpolation space, so this reads them the
    /// way the shader does: interpolate, then decode.
    pub fn from_packed(
        stops: &[GpuColorStop],
        space: InterpolationSpace,
    ) -> Result<GradientSampler<'static>, GradientError> {
        if stops.is_empty() {
            return Err(GradientError::EmptyGradient);
        }
        let stops = stops
            .iter()
            .map(|s| ColorStop::new(Rgba::from(s.color), s.position))
            .collect();
        Ok(GradientSampler {
            stops: Cow::Owned(stops),
            space,
        })
    }

    /// Color at `position`.
    ///
    /// The position is clamped to `[0, 1]` (NaN reads as 0.0). Outside the
    /// first/last stop the boundary color is returned unchanged. Between stops
    /// each channel is interpolated linearly; at a position shared by several
    /// stops the last of them wins.
    pub fn resolve(&self, position: f32) -> Rgba {
        let p = clamp_position(position);
        let stops = &*self.stops;
        // index of the first stop strictly after p
        let upper = stops.partition_point(|s| s.position <= p);
        let value = if upper == 0 {
            stops[0].color
        } else if upper == stops.len() {
            stops[upper - 1].color
        } else {
            let lo = &stops[upper - 1];
            let hi = &stops[upper];
            let span = hi.position - lo.position;
            let t = if span > 0.0 {
                (p - lo.position) / span
            } else {
                1.0
            };
            lo.color.lerp(hi.color, t)
        };
        self.space.decode(value)
    }

    /// Element-wise [`GradientSampler::resolve`].
    pub fn resolve_many(&self, positions: &[f32]) -> Vec<Rgba> {
        tracing::trace!(
            count = positions.len(),
            stops = self.stops.len(),
            "resolving gradient batch"
        );
        positions.iter().map(|p| self.resolve(*p)).collect()
    }

    pub fn space(&self) -> InterpolationSpace {
        self.space
    }
}

fn clamp_position(position: f32) -> f32 {
    if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, 1.0)
    }
}

use fractaline_common::Rgba;

/// Errors from building or evaluating a gradient.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradientError {
    #[error("gradient has no color stops")]
    EmptyGradient,
    #[error("stop position {0} is outside [0, 1]")]
    PositionOutOfRange(f32),
    #[error("stop color {0:?} has channels outside [0, 1] and HDR is not allowed")]
    ColorOutOfRange(Rgba),
    #[error("stop contains a non-finite value")]
    NonFinite,
    #[error("stop index {index} out of bounds for {len} stops")]
    IndexOutOfBounds { index: usize, len: usize },
}

use fractaline_common::ColorMode;
use fractaline_gradient::GradientError;
use std::fmt;

/// Which half of the uniform block a matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Projection,
    ModelView,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Projection => f.write_str("projection"),
            MatrixKind::ModelView => f.write_str("model-view"),
        }
    }
}

/// Errors from planning a draw or composing its uniforms.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("invalid inputs for {mode} mode: {reason}")]
    InvalidModeInputs {
        mode: ColorMode,
        reason: &'static str,
    },
    #[error("gradient has no color stops")]
    EmptyGradient,
    #[error("{matrix} matrix element {index} is not finite")]
    NonFiniteTransform { matrix: MatrixKind, index: usize },
    #[error("expected {expected} per-vertex colors, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("point size must be finite and positive, got {0}")]
    InvalidPointSize(f32),
    #[error("gradient error: {0}")]
    Gradient(GradientError),
    #[error("no pipeline compiled for variant {variant}")]
    MissingPipeline { variant: String },
    #[error("{points} points exceed the per-draw vertex limit")]
    TooManyVertices { points: usize },
}

impl From<GradientError> for RenderError {
    fn from(err: GradientError) -> Self {
        match err {
            GradientError::EmptyGradient => RenderError::EmptyGradient,
            other => RenderError::Gradient(other),
        }
    }
}

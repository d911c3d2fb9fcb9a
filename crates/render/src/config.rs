use crate::camera::View;
use crate::descriptor::PlanRequest;
use fractaline_common::{ColorMode, Primitive, Rgba};
use fractaline_gradient::{ColorStop, Gradient, GradientError, InterpolationSpace};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("invalid gradient: {0}")]
    Gradient(#[from] GradientError),
}

/// Coloring and view settings for one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub color_mode: ColorMode,
    pub flat_color: Option<Rgba>,
    pub gradient_stops: Vec<ColorStop>,
    pub gradient_space: InterpolationSpace,
    pub allow_hdr: bool,
    pub point_size: Option<f32>,
    pub primitive: Primitive,
    pub view: View,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Uniform,
            flat_color: Some(Rgba::WHITE),
            gradient_stops: Vec::new(),
            gradient_space: InterpolationSpace::Rgb,
            allow_hdr: false,
            point_size: None,
            primitive: Primitive::Points,
            view: View::default(),
        }
    }
}

enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

impl RenderConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = format_of(path)?;
        let text = std::fs::read_to_string(path)?;
        let config = match format {
            Format::Yaml => Self::from_yaml_str(&text)?,
            Format::Json => Self::from_json_str(&text)?,
        };
        tracing::debug!(path = %path.display(), mode = %config.color_mode, "loaded render config");
        config.warn_unused();
        Ok(config)
    }

    /// Write to a `.yaml`, `.yml` or `.json` file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = match format_of(path)? {
            Format::Yaml => self.to_yaml()?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Engine gradient for the configured stops. Empty when no stops are set.
    pub fn gradient(&self) -> Result<Gradient, ConfigError> {
        let mut gradient = Gradient::with_options(self.gradient_space, self.allow_hdr);
        gradient.extend_stops(self.gradient_stops.iter().copied())?;
        Ok(gradient)
    }

    /// Plan request for `point_count` points under this config.
    ///
    /// `gradient` is attached only in gradient mode (pass the result of
    /// [`RenderConfig::gradient`]); `per_vertex_colors` only in per-vertex
    /// mode.
    pub fn plan_request<'a>(
        &self,
        point_count: usize,
        gradient: &'a Gradient,
        per_vertex_colors: Option<&'a [Rgba]>,
    ) -> PlanRequest<'a> {
        PlanRequest {
            mode: self.color_mode,
            point_count,
            gradient: (self.color_mode == ColorMode::Gradient).then_some(gradient),
            flat_color: self.flat_color,
            per_vertex_colors: per_vertex_colors
                .filter(|_| self.color_mode == ColorMode::PerVertex),
            point_size: self.point_size,
        }
    }

    fn warn_unused(&self) {
        if self.color_mode != ColorMode::Gradient && !self.gradient_stops.is_empty() {
            tracing::warn!(
                mode = %self.color_mode,
                stops = self.gradient_stops.len(),
                "gradient stops are ignored outside gradient mode"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ProjectionMode;

    const GRADIENT_YAML: &str = r#"
color_mode: gradient
gradient_space: lab
gradient_stops:
  - color: [1.0, 0.0, 0.0, 1.0]
    position: 0.0
  - color: [0.0, 0.0, 1.0, 1.0]
    position: 1.0
point_size: 2.5
view:
  projection: orthographic
  scale: 1.5
"#;

    #[test]
    fn parses_yaml_with_defaults() {
        let config = RenderConfig::from_yaml_str(GRADIENT_YAML).unwrap();
        assert_eq!(config.color_mode, ColorMode::Gradient);
        assert_eq!(config.gradient_space, InterpolationSpace::Lab);
        assert_eq!(config.gradient_stops.len(), 2);
        assert_eq!(config.point_size, Some(2.5));
        assert_eq!(config.view.projection, ProjectionMode::Orthographic);
        assert_eq!(config.view.scale, 1.5);
        assert_eq!(config.view.fov_degrees, 65.0);
        assert_eq!(config.primitive, Primitive::Points);
        assert_eq!(config.flat_color, Some(Rgba::WHITE));
    }

    #[test]
    fn builds_gradient_in_configured_space() {
        let config = RenderConfig::from_yaml_str(GRADIENT_YAML).unwrap();
        let g = config.gradient().unwrap();
        assert_eq!(g.space(), InterpolationSpace::Lab);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn out_of_range_stop_fails_gradient() {
        let config = RenderConfig {
            gradient_stops: vec![ColorStop::new(Rgba::RED, 1.5)],
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.gradient(),
            Err(ConfigError::Gradient(GradientError::PositionOutOfRange(_)))
        ));
    }

    #[test]
    fn plan_request_attaches_gradient_only_in_gradient_mode() {
        let config = RenderConfig::from_yaml_str(GRADIENT_YAML).unwrap();
        let g = config.gradient().unwrap();
        let req = config.plan_request(10, &g, None);
        assert!(req.gradient.is_some());
        let plan = req.plan().unwrap();
        assert_eq!(plan.point_count(), 10);

        let uniform = RenderConfig::default();
        let colors = vec![Rgba::RED; 10];
        let req = uniform.plan_request(10, &g, Some(&colors));
        assert!(req.gradient.is_none());
        assert!(req.per_vertex_colors.is_none());
        assert!(req.plan().is_ok());
    }

    #[test]
    fn yaml_and_json_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::from_yaml_str(GRADIENT_YAML).unwrap();
        for name in ["figure.yaml", "figure.yml", "figure.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            let loaded = RenderConfig::load(&path).unwrap();
            assert_eq!(loaded, config, "{name}");
        }
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.toml");
        std::fs::write(&path, "color_mode = \"uniform\"").unwrap();
        assert!(matches!(
            RenderConfig::load(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RenderConfig::load(&dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            RenderConfig::from_json_str("{ \"color_mode\": \"rainbow\" }"),
            Err(ConfigError::Json(_))
        ));
    }
}

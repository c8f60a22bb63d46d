//! Viewer configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Command-line flags are applied on top in `main`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use vm3d_core::Vec3f;

use crate::error::{ViewerError, ViewerResult};

/// Free-flying camera settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub movement_per_second: f32,
    /// Radians of turn per terminal cell of mouse motion.
    pub mouse_sensitivity: f32,
    pub fast_multiplier: f32,
    pub slow_multiplier: f32,
    pub start_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            movement_per_second: 5.0,
            mouse_sensitivity: 0.01,
            fast_multiplier: 4.0,
            slow_multiplier: 0.5,
            start_position: [0.0, 0.0, 6.0],
        }
    }
}

impl CameraConfig {
    pub fn start_position(&self) -> Vec3f {
        Vec3f::from(self.start_position)
    }
}

/// What gets drawn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Circle subdivisions for the ship's cones and cylinders.
    pub subdivisions: usize,
    /// Extra OBJ model placed at the world origin.
    pub obj: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            subdivisions: 16,
            obj: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub target_fps: u32,
    /// Direction towards the light, in world space.
    pub light_direction: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            light_direction: [0.0, 1.0, 1.0],
        }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub render: RenderConfig,
    /// Write logs here instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl ViewerConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml(content: &str) -> ViewerResult<Self> {
        let config: ViewerConfig = toml::from_str(content)
            .map_err(|e| ViewerError::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric ranges, collecting every violation.
    pub fn validate(&self) -> ViewerResult<()> {
        let mut errors: Vec<String> = Vec::new();
        let camera = &self.camera;

        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            errors.push(format!(
                "camera.fov_degrees = {} is out of range (0, 180)",
                camera.fov_degrees
            ));
        }
        if !(camera.near > 0.0 && camera.near.is_finite()) {
            errors.push(format!("camera.near = {} must be positive and finite", camera.near));
        }
        if !(camera.far > camera.near && camera.far.is_finite()) {
            errors.push(format!(
                "camera.far = {} must be finite and greater than camera.near = {}",
                camera.far, camera.near
            ));
        }
        for (name, value) in [
            ("movement_per_second", camera.movement_per_second),
            ("mouse_sensitivity", camera.mouse_sensitivity),
            ("fast_multiplier", camera.fast_multiplier),
            ("slow_multiplier", camera.slow_multiplier),
        ] {
            if !value.is_finite() {
                errors.push(format!("camera.{name} = {value} must be finite"));
            }
        }
        if !camera.start_position.iter().all(|c| c.is_finite()) {
            errors.push(format!(
                "camera.start_position = {:?} must be finite",
                camera.start_position
            ));
        }
        if self.scene.subdivisions < 1 {
            errors.push("scene.subdivisions must be at least 1".to_string());
        }
        if self.render.target_fps < 1 {
            errors.push("render.target_fps must be at least 1".to_string());
        }
        let light = self.render.light_direction;
        if !(light.iter().all(|c| c.is_finite()) && Vec3f::from(light).length() > 0.0) {
            errors.push(format!(
                "render.light_direction = {light:?} must be finite and non-zero"
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ViewerError::Config(errors.join("; ")))
        }
    }

    pub fn light_direction(&self) -> Vec3f {
        Vec3f::from(self.render.light_direction).normalize()
    }
}

/// Load and validate a config from a TOML file.
pub fn load_from_path(path: &Path) -> ViewerResult<ViewerConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ViewerError::Config(format!("failed to read {}: {e}", path.display())))?;

    let config = ViewerConfig::from_toml(&content)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.scene.subdivisions, 16);
        assert_eq!(config.render.target_fps, 30);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(ViewerConfig::from_toml("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ViewerConfig::from_toml(
            r#"
            log_file = "vm3d.log"

            [camera]
            fov_degrees = 75.0
            start_position = [1.0, 2.0, 3.0]

            [scene]
            subdivisions = 32
            obj = "assets/pad.obj"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.start_position(), Vec3f::new(1.0, 2.0, 3.0));
        assert_eq!(config.scene.subdivisions, 32);
        assert_eq!(config.scene.obj, Some(PathBuf::from("assets/pad.obj")));
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.log_file, Some(PathBuf::from("vm3d.log")));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let err = ViewerConfig::from_toml("[camera]\nnear = 5.0\nfar = 1.0\n").unwrap_err();
        assert!(err.to_string().contains("camera.far"));

        assert!(ViewerConfig::from_toml("[camera]\nfov_degrees = 180.0\n").is_err());
        assert!(ViewerConfig::from_toml("[scene]\nsubdivisions = 0\n").is_err());
        assert!(ViewerConfig::from_toml("[render]\ntarget_fps = 0\n").is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = ViewerConfig::from_toml("[camera]\nnear = nan\n").unwrap_err();
        assert!(err.to_string().contains("camera.near"));

        let err = ViewerConfig::from_toml("[camera]\nfar = inf\n").unwrap_err();
        assert!(err.to_string().contains("camera.far"));

        let err = ViewerConfig::from_toml("[render]\nlight_direction = [nan, 1.0, 0.0]\n").unwrap_err();
        assert!(err.to_string().contains("render.light_direction"));

        assert!(ViewerConfig::from_toml("[camera]\nfov_degrees = nan\n").is_err());
        assert!(ViewerConfig::from_toml("[camera]\nmouse_sensitivity = -inf\n").is_err());
        assert!(ViewerConfig::from_toml("[camera]\nstart_position = [0.0, nan, 0.0]\n").is_err());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = ViewerConfig::from_toml("[camera\n").unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_from_path(Path::new("/nonexistent/vm3d.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}

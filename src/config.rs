//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`W4D_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;
use wire4d_render::{CameraSettings, RenderFlags, RenderSettings, ViewBoundary};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output configuration
    #[serde(default)]
    pub display: DisplayConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Render pass configuration
    #[serde(default)]
    pub render: RenderConfig,
    /// Scene configuration
    #[serde(default)]
    pub scene: SceneConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`W4D_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // W4D_SCENE__DIMENSION=3 -> scene.dimension = 3
        figment = figment.merge(Env::prefixed("W4D_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Reject values the renderer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension = self.scene.dimension;
        if dimension != 3 && dimension != 4 {
            return Err(ConfigError::invalid(format!(
                "scene.dimension must be 3 or 4, got {}",
                dimension
            )));
        }

        let render = &self.render;
        if render.focal <= 0.0 {
            return Err(ConfigError::invalid(format!("render.focal must be positive, got {}", render.focal)));
        }
        if render.small_z <= 0.0 {
            return Err(ConfigError::invalid(format!("render.small_z must be positive, got {}", render.small_z)));
        }
        if render.face_scales.is_empty() {
            return Err(ConfigError::invalid("render.face_scales must not be empty"));
        }
        if let Some(scale) = render.face_scales.iter().find(|&&s| s <= 0.0 || s > 1.0) {
            return Err(ConfigError::invalid(format!("render.face_scales must be in (0, 1], got {}", scale)));
        }

        // the view volume lives in the projected space, one dimension down
        match render.view_boundary {
            ViewBoundary::Sphere { radius } if radius <= 0.0 => {
                return Err(ConfigError::invalid(format!("view boundary radius must be positive, got {}", radius)));
            }
            ViewBoundary::Cylinder { radius, height, axis } => {
                if radius <= 0.0 || height <= 0.0 {
                    return Err(ConfigError::invalid("view boundary radius and height must be positive"));
                }
                if axis >= dimension - 1 {
                    return Err(ConfigError::invalid(format!(
                        "view boundary axis {} out of range for {}D projection",
                        axis,
                        dimension - 1
                    )));
                }
            }
            ViewBoundary::Sphere { .. } => {}
        }

        if !self.camera.start.is_empty() && self.camera.start.len() != dimension {
            return Err(ConfigError::invalid(format!(
                "camera.start has {} coordinates, expected {}",
                self.camera.start.len(),
                dimension
            )));
        }
        if self.display.screen_scale <= 0.0 {
            return Err(ConfigError::invalid("display.screen_scale must be positive"));
        }
        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Screen width in pixels (3D worlds)
    pub width: u32,
    /// Screen height in pixels (3D worlds)
    pub height: u32,
    /// Pixels per projected unit (3D worlds)
    pub screen_scale: f32,
    /// Draw two eyes side by side (4D worlds)
    pub stereo: bool,
    /// Offset of each eye from the scene origin (4D worlds)
    pub stereo_separation: [f32; 3],
    /// Where the projected scene is placed (4D worlds)
    pub origin: [f32; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            screen_scale: 100.0,
            stereo: true,
            stereo_separation: [5.0, 0.0, 0.0],
            origin: [0.0, 0.0, -15.0],
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position; empty uses the scene's start or the default
    pub start: Vec<f32>,
    /// Movement speed (units per second)
    pub speed: f32,
    /// Rotation speed (radians per second)
    pub angular_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start: Vec::new(),
            speed: 2.0,
            angular_speed: 1.5,
        }
    }
}

impl CameraConfig {
    pub fn to_camera_settings(&self) -> CameraSettings {
        CameraSettings {
            speed: self.speed,
            angular_speed: self.angular_speed,
        }
    }
}

/// Render pass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Perspective focal length
    pub focal: f32,
    /// Near plane offset in front of the camera
    pub small_z: f32,
    /// Scales each visible face is drawn at
    pub face_scales: Vec<f32>,
    /// Random points per visible face when `face_fuzz` is on
    pub fuzz_points: usize,
    /// Clip edges against other shapes
    pub clipping: bool,
    /// Clip to the view volume and draw its outline
    pub draw_boundary: bool,
    /// Scatter random points over visible faces
    pub face_fuzz: bool,
    /// Draw the camera's axis indicator
    pub camera_frame: bool,
    /// Volume that limits what is drawn after projection
    pub view_boundary: ViewBoundary,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            focal: settings.focal,
            small_z: settings.small_z,
            face_scales: settings.face_scales,
            fuzz_points: settings.fuzz_points,
            clipping: true,
            draw_boundary: true,
            face_fuzz: false,
            camera_frame: false,
            view_boundary: settings.view_boundary,
        }
    }
}

impl RenderConfig {
    pub fn flags(&self) -> RenderFlags {
        let mut flags = RenderFlags::empty();
        flags.set(RenderFlags::CLIPPING, self.clipping);
        flags.set(RenderFlags::VIEW_BOUNDARY, self.draw_boundary);
        flags.set(RenderFlags::FACE_FUZZ, self.face_fuzz);
        flags.set(RenderFlags::CAMERA_FRAME, self.camera_frame);
        flags
    }

    pub fn to_render_settings(&self) -> RenderSettings {
        RenderSettings {
            focal: self.focal,
            small_z: self.small_z,
            view_boundary: self.view_boundary,
            face_scales: self.face_scales.clone(),
            fuzz_points: self.fuzz_points,
            flags: self.flags(),
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of spatial dimensions (3 or 4)
    pub dimension: usize,
    /// Path to the scene file (RON)
    pub path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dimension: 4,
            path: "scenes/tesseracts.ron".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Headless frames to render before exiting
    pub frames: u32,
    /// Simulated seconds per frame
    pub frame_time: f32,
    /// Seed for fuzz point placement
    pub seed: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frames: 120,
            frame_time: 1.0 / 60.0,
            seed: 0,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        ConfigError {
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scene.dimension, 4);
        assert_eq!(config.render.focal, 4.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("focal"));
        assert!(toml.contains("kind = \"sphere\""));
    }

    #[test]
    fn test_flags_from_bools() {
        let mut render = RenderConfig::default();
        assert_eq!(render.flags(), RenderFlags::default());
        render.clipping = false;
        render.face_fuzz = true;
        let flags = render.flags();
        assert!(!flags.contains(RenderFlags::CLIPPING));
        assert!(flags.contains(RenderFlags::FACE_FUZZ | RenderFlags::VIEW_BOUNDARY));
        assert_eq!(render.to_render_settings().flags, flags);
    }

    #[test]
    fn test_validate_dimension() {
        let mut config = AppConfig::default();
        config.scene.dimension = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("scene.dimension"));
    }

    #[test]
    fn test_validate_render_values() {
        let mut config = AppConfig::default();
        config.render.focal = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.render.view_boundary = ViewBoundary::Sphere { radius: -1.0 };
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.render.face_scales = vec![0.9, 1.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cylinder_axis() {
        let mut config = AppConfig::default();
        config.scene.dimension = 3;
        config.render.view_boundary = ViewBoundary::Cylinder { radius: 5.0, height: 2.0, axis: 1 };
        assert!(config.validate().is_ok());
        config.render.view_boundary = ViewBoundary::Cylinder { radius: 5.0, height: 2.0, axis: 2 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_camera_start() {
        let mut config = AppConfig::default();
        config.camera.start = vec![0.0, 0.0, -5.0];
        assert!(config.validate().is_err());
        config.camera.start.push(-5.0);
        assert!(config.validate().is_ok());
    }
}

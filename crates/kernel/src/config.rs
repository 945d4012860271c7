use glam::Vec3;
use serde::{Deserialize, Serialize};
use spherescene_common::{Camera, Color, Light};
use std::path::Path;

/// Errors from loading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Initial scene layout. Every field is optional in YAML; missing fields take
/// the demo defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: Camera,
    pub light: Light,
    pub sphere: SphereConfig,
    pub ground: GroundConfig,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub diameter: f32,
    pub segments: u32,
    pub position: Vec3,
    /// Whether the sphere carries a material. Without one, color changes are
    /// rejected.
    pub material: bool,
    pub color: Color,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            diameter: 2.0,
            segments: 32,
            // Half the sphere's height above the ground.
            position: Vec3::new(0.0, 1.0, 0.0),
            material: true,
            color: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            width: 6.0,
            height: 6.0,
        }
    }
}

/// Output surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub msaa_samples: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            msaa_samples: 4,
        }
    }
}

impl Viewport {
    /// Width over height, with a zero height treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl SceneConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Variant without a sphere material; only vertical motion is meaningful.
    pub fn rise_only() -> Self {
        Self {
            sphere: SphereConfig {
                material: false,
                ..SphereConfig::default()
            },
            ..Self::default()
        }
    }
}

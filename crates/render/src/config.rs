//! Demo configuration, loaded from YAML.
//!
//! Every field has a default, so a partial or empty file is valid.
//! Command-line flags are applied on top by the binaries.

use crate::error::ConfigError;
use crate::settings::RenderSettings;
use lumen_scene::MAX_LIGHTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lumen".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub light_count: usize,
    pub seed: u64,
    /// Radians per second about world Y. Zero keeps the scene still.
    pub spin_speed: f32,
    /// Directory of PNG textures. Procedural assets when absent.
    pub asset_dir: Option<PathBuf>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            light_count: 64,
            seed: 0,
            spin_speed: 0.0,
            asset_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub render: RenderSettings,
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not as an empty map.
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        if self.scene.light_count > MAX_LIGHTS {
            return Err(ConfigError::Invalid(format!(
                "light_count {} exceeds the limit of {MAX_LIGHTS}",
                self.scene.light_count
            )));
        }
        self.render
            .ibl
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_is_default() {
        let config = DemoConfig::from_yaml_str("").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.scene.light_count, 64);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let yaml = "scene:\n  light_count: 8\n  seed: 42\nrender:\n  ssao:\n    enabled: false\n";
        let config = DemoConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.scene.light_count, 8);
        assert_eq!(config.scene.seed, 42);
        assert!(!config.render.ssao.enabled);
        assert_eq!(config.render.ssao.radius, 1.0);
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DemoConfig::from_yaml_str("window:\n  width: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DemoConfig::from_yaml_str("scene:\n  light_count: 1000\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DemoConfig::from_yaml_str("render:\n  ibl:\n    brdf_lut_size: 100\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DemoConfig::from_yaml_str("window: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let mut config = DemoConfig::default();
        config.scene.asset_dir = Some(PathBuf::from("assets"));
        config.render.draw_light_gizmos = true;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();
        let loaded = DemoConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            DemoConfig::load(Path::new("/nonexistent/lumen.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}

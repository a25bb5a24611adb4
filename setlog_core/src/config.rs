//! Configuration file support for setlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/setlog/config.toml`.

use crate::types::Template;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub timer: TimerConfig,

    #[serde(default)]
    pub plates: PlateConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Rest timer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            rest_seconds: default_rest_seconds(),
        }
    }
}

/// Plate calculator configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlateConfig {
    #[serde(default = "default_bar_weight")]
    pub bar_weight: f64,

    #[serde(default = "default_plates")]
    pub available: Vec<f64>,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            bar_weight: default_bar_weight(),
            available: default_plates(),
        }
    }
}

/// User-defined templates, offered next to the built-in ones
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub custom: Vec<Template>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("setlog")
}

fn default_rest_seconds() -> u32 {
    90
}

fn default_bar_weight() -> f64 {
    45.0
}

fn default_plates() -> Vec<f64> {
    vec![45.0, 35.0, 25.0, 10.0, 5.0, 2.5]
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("setlog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Built-in templates followed by the user's custom ones
    pub fn all_templates(&self) -> Vec<Template> {
        let mut templates = crate::templates::builtin_templates();
        templates.extend(self.templates.custom.iter().cloned());
        templates
    }

    fn check(&self) -> Result<()> {
        if self.timer.rest_seconds == 0 {
            return Err(Error::Config("timer.rest_seconds must be positive".into()));
        }
        if !(self.plates.bar_weight.is_finite() && self.plates.bar_weight >= 0.0) {
            return Err(Error::Config(
                "plates.bar_weight must be a number, 0 or more".into(),
            ));
        }
        if !self.plates.available.iter().all(|p| p.is_finite() && *p > 0.0) {
            return Err(Error::Config("plates.available must be positive numbers".into()));
        }
        for template in &self.templates.custom {
            if template.id.is_empty() || template.name.is_empty() {
                return Err(Error::Config(
                    "custom templates need an id and a name".into(),
                ));
            }
        }
        Ok(())
    }
}

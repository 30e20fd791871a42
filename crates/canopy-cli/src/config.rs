//! CLI configuration

use std::path::PathBuf;

use anyhow::Context;
use canopy_core::{ConsolidationMode, LoadSemantic};
use canopy_storage::model::validate_dimension_name;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "CANOPY_CONFIG_DIR";

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("canopy")
}

/// Path of the config file
pub fn config_file_path() -> PathBuf {
    let dir = std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("canopy")
        });
    dir.join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_dimension: Option<String>,
    pub default_mode: ConsolidationMode,
    pub default_semantic: LoadSemantic,
    pub format: OutputFormat,
}

impl Config {
    /// Load the config file, falling back to defaults if it is missing or unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "default_dimension", "default_mode", "default_semantic", "format"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(
                self.data_dir
                    .clone()
                    .unwrap_or_else(default_data_dir)
                    .display()
                    .to_string(),
            ),
            "default_dimension" => Some(self.default_dimension.clone().unwrap_or_default()),
            "default_mode" => Some(self.default_mode.to_string()),
            "default_semantic" => Some(self.default_semantic.to_string()),
            "format" => Some(self.format.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key {
            "data_dir" => self.data_dir = (!value.is_empty()).then(|| PathBuf::from(value)),
            "default_dimension" if value.is_empty() => self.default_dimension = None,
            "default_dimension" => {
                validate_dimension_name(value)?;
                self.default_dimension = Some(value.to_string());
            }
            "default_mode" => self.default_mode = value.parse()?,
            "default_semantic" => self.default_semantic = value.parse()?,
            "format" => self.format = value.parse()?,
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

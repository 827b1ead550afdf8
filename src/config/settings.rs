//! TOML-based configuration for qframe.
//!
//! Example configuration:
//! ```toml
//! [format]
//! enabled = true     # run the cosmetic reformat pass
//! uppercase = true   # uppercase keywords while reformatting
//! indent = 4
//!
//! [types]
//! dim = "VARCHAR(500)"
//! num = "FLOAT(53)"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::FieldType;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "QFRAME_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// SQL reformatting.
    pub format: FormatSettings,

    /// Cast types used for CREATE TABLE and column-type blocks.
    pub types: TypeSettings,
}

/// Cosmetic reformat pass applied to the rendered SQL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FormatSettings {
    /// When false, the single-line render is returned unchanged.
    pub enabled: bool,

    /// Uppercase SQL keywords.
    pub uppercase: bool,

    /// Spaces per indent level.
    pub indent: u8,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            uppercase: true,
            indent: 4,
        }
    }
}

/// Default cast types per field type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypeSettings {
    pub dim: String,
    pub num: String,
}

impl Default for TypeSettings {
    fn default() -> Self {
        Self {
            dim: "VARCHAR(500)".to_string(),
            num: "FLOAT(53)".to_string(),
        }
    }
}

impl TypeSettings {
    pub fn for_type(&self, field_type: FieldType) -> &str {
        match field_type {
            FieldType::Dimension => &self.dim,
            FieldType::Numeric => &self.num,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QFRAME_CONFIG`
    /// 2. `./qframe.toml`
    /// 3. `~/.config/qframe/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("qframe.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("qframe").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Settings with the reformat pass switched off.
    pub fn raw() -> Self {
        Self {
            format: FormatSettings {
                enabled: false,
                ..FormatSettings::default()
            },
            ..Self::default()
        }
    }
}

//! Configuration module for qframe.
//!
//! Handles the reformat pass and default cast types.

mod settings;

pub use settings::{FormatSettings, Settings, SettingsError, TypeSettings, CONFIG_ENV_VAR};

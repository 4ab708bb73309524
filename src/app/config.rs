use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdbSettings {
    /// Explicit adb executable. Empty means "resolve automatically".
    pub command_path: String,
}

impl Default for AdbSettings {
    fn default() -> Self {
        Self {
            command_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandSettings {
    pub key_timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            key_timeout_secs: 5,
            probe_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiSettings {
    pub theme: String,
    pub show_key_hints: bool,
    pub confirm_stop: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_key_hints: true,
            confirm_stop: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub adb: AdbSettings,
    #[serde(default)]
    pub command: CommandSettings,
    #[serde(default)]
    pub ui: UiSettings,
    /// Serial a send targets when the frontend does not pass one. Empty means
    /// adb's own default-device resolution.
    #[serde(default)]
    pub default_serial: String,
    #[serde(default)]
    pub version: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            adb: AdbSettings::default(),
            command: CommandSettings::default(),
            ui: UiSettings::default(),
            default_serial: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("MEDIA_REMOTE_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    home_dir().join(".media_remote_config.json")
}

pub fn backup_config_path() -> PathBuf {
    home_dir().join(".media_remote_config.backup.json")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn load_config(trace_id: &str) -> Result<AppConfig, AppError> {
    load_config_from_path(&config_path(), trace_id)
}

pub fn save_config(config: &AppConfig, trace_id: &str) -> Result<(), AppError> {
    save_config_to_path(config, &config_path(), &backup_config_path(), trace_id)
}

pub fn load_config_from_path(path: &Path, trace_id: &str) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| AppError::system(format!("Failed to read config: {err}"), trace_id))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| AppError::system(format!("Failed to parse config: {err}"), trace_id))?;
    let mut config: AppConfig = serde_json::from_value(value.clone()).unwrap_or_default();
    config = apply_legacy_overrides(config, &value);
    Ok(validate_config(config))
}

pub fn save_config_to_path(
    config: &AppConfig,
    path: &Path,
    backup_path: &Path,
    trace_id: &str,
) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if path.exists() {
        let _ = fs::copy(path, backup_path);
    }
    let payload = serde_json::to_string_pretty(config)
        .map_err(|err| AppError::system(format!("Failed to serialize config: {err}"), trace_id))?;
    fs::write(path, payload)
        .map_err(|err| AppError::system(format!("Failed to write config: {err}"), trace_id))?;
    Ok(())
}

/// The predecessor stored a flat `adb_path` at the top level. Honor it when
/// the nested field is unset so an upgraded install keeps its adb override.
fn apply_legacy_overrides(mut config: AppConfig, value: &serde_json::Value) -> AppConfig {
    if config.adb.command_path.trim().is_empty() {
        if let Some(adb_path) = value.get("adb_path").and_then(|v| v.as_str()) {
            config.adb.command_path = adb_path.to_string();
        }
    }
    if let Some(serial) = value.get("default_device").and_then(|v| v.as_str()) {
        if config.default_serial.trim().is_empty() {
            config.default_serial = serial.to_string();
        }
    }
    config
}

/// Saved configs get the same clamps as loaded ones, and the version field
/// always reflects the build doing the writing.
pub fn normalize_config_for_save(config: AppConfig) -> AppConfig {
    let mut config = validate_config(config);
    config.version = env!("CARGO_PKG_VERSION").to_string();
    config
}

fn validate_config(mut config: AppConfig) -> AppConfig {
    if !(1..=60).contains(&config.command.key_timeout_secs) {
        config.command.key_timeout_secs = 5;
    }
    if !(1..=60).contains(&config.command.probe_timeout_secs) {
        config.command.probe_timeout_secs = 5;
    }
    if !matches!(config.ui.theme.as_str(), "dark" | "light") {
        config.ui.theme = "dark".to_string();
    }
    config
}

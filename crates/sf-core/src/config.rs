//! Configuration for strikeflow
//!
//! Read from `<config_dir>/strikeflow/config.toml`. Every section has a
//! default so a missing file or a partial file is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: DebugConfig,
    pub input: InputConfig,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("strikeflow").join("config.toml"))
    }

    /// Load the configuration from the default location.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Logging options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    pub log_to_file: bool,
    pub log_path: PathBuf,
    /// Level overrides per log target, e.g. `coordinator = "trace"`
    pub components: BTreeMap<String, LogLevel>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            log_path: PathBuf::from("strikeflow.log"),
            components: BTreeMap::new(),
        }
    }
}

/// Coordinate interpretation of pose queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackingMode {
    /// Screen-space coordinates
    #[serde(rename = "2d")]
    Screen2D,
    /// World-space coordinates
    #[default]
    #[serde(rename = "3d")]
    World3D,
}

/// One of the five tracked body points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Head,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl BodyPart {
    pub const ALL: [BodyPart; 5] = [
        BodyPart::Head,
        BodyPart::LeftHand,
        BodyPart::RightHand,
        BodyPart::LeftFoot,
        BodyPart::RightFoot,
    ];
}

/// Provider selection options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Re-run priority evaluation on every registry change
    pub auto_switch: bool,
    /// Provider identifiers, highest priority first
    pub priority: Vec<String>,
    pub tracking_mode: TrackingMode,
    /// Body points providers should track
    pub body_track: Vec<BodyPart>,
    /// Per-provider settings, keyed by provider identifier
    pub providers: BTreeMap<String, toml::Table>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            auto_switch: true,
            priority: vec![
                "vr".to_string(),
                "camera".to_string(),
                "gamepad".to_string(),
                "keyboard".to_string(),
            ],
            tracking_mode: TrackingMode::World3D,
            body_track: BodyPart::ALL.to_vec(),
            providers: BTreeMap::new(),
        }
    }
}

impl InputConfig {
    /// Settings blob for a provider, converted to JSON.
    ///
    /// Providers without a table get an empty object.
    pub fn provider_settings(&self, id: &str) -> Result<serde_json::Value, ConfigError> {
        match self.providers.get(id) {
            Some(table) => Ok(serde_json::to_value(table)?),
            None => Ok(serde_json::Value::Object(Default::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert!(config.input.auto_switch);
        assert_eq!(config.input.priority[0], "vr");
        assert_eq!(config.input.body_track.len(), 5);
        assert_eq!(config.debug.log_level, LogLevel::Info);
    }

    #[test]
    fn parses_partial_file() {
        let text = r#"
            [debug]
            log_level = "trace"

            [debug.components]
            coordinator = "warn"

            [input]
            auto_switch = false
            priority = ["gamepad", "keyboard"]
            tracking_mode = "2d"
            body_track = ["head", "left_hand", "right_hand"]

            [input.providers.gamepad]
            deadzone = 0.15
            device = "pad0"
        "#;

        let config = Config::from_toml_str(text).unwrap();
        assert_eq!(config.debug.log_level, LogLevel::Trace);
        assert_eq!(config.debug.components["coordinator"], LogLevel::Warn);
        assert!(!config.input.auto_switch);
        assert_eq!(config.input.priority, vec!["gamepad", "keyboard"]);
        assert_eq!(config.input.tracking_mode, TrackingMode::Screen2D);
        assert_eq!(config.input.body_track.len(), 3);

        let settings = config.input.provider_settings("gamepad").unwrap();
        assert_eq!(settings["device"], "pad0");
        assert_eq!(settings["deadzone"], 0.15);
    }

    #[test]
    fn missing_provider_settings_are_empty() {
        let config = Config::default();
        let settings = config.input.provider_settings("camera").unwrap();
        assert!(settings.as_object().unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let text = "[debug]\nlog_level = \"loud\"\n";
        assert!(matches!(
            Config::from_toml_str(text),
            Err(ConfigError::Parse(_))
        ));
    }
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::SleepCalcError;
use crate::export::ExportFormat;
use crate::logging::{LogConfig, LogLevel};
use crate::models::{AgeBand, Chronotype};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Defaults used when a command does not pass its own
    pub profile: ProfileSettings,

    pub display: DisplaySettings,

    pub pacing: PacingSettings,

    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        ConfigMetadata {
            version: "1.0".to_string(),
            updated_at: Utc::now(),
        }
    }
}

/// Sleeper profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub chronotype: Chronotype,
    pub age_band: AgeBand,
}

/// Output preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub format: ExportFormat,

    /// Colored terminal output
    pub color: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            format: ExportFormat::Table,
            color: true,
        }
    }
}

/// Delay before results are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub delay_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        PacingSettings { delay_ms: 600 }
    }
}

impl PacingSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        debug!(path = %path.as_ref().display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sleeprs")
            .join("config.toml")
    }

    /// Load from `path` if the file exists
    ///
    /// A missing file is `Ok(None)`; a file that exists but does not read or
    /// parse is an error, left for the caller to report once logging is up.
    pub fn load_if_present<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        if !path.as_ref().exists() {
            debug!(path = %path.as_ref().display(), "No config file, using defaults");
            return Ok(None);
        }
        Self::load_from_file(path).map(Some)
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Set one value by dotted key, e.g. `profile.chronotype = late`
    pub fn set_value(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        match key {
            "profile.chronotype" => self.profile.chronotype = value.parse()?,
            "profile.age_band" => self.profile.age_band = value.parse()?,
            "display.format" => {
                self.display.format = value.parse().map_err(|_| {
                    SleepCalcError::invalid_option("display.format", value, "table, json, text, csv")
                })?
            }
            "display.color" => {
                self.display.color = value.parse().map_err(|_| {
                    SleepCalcError::invalid_option("display.color", value, "true, false")
                })?
            }
            "pacing.delay_ms" => {
                self.pacing.delay_ms = value.parse().map_err(|_| {
                    SleepCalcError::invalid_option("pacing.delay_ms", value, "milliseconds")
                })?
            }
            "logging.level" => {
                self.logging.level = value.parse::<LogLevel>().map_err(|_| {
                    SleepCalcError::invalid_option(
                        "logging.level",
                        value,
                        "error, warn, info, debug, trace",
                    )
                })?
            }
            _ => {
                return Err(SleepCalcError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

//! Configuration management (TOML)

use crate::collector::IdentityMode;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "MEMGUARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub kill_targets: Vec<KillTarget>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub sample_interval_seconds: u64,
    pub notification_method: NotificationMethod,
    pub notification_summary: String,
    /// Program run with `<summary> <body>` when the method is `command`.
    pub notification_command: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMethod {
    Desktop,
    Command,
    None,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub threshold_mb: u64,
    pub identity: IdentityMode,
    pub report_process_tree: bool,
}

/// Command line eligible for termination when its application alerts.
///
/// Compared byte for byte with the grouping key, so arguments are
/// separated by NUL: `identifier = "/usr/bin/app\u0000--flag"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct KillTarget {
    pub identifier: String,
}

impl KillTarget {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self { identifier: identifier.into() }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            sample_interval_seconds: 10,
            notification_method: NotificationMethod::Desktop,
            notification_summary: "System Monitor".to_string(),
            notification_command: "notify-send".to_string(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            threshold_mb: 1000,
            identity: IdentityMode::CommandLine,
            report_process_tree: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: GeneralConfig::default(),
            memory: MemoryConfig::default(),
            kill_targets: vec![],
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.threshold_mb == 0 {
            return Err(ConfigError::Invalid("memory.threshold_mb must be positive".into()));
        }
        if self.general.sample_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "general.sample_interval_seconds must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.general.sample_interval_seconds)
    }

    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        directories::ProjectDirs::from("", "", "memguard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

//! Configuration handling for wg-tray

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

const APP_DIR: &str = "wg-tray";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub wireguard: WireguardConfig,
    #[serde(default)]
    pub privilege: PrivilegeConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WireguardConfig {
    /// Directory scanned for interface configuration files
    pub config_dir: PathBuf,
    /// Suffix stripped from file names to get interface names
    pub config_suffix: String,
    pub wg_quick: String,
    pub wg: String,
}

impl Default for WireguardConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/wireguard"),
            config_suffix: ".conf".to_string(),
            wg_quick: "wg-quick".to_string(),
            wg: "wg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrivilegeConfig {
    /// Elevation helper prefixed to privileged commands. Empty disables it.
    pub elevate_with: String,
    /// Also elevate the `wg show interfaces` probe
    pub elevate_probe: bool,
}

impl Default for PrivilegeConfig {
    fn default() -> Self {
        Self {
            elevate_with: "pkexec".to_string(),
            elevate_probe: false,
        }
    }
}

/// Where interface names come from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceStrategy {
    /// Scan `config_dir` directly
    Directory,
    /// Use the list captured by `wg-tray scan`
    Persisted,
    /// Directory when readable, persisted list otherwise
    #[default]
    Auto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    #[serde(default)]
    pub strategy: SourceStrategy,
    /// Override for the persisted interface list location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        app_dir().join("config.toml")
    }

    /// Location of the persisted interface list
    pub fn store_path(&self) -> PathBuf {
        self.source
            .store_path
            .clone()
            .unwrap_or_else(|| app_dir().join("settings.json"))
    }
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

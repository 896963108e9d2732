//! Configuration for the backup engine
//!
//! Default config location: ~/.laverna/backup.toml

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BackupConfig {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Archive naming and layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Top-level directory inside the archive
    #[serde(default = "default_archive_root")]
    pub archive_root: String,
    /// File name of the full/raw backup archive
    #[serde(default = "default_archive_filename")]
    pub archive_filename: String,
    /// File name of the key-only export
    #[serde(default = "default_key_filename")]
    pub key_filename: String,
    /// Pretty-print JSON entries
    #[serde(default)]
    pub pretty_json: bool,
}

fn default_archive_root() -> String {
    "laverna-backups".to_string()
}

fn default_archive_filename() -> String {
    "laverna-backup.zip".to_string()
}

fn default_key_filename() -> String {
    "lav-private-key.asc".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive_root: default_archive_root(),
            archive_filename: default_archive_filename(),
            key_filename: default_key_filename(),
            pretty_json: false,
        }
    }
}

/// Where records and app-level configs come from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Directory holding `<profile>/<kind>.json` files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Profile whose configs hold app-level settings
    #[serde(default = "default_config_profile")]
    pub config_profile: String,
    /// Config name listing the profiles to back up
    #[serde(default = "default_profiles_config")]
    pub profiles_config: String,
    /// Config name holding the private key
    #[serde(default = "default_private_key_config")]
    pub private_key_config: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.laverna/data")
}

fn default_config_profile() -> String {
    "default".to_string()
}

fn default_profiles_config() -> String {
    "appProfiles".to_string()
}

fn default_private_key_config() -> String {
    "privateKey".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            config_profile: default_config_profile(),
            profiles_config: default_profiles_config(),
            private_key_config: default_private_key_config(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory finished exports are saved into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl BackupConfig {
    /// Load config from file path; a missing file yields the defaults
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            toml::from_str(&content)?
        } else {
            BackupConfig::default()
        };
        config.expand_paths()?;
        config.validate()?;
        Ok(config)
    }

    /// Archive paths are joined with '/', so the root must be a plain relative prefix
    pub fn validate(&self) -> Result<()> {
        let root = &self.export.archive_root;
        if root.is_empty() || root.starts_with('/') || root.split('/').any(|p| p.is_empty() || p == "..") {
            return Err(anyhow!("Invalid archive_root '{}'", root));
        }
        if self.export.archive_filename.is_empty() || self.export.key_filename.is_empty() {
            return Err(anyhow!("Export file names must not be empty"));
        }
        Ok(())
    }

    fn expand_paths(&mut self) -> Result<()> {
        self.source.data_dir = expand_tilde(&self.source.data_dir)?;
        self.storage.output_dir = expand_tilde(&self.storage.output_dir)?;
        Ok(())
    }
}

/// Default config file path
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".laverna")
        .join("backup.toml")
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
    Ok(home.join(rest))
}

//! Export options, modes and results.

use laverna_storage::SavedObject;
use serde::Serialize;

use crate::config::BackupConfig;
use crate::model::ProfileData;

/// Which kind of export a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Private key only, no archive
    Key,
    /// Caller-supplied collections
    Data,
    /// Every configured profile
    Full,
}

impl std::fmt::Display for ExportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportMode::Key => write!(f, "key"),
            ExportMode::Data => write!(f, "data"),
            ExportMode::Full => write!(f, "full"),
        }
    }
}

/// Options for a single export run.
///
/// `export_key` wins over `data`; with neither set the run is a full export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub export_key: bool,
    pub data: Option<ProfileData>,
}

impl ExportOptions {
    pub fn key() -> Self {
        Self {
            export_key: true,
            data: None,
        }
    }

    pub fn data(data: ProfileData) -> Self {
        Self {
            export_key: false,
            data: Some(data),
        }
    }

    pub fn full() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ExportMode {
        if self.export_key {
            ExportMode::Key
        } else if self.data.is_some() {
            ExportMode::Data
        } else {
            ExportMode::Full
        }
    }
}

/// Names and config keys an export run depends on.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub archive_root: String,
    pub archive_filename: String,
    pub key_filename: String,
    pub profiles_config: String,
    pub private_key_config: String,
    pub pretty_json: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from(&BackupConfig::default())
    }
}

impl From<&BackupConfig> for ExportSettings {
    fn from(config: &BackupConfig) -> Self {
        Self {
            archive_root: config.export.archive_root.clone(),
            archive_filename: config.export.archive_filename.clone(),
            key_filename: config.export.key_filename.clone(),
            profiles_config: config.source.profiles_config.clone(),
            private_key_config: config.source.private_key_config.clone(),
            pretty_json: config.export.pretty_json,
        }
    }
}

/// Outcome of an export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub mode: ExportMode,
    /// Profiles that contributed entries
    pub profiles: Vec<String>,
    /// Number of archive entries written
    pub entries: usize,
    /// What was handed to the save target; `None` when there was nothing to save
    pub saved: Option<SavedObject>,
}

impl ExportReport {
    pub fn is_noop(&self) -> bool {
        self.saved.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_priority() {
        assert_eq!(ExportOptions::full().mode(), ExportMode::Full);
        assert_eq!(ExportOptions::data(ProfileData::new()).mode(), ExportMode::Data);
        assert_eq!(ExportOptions::key().mode(), ExportMode::Key);

        let both = ExportOptions {
            export_key: true,
            data: Some(ProfileData::new()),
        };
        assert_eq!(both.mode(), ExportMode::Key);
    }

    #[test]
    fn test_settings_from_config() {
        let settings = ExportSettings::default();
        assert_eq!(settings.archive_root, "laverna-backups");
        assert_eq!(settings.key_filename, "lav-private-key.asc");
        assert_eq!(settings.profiles_config, "appProfiles");
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ExportMode::Full.to_string(), "full");
        assert_eq!(ExportMode::Key.to_string(), "key");
    }
}

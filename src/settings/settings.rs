// Settings management and persistence
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::persistence::DEFAULT_ORDER_KEY;

/// Where the players document lives and where songs are resolved from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSettings {
    pub source: PathBuf,
    pub media_root: Option<PathBuf>, // Defaults to the app directory
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data").join("players.json"),
            media_root: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    JsonFile,
    Sqlite,
    Memory,
}

/// Storage for the saved lineup order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub file_name: Option<String>, // Per-backend default when unset
    pub order_key: String,
}

impl StorageSettings {
    pub fn file_name(&self) -> &str {
        match (&self.file_name, self.backend) {
            (Some(name), _) => name.as_str(),
            (None, StorageBackend::Sqlite) => "walkup.db",
            (None, _) => "local_storage.json",
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::JsonFile,
            file_name: None,
            order_key: DEFAULT_ORDER_KEY.to_string(),
        }
    }
}

/// What the reset button clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    CountersOnly,
    CountersAndOrder,
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub unlock_probe: bool,
    pub reset_mode: ResetMode,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            unlock_probe: true,
            reset_mode: ResetMode::CountersAndOrder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String, // tracing EnvFilter directives
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub roster: RosterSettings,
    pub storage: StorageSettings,
    pub playback: PlaybackSettings,
    pub speech: SpeechSettings,
    pub logging: LoggingSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            roster: RosterSettings::default(),
            storage: StorageSettings::default(),
            playback: PlaybackSettings::default(),
            speech: SpeechSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppSettings {
    /// Get the settings file path
    pub fn get_settings_path(app_dir: &Path) -> PathBuf {
        app_dir.join("settings.json")
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(app_dir);

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings {:?}", path))?;

        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        // Ensure directory exists
        fs::create_dir_all(app_dir).context("Failed to create settings directory")?;

        let path = Self::get_settings_path(app_dir);
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write settings file {:?}", path))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Players document, resolved against the app directory
    pub fn roster_path(&self, app_dir: &Path) -> PathBuf {
        app_dir.join(&self.roster.source)
    }

    pub fn media_root(&self, app_dir: &Path) -> PathBuf {
        match &self.roster.media_root {
            Some(root) => app_dir.join(root),
            None => app_dir.to_path_buf(),
        }
    }

    pub fn storage_path(&self, app_dir: &Path) -> PathBuf {
        app_dir.join(self.storage.file_name())
    }
}

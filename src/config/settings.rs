//! Application settings and configuration types.
//!
//! Settings are persisted to `~/.config/veranda/settings.json` (or XDG
//! equivalent) and loaded at application startup. A missing file yields
//! the defaults, so a fresh setup needs no configuration step.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fetch::Quota;

/// Errors from loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the settings file failed.
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file held invalid JSON.
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider request quota used to pace mailbox fetches.
    pub quota: Quota,
    /// Feed behavior settings.
    pub feed: FeedSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quota: Quota::default(),
            feed: FeedSettings::default(),
        }
    }
}

/// Feed behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Messages per feed page.
    pub page_size: usize,
    /// Mailbox ids listed per sync page.
    pub sync_batch: u32,
    /// Upper bound in minutes for the quick reads view.
    pub quick_read_minutes: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: 5,
            sync_batch: 100,
            quick_read_minutes: 5,
        }
    }
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// A missing file yields the defaults. Fields absent from the file
    /// take their default values, so older settings files keep working.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Saves settings as pretty-printed JSON, creating parent directories
    /// as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// The settings file location under the user's config directory.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "panbanda", "veranda")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }
}

//! Configuration management for the course state store

use crate::course::Course;
use crate::paths;
use crate::state::LabId;
use crate::storage::persisted::STORAGE_KEY;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default delay before a scroll-to-top hint should be applied.
pub const DEFAULT_SCROLL_DELAY_MS: u64 = 100;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Key the state document is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Lab shown on first start
    #[serde(default = "default_first_lab_id")]
    pub first_lab_id: LabId,

    /// Number of lessons "complete and advance" walks through
    #[serde(default = "default_total_lab_count")]
    pub total_lab_count: u32,

    /// Reject model ids the active provider does not list
    #[serde(default)]
    pub strict_model_selection: bool,

    /// Delay attached to scroll-to-top hints, in milliseconds
    #[serde(default = "default_scroll_delay")]
    pub scroll_delay_ms: u64,
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

fn default_first_lab_id() -> LabId {
    Course::default().first_lab_id()
}

fn default_total_lab_count() -> u32 {
    Course::default().navigable_count()
}

const fn default_scroll_delay() -> u64 {
    DEFAULT_SCROLL_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            first_lab_id: default_first_lab_id(),
            total_lab_count: default_total_lab_count(),
            strict_model_selection: false,
            scroll_delay_ms: default_scroll_delay(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if reading or parsing the config file fails
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds
    /// invalid values
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Check values serde cannot rule out
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        ensure!(self.total_lab_count > 0, "total_lab_count must be positive");
        ensure!(!self.storage_key.is_empty(), "storage_key must not be empty");
        Ok(())
    }

    /// Directory holding the config and state files
    #[must_use]
    pub fn data_dir() -> PathBuf {
        paths::app_data_dir()
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }
}

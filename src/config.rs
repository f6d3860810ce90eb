//! Application configuration management.
//!
//! Persisted defaults for scan and resolution options, stored as JSON at
//! the platform config path. CLI flags always win over the file.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted application defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of I/O threads for hashing.
    #[serde(default = "default_io_threads")]
    pub io_threads: usize,
    /// Minimum file size to consider, in bytes.
    #[serde(default)]
    pub min_size: Option<u64>,
    /// Skip hidden files and directories.
    #[serde(default = "default_true")]
    pub skip_hidden: bool,
    /// Follow symbolic links.
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Only consider recognized media files.
    #[serde(default)]
    pub media_only: bool,
}

fn default_io_threads() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: default_io_threads(),
            min_size: None,
            skip_hidden: true,
            follow_symlinks: false,
            media_only: false,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Missing or unreadable files fall back to defaults.
    #[must_use]
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the configuration to the default platform-specific path.
    ///
    /// # Errors
    ///
    /// Fails if the config directory cannot be created or written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "mediadupe", "mediadupe")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }
}

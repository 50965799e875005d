//! Configuration management for sqview.
//!
//! Loads configuration from ${SQVIEW_HOME}/config.toml with sensible
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for sqview configuration and log files.
    //!
    //! SQVIEW_HOME resolution order:
    //! 1. SQVIEW_HOME environment variable (if set)
    //! 2. ~/.config/sqview (default)

    use std::path::PathBuf;

    /// Returns the sqview home directory.
    pub fn sqview_home() -> PathBuf {
        if let Ok(home) = std::env::var("SQVIEW_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("sqview"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        sqview_home().join("config.toml")
    }

    /// Returns the directory diagnostics are written to.
    pub fn log_dir() -> PathBuf {
        sqview_home()
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Snapshot command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory experiment copies are created under.
    pub base_dir: String,
    /// Basename globs skipped while copying.
    pub exclude: Vec<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            base_dir: crate::snapshot::DEFAULT_BASE_DIR.to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding Slurm submission scripts and log files.
    pub log_dir: Option<String>,

    /// GitHub user for the activity feed.
    pub github_user: Option<String>,

    /// Lines materialized per viewport expansion step.
    pub buffer_size: usize,

    /// Edge margin (in lines) that triggers an expansion.
    pub scroll_buffer: usize,

    /// Full replacement for the squeue command line (fixture playback,
    /// offline use).
    pub queue_command: Option<String>,

    /// Snapshot command configuration.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Config {
    const DEFAULT_BUFFER_SIZE: usize = 500;
    const DEFAULT_SCROLL_BUFFER: usize = 50;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };
        ensure!(
            config.buffer_size > 0,
            "buffer_size must be positive in {}",
            path.display()
        );
        ensure!(
            config.scroll_buffer > 0 && config.scroll_buffer < config.buffer_size,
            "scroll_buffer must be between 1 and buffer_size in {}",
            path.display()
        );
        Ok(config)
    }

    /// The effective log directory: config value, else the
    /// SLURM_DASHBOARD_DIR environment variable.
    pub fn effective_log_dir(&self) -> Option<PathBuf> {
        self.log_dir
            .clone()
            .or_else(|| std::env::var("SLURM_DASHBOARD_DIR").ok())
            .map(PathBuf::from)
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        ensure!(
            !path.exists(),
            "Config file already exists at {}",
            path.display()
        );
        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as
    /// needed. Uses atomic write (temp file + rename) to prevent
    /// corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: None,
            github_user: None,
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            scroll_buffer: Self::DEFAULT_SCROLL_BUFFER,
            queue_command: None,
            snapshot: SnapshotConfig::default(),
        }
    }
}

//! Application configuration.
//!
//! Contains the settings that control which mode a sync defaults to,
//! which pipeline runs it and where history is kept.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::models::SyncMode;

/// Defaults applied to `sync` and `plan` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Mode requested when the command line does not name one.
    #[serde(default)]
    pub default_mode: SyncMode,

    /// Project view read when the command line does not name one.
    #[serde(default = "default_project_view")]
    pub project_view: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_mode: SyncMode::default(),
            project_view: default_project_view(),
        }
    }
}

fn default_project_view() -> PathBuf {
    PathBuf::from(".bazelproject")
}

/// History display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of attempts `history` shows by default.
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
        }
    }
}

const fn default_display_limit() -> usize {
    10
}

/// External command that performs the actual sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Program and arguments. Empty means no build step is run.
    #[serde(default)]
    pub command: Vec<String>,

    /// Working directory for the command.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".build-sync")
    }

    /// Get the history database path.
    #[must_use]
    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir().join("history.db")
    }

    /// Get the lock file path.
    #[must_use]
    pub fn lock_file_path(&self) -> PathBuf {
        self.data_dir().join("sync.lock")
    }
}

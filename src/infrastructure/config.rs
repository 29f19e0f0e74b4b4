//! Configuration file management.
//!
//! Handles loading and creating TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# build-sync configuration
# Auto-generated - edit as needed

[sync]
# Mode used when --mode is not given: incremental, full or no_build
default_mode = "incremental"

# Project view read when --project-view is not given
project_view = ".bazelproject"

[history]
# Attempts shown by `build-sync history` (default: 10)
display_limit = 10

[pipeline]
# Command that performs the sync. It receives BUILD_SYNC_MODE,
# BUILD_SYNC_WORKSPACE_TYPE, BUILD_SYNC_LANGUAGES and BUILD_SYNC_DIRECTORIES
# in its environment.
# Leave empty to only record bookkeeping.
command = []
# working_dir = "/path/to/workspace"

[paths]
# Custom data directory (optional, defaults to ~/.build-sync)
# data_dir = "/custom/path"
"#;

/// Load configuration from `path`, or from the default location.
///
/// A missing default file yields the default configuration; a missing
/// explicit file is an error.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return load_config_from_file(path);
    }

    let config_path = config_file_path();
    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create the default configuration file at `path` if it doesn't exist.
///
/// Returns `true` if a file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default_data_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SyncMode;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.sync.default_mode, SyncMode::Incremental);
        assert_eq!(config.history.display_limit, 10);
        assert!(config.pipeline.command.is_empty());
    }

    #[test]
    fn test_default_config_documents_pipeline_environment() {
        for var in [
            "BUILD_SYNC_MODE",
            "BUILD_SYNC_WORKSPACE_TYPE",
            "BUILD_SYNC_LANGUAGES",
            "BUILD_SYNC_DIRECTORIES",
        ] {
            assert!(DEFAULT_CONFIG.contains(var), "{var} missing");
        }
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [pipeline]
            command = ["bazel", "build", "//..."]
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.command.len(), 3);
        assert_eq!(config.sync.default_mode, SyncMode::Incremental);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            format!(
                "[sync]\ndefault_mode = \"full\"\n[paths]\ndata_dir = {:?}\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let loaded = load_config(Some(&path)).unwrap();

        assert_eq!(loaded.sync.default_mode, SyncMode::Full);
        assert_eq!(loaded.paths.data_dir, Some(dir.path().to_path_buf()));
        assert_eq!(loaded.history_db_path(), dir.path().join("history.db"));
    }

    #[test]
    fn test_ensure_config_exists_writes_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        assert!(ensure_config_exists(&path).unwrap());
        assert!(!ensure_config_exists(&path).unwrap());
        assert!(load_config_from_file(&path).is_ok());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }
}

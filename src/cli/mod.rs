//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use build_sync::application::OutputFormat;
use build_sync::domain::SyncMode;

/// Build-sync - run incremental or full build-graph syncs, escalating when needed.
#[derive(Parser, Debug)]
#[command(name = "build-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: markdown, json, or table.
    #[arg(short, long, default_value = "markdown")]
    pub format: String,

    /// Configuration file (default: ~/.build-sync/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one sync, escalating to a full sync when required.
    Sync {
        /// Requested mode: incremental, full, or no-build.
        #[arg(short, long)]
        mode: Option<String>,

        /// Project view file (default from config).
        #[arg(short, long)]
        project_view: Option<PathBuf>,
    },

    /// Show what a sync would do without running it.
    Plan {
        /// Requested mode: incremental, full, or no-build.
        #[arg(short, long)]
        mode: Option<String>,

        /// Project view file (default from config).
        #[arg(short, long)]
        project_view: Option<PathBuf>,
    },

    /// Show recent sync attempts.
    History {
        /// Number of attempts to show (default from config).
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the last successful sync state.
    Status,

    /// List supported workspace types and their languages.
    Languages,

    /// Show data, history, config and lock file paths.
    Paths,

    /// Write the default configuration file if missing.
    Init,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}

/// Parse a `--mode` argument, falling back to `default`.
pub fn parse_mode(mode: Option<&str>, default: SyncMode) -> Result<SyncMode, String> {
    mode.map_or(Ok(default), str::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_command() {
        let cli = Cli::try_parse_from([
            "build-sync",
            "-vv",
            "sync",
            "--mode",
            "full",
            "--project-view",
            "app/.bazelproject",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Sync { mode, project_view } => {
                assert_eq!(mode.as_deref(), Some("full"));
                assert_eq!(project_view, Some(PathBuf::from("app/.bazelproject")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_mode_defaults() {
        assert_eq!(
            parse_mode(None, SyncMode::Incremental).unwrap(),
            SyncMode::Incremental
        );
        assert_eq!(
            parse_mode(Some("no-build"), SyncMode::Full).unwrap(),
            SyncMode::NoBuild
        );
        assert!(parse_mode(Some("partial"), SyncMode::Full).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let cli = Cli::try_parse_from(["build-sync", "-f", "yaml", "status"]).unwrap();
        assert!(cli.output_format().is_err());
    }
}

//! Build-sync - run incremental or full build-graph syncs for a project view.
//!
//! Every sync is recorded in a local history. An incremental request is
//! escalated to a full sync when there is no successful baseline, the
//! workspace type changed, or a language was enabled since that baseline.
//!
//!   build-sync sync                     # incremental unless escalation is needed
//!   build-sync plan --mode incremental  # show the decision without running
//!   build-sync history --limit 5        # recent attempts
//!   build-sync status                   # last successful configuration

mod cli;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use build_sync::application::{
    format_history_markdown, format_history_table, format_json, format_outcome_markdown,
    format_plan_markdown, format_registry_table, format_status, CapabilityRegistry,
    NoopPipeline, OutputFormat, SyncOrchestrator, SyncPipeline,
};
use build_sync::domain::{
    AppConfig, LanguageClass, ProjectConfiguration, SyncHistoryStore, WorkspaceType,
};
use build_sync::infrastructure::{
    builtin_registry, config_file_path, ensure_config_exists, load_config, load_project_view,
    CommandPipeline, SqliteHistoryStore, SyncLock,
};
use cli::{parse_mode, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Main application logic. Returns `false` when a sync ran and failed.
fn run(cli: Cli) -> Result<bool> {
    let format = cli.output_format().map_err(anyhow::Error::msg)?;
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Sync { mode, project_view } => {
            return cmd_sync(&config, mode.as_deref(), project_view.as_deref(), format);
        }
        Commands::Plan { mode, project_view } => {
            cmd_plan(&config, mode.as_deref(), project_view.as_deref(), format)?;
        }
        Commands::History { limit } => {
            cmd_history(&config, limit.unwrap_or(config.history.display_limit), format)?;
        }
        Commands::Status => {
            cmd_status(&config, format)?;
        }
        Commands::Languages => {
            cmd_languages(&builtin_registry(), format)?;
        }
        Commands::Paths => {
            cmd_paths(&config, cli.config.as_deref());
        }
        Commands::Init => {
            cmd_init(cli.config.as_deref())?;
        }
    }

    Ok(true)
}

/// Run one sync attempt.
fn cmd_sync(
    config: &AppConfig,
    mode: Option<&str>,
    project_view: Option<&Path>,
    format: OutputFormat,
) -> Result<bool> {
    let requested = parse_mode(mode, config.sync.default_mode).map_err(anyhow::Error::msg)?;
    let project = read_project(config, project_view)?;

    let _lock = SyncLock::acquire(&config.lock_file_path())?;
    let history = open_history(config)?;

    let pipeline: Box<dyn SyncPipeline> = match CommandPipeline::from_config(&config.pipeline) {
        Some(pipeline) => Box::new(pipeline),
        None => {
            tracing::info!("No pipeline command configured, recording bookkeeping only");
            Box::new(NoopPipeline)
        }
    };

    let mut orchestrator = SyncOrchestrator::new(builtin_registry(), history, pipeline);
    let outcome = orchestrator.run_sync(requested, &project);

    let output = match format {
        OutputFormat::Json => format_json(&outcome)?,
        OutputFormat::Markdown | OutputFormat::Table => format_outcome_markdown(&outcome),
    };
    println!("{output}");

    // An unrecorded success leaves no baseline, so report it as a failure.
    Ok(outcome.succeeded() && outcome.recorded())
}

/// Show the decision a sync would make.
fn cmd_plan(
    config: &AppConfig,
    mode: Option<&str>,
    project_view: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let requested = parse_mode(mode, config.sync.default_mode).map_err(anyhow::Error::msg)?;
    let project = read_project(config, project_view)?;
    let history = open_history(config)?;

    let orchestrator = SyncOrchestrator::new(builtin_registry(), history, NoopPipeline);
    let plan = orchestrator.plan(requested, &project);

    let output = match format {
        OutputFormat::Json => format_json(&plan)?,
        OutputFormat::Markdown | OutputFormat::Table => format_plan_markdown(&plan),
    };
    println!("{output}");

    Ok(())
}

/// Show recent attempts.
fn cmd_history(config: &AppConfig, limit: usize, format: OutputFormat) -> Result<()> {
    let history = open_history(config)?;
    let attempts = history.recent(limit)?;

    let output = match format {
        OutputFormat::Markdown => format_history_markdown(&attempts),
        OutputFormat::Json => format_json(&attempts)?,
        OutputFormat::Table => format_history_table(&attempts),
    };
    println!("{output}");

    Ok(())
}

/// Show the last successful sync state.
fn cmd_status(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let history = open_history(config)?;
    let snapshot = history
        .last_successful()
        .context("Failed to read last successful sync")?;

    let output = match format {
        OutputFormat::Json => format_json(&snapshot)?,
        OutputFormat::Markdown | OutputFormat::Table => format_status(snapshot.as_ref()),
    };
    println!("{output}");

    Ok(())
}

/// List supported workspace types and languages.
fn cmd_languages(registry: &CapabilityRegistry, format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Json => {
            let support: BTreeMap<WorkspaceType, Vec<LanguageClass>> = registry
                .supported_workspace_types()
                .into_iter()
                .map(|ws| (ws, registry.supported_languages(ws).into_iter().collect()))
                .collect();
            format_json(&support)?
        }
        OutputFormat::Markdown | OutputFormat::Table => format_registry_table(registry),
    };
    println!("{output}");

    Ok(())
}

/// Show the paths in use.
fn cmd_paths(config: &AppConfig, explicit_config: Option<&Path>) {
    let config_path = explicit_config.map_or_else(config_file_path, Path::to_path_buf);

    println!("{}", "📂 build-sync paths".bold());
    println!();
    println!("  {:<12} {}", "data".green(), config.data_dir().display());
    println!("  {:<12} {}", "history".green(), config.history_db_path().display());
    println!("  {:<12} {}", "config".green(), config_path.display());
    println!("  {:<12} {}", "lock".green(), config.lock_file_path().display());
    println!(
        "  {:<12} {}",
        "project view".green(),
        config.sync.project_view.display()
    );
}

/// Write the default config file.
fn cmd_init(explicit_config: Option<&Path>) -> Result<()> {
    let path = explicit_config.map_or_else(config_file_path, Path::to_path_buf);

    if ensure_config_exists(&path)? {
        println!("{} Created {}", "✓".green().bold(), path.display());
    } else {
        println!("{} already exists", path.display());
    }

    Ok(())
}

fn open_history(config: &AppConfig) -> Result<SqliteHistoryStore> {
    let path = config.history_db_path();
    SqliteHistoryStore::open(&path)
        .with_context(|| format!("Failed to open sync history at {}", path.display()))
}

/// Load the project view. A missing default view means an empty project.
fn read_project(config: &AppConfig, explicit: Option<&Path>) -> Result<ProjectConfiguration> {
    if let Some(path) = explicit {
        return load_project_view(path)
            .with_context(|| format!("Invalid project view {}", path.display()));
    }

    let path = &config.sync.project_view;
    if path.exists() {
        load_project_view(path).with_context(|| format!("Invalid project view {}", path.display()))
    } else {
        tracing::warn!(path = %path.display(), "Project view not found, using an empty project");
        Ok(ProjectConfiguration::default())
    }
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

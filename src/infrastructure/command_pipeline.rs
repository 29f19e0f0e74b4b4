//! External-command sync pipeline.
//!
//! Runs the configured build command once per sync, telling it which mode
//! to run in through environment variables.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use crate::application::SyncPipeline;
use crate::domain::{
    format_languages, PipelineConfig, PipelineError, ProjectConfiguration, ResolvedConfiguration,
    SyncMode,
};

/// Lines of stderr kept in a failure detail.
const STDERR_TAIL_LINES: usize = 5;

/// Sync pipeline backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandPipeline {
    /// Create a pipeline running `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    /// Build from configuration. `None` when no command is configured.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Option<Self> {
        let (program, args) = config.command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: config.working_dir.clone(),
        })
    }

    /// Run the command in `dir`.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl SyncPipeline for CommandPipeline {
    fn execute(
        &mut self,
        mode: SyncMode,
        project: &ProjectConfiguration,
        configuration: &ResolvedConfiguration,
    ) -> std::result::Result<String, PipelineError> {
        let languages: Vec<&str> = configuration
            .active_languages
            .iter()
            .map(|l| l.name())
            .collect();
        let directories: Vec<&str> = project.included_directories().collect();

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env("BUILD_SYNC_MODE", mode.name())
            .env("BUILD_SYNC_WORKSPACE_TYPE", configuration.workspace_type.name())
            .env("BUILD_SYNC_LANGUAGES", languages.join(","))
            .env("BUILD_SYNC_DIRECTORIES", directories.join(","));
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::info!(
            program = %self.program,
            %mode,
            languages = %format_languages(&configuration.active_languages),
            "Running sync pipeline"
        );

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PipelineError::Failed(format!("failed to start '{}': {e}", self.program))
            })?;

        // Drain stderr on its own thread so neither pipe can fill and stall the child.
        let stderr_tail = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || tail_lines(stderr, STDERR_TAIL_LINES)));
        let summary = child
            .stdout
            .take()
            .and_then(|stdout| tail_lines(stdout, 1).pop_back());

        let status = child.wait().map_err(|e| {
            PipelineError::Failed(format!("failed to wait for '{}': {e}", self.program))
        })?;
        let stderr_tail: Vec<String> = stderr_tail
            .and_then(|handle| handle.join().ok())
            .map(Vec::from)
            .unwrap_or_default();

        if status.success() {
            return Ok(summary.unwrap_or_else(|| format!("{mode} sync finished")));
        }

        // No exit code means the process was killed by a signal.
        let Some(code) = status.code() else {
            return Err(PipelineError::Cancelled);
        };

        let tail = stderr_tail.join("\n");
        Err(PipelineError::Failed(if tail.is_empty() {
            format!("'{}' exited with status {code}", self.program)
        } else {
            format!("'{}' exited with status {code}: {tail}", self.program)
        }))
    }
}

/// Last `keep` non-blank lines of `reader`, trimmed. Earlier lines are
/// logged at trace level and dropped.
fn tail_lines(reader: impl Read, keep: usize) -> VecDeque<String> {
    let mut tail = VecDeque::with_capacity(keep + 1);
    for raw in BufReader::new(reader)
        .split(b'\n')
        .map_while(std::result::Result::ok)
    {
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        tracing::trace!(line, "pipeline output");
        tail.push_back(line.to_string());
        if tail.len() > keep {
            tail.pop_front();
        }
    }
    tail
}

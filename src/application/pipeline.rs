//! Seams to the work a sync actually performs and to sync telemetry.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{
    PipelineError, ProjectConfiguration, ResolvedConfiguration, SyncMode, SyncStats,
};

/// The external build/indexing pipeline.
///
/// May take arbitrarily long and may fail; timeouts and cancellation are the
/// implementation's concern.
pub trait SyncPipeline {
    /// Run one sync in `mode`.
    ///
    /// Returns a short human-readable detail on success.
    ///
    /// # Errors
    /// Returns `PipelineError::Failed` or `PipelineError::Cancelled`.
    fn execute(
        &mut self,
        mode: SyncMode,
        project: &ProjectConfiguration,
        configuration: &ResolvedConfiguration,
    ) -> std::result::Result<String, PipelineError>;
}

impl<P: SyncPipeline + ?Sized> SyncPipeline for Box<P> {
    fn execute(
        &mut self,
        mode: SyncMode,
        project: &ProjectConfiguration,
        configuration: &ResolvedConfiguration,
    ) -> std::result::Result<String, PipelineError> {
        (**self).execute(mode, project, configuration)
    }
}

/// Pipeline with no build step; always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPipeline;

impl SyncPipeline for NoopPipeline {
    fn execute(
        &mut self,
        mode: SyncMode,
        _project: &ProjectConfiguration,
        _configuration: &ResolvedConfiguration,
    ) -> std::result::Result<String, PipelineError> {
        Ok(format!("{mode} sync recorded (no pipeline command configured)"))
    }
}

/// Write-only receiver of per-attempt telemetry.
pub trait SyncStatsSink {
    fn report(&self, stats: &SyncStats);
}

/// Emits each record as a structured tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatsSink;

impl SyncStatsSink for TracingStatsSink {
    fn report(&self, stats: &SyncStats) {
        tracing::info!(
            requested = %stats.requested_mode,
            executed = %stats.effective_mode,
            escalation = %stats
                .escalation
                .as_ref()
                .map_or_else(|| "none".to_string(), ToString::to_string),
            result = %stats.result,
            duration_ms = stats.duration_ms,
            workspace_type = %stats.workspace_type,
            languages = stats.language_count,
            "Sync stats"
        );
    }
}

/// Collects records in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingStatsSink {
    records: Arc<Mutex<Vec<SyncStats>>>,
}

impl RecordingStatsSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<SyncStats> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SyncStatsSink for RecordingStatsSink {
    fn report(&self, stats: &SyncStats) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stats.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SyncResult, WorkspaceType};

    fn stats() -> SyncStats {
        SyncStats {
            requested_mode: SyncMode::Incremental,
            effective_mode: SyncMode::Full,
            escalation: None,
            result: SyncResult::Success,
            duration_ms: 12,
            workspace_type: WorkspaceType::Java,
            language_count: 1,
        }
    }

    #[test]
    fn test_recording_sink_shares_buffer_between_clones() {
        let sink = RecordingStatsSink::new();
        let handle = sink.clone();
        sink.report(&stats());
        sink.report(&stats());
        assert_eq!(handle.records().len(), 2);
    }

    #[test]
    fn test_noop_pipeline_succeeds() {
        let mut pipeline = NoopPipeline;
        let config = ResolvedConfiguration::new(WorkspaceType::Java, []);
        let detail = pipeline
            .execute(SyncMode::Full, &ProjectConfiguration::default(), &config)
            .unwrap();
        assert!(detail.starts_with("full sync"));
    }
}

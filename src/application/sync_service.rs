//! Sync orchestration.
//!
//! Drives one sync attempt: resolve the configuration, pick the effective
//! mode against the last successful snapshot, run the pipeline and record
//! the outcome in the history.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

use crate::domain::{
    ModeDecision, PipelineError, ProjectConfiguration, ResolvedConfiguration, SyncAttempt,
    SyncHistoryStore, SyncMode, SyncResult, SyncStateSnapshot, SyncStats,
};

use super::escalation::evaluate_escalation;
use super::pipeline::{SyncPipeline, SyncStatsSink, TracingStatsSink};
use super::registry::CapabilityRegistry;
use super::resolver::{resolve_configuration, ResolutionIssue};

/// Progress of a single sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Requested,
    ConfigurationResolved,
    ModeDecided,
    PipelineRunning,
    Succeeded,
    Failed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Requested => "requested",
            Self::ConfigurationResolved => "configuration_resolved",
            Self::ModeDecided => "mode_decided",
            Self::PipelineRunning => "pipeline_running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a sync would do, without running it.
#[derive(Debug, Clone, Serialize)]
pub struct SyncPlan {
    pub decision: ModeDecision,
    pub configuration: ResolvedConfiguration,
    pub issues: Vec<ResolutionIssue>,
    /// The baseline the decision was made against.
    pub baseline: Option<SyncStateSnapshot>,
}

/// Result of one `run_sync` call.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// History sequence number, or `None` if the attempt could not be recorded.
    pub sequence: Option<u64>,
    pub decision: ModeDecision,
    pub configuration: ResolvedConfiguration,
    pub issues: Vec<ResolutionIssue>,
    pub result: SyncResult,
    /// Pipeline detail: success summary or failure reason.
    pub detail: String,
    /// Why the attempt is missing from the history, if it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
}

impl SyncOutcome {
    /// The mode the pipeline actually ran in.
    #[must_use]
    pub const fn effective_mode(&self) -> SyncMode {
        self.decision.effective
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.result.is_success()
    }

    /// Whether the mode ran stronger than requested.
    #[must_use]
    pub const fn escalated(&self) -> bool {
        self.decision.escalated()
    }

    /// Whether the attempt made it into the history.
    #[must_use]
    pub const fn recorded(&self) -> bool {
        self.sequence.is_some()
    }
}

/// Runs sync attempts for one project session.
///
/// `run_sync` takes `&mut self`, so attempts through one orchestrator are
/// serialized. Callers sharing a history store across processes must add
/// their own single-flight guard.
pub struct SyncOrchestrator<H> {
    registry: CapabilityRegistry,
    history: H,
    pipeline: Box<dyn SyncPipeline>,
    stats: Box<dyn SyncStatsSink>,
}

impl<H: SyncHistoryStore> SyncOrchestrator<H> {
    /// Create an orchestrator that reports stats through tracing.
    pub fn new(
        registry: CapabilityRegistry,
        history: H,
        pipeline: impl SyncPipeline + 'static,
    ) -> Self {
        Self {
            registry,
            history,
            pipeline: Box::new(pipeline),
            stats: Box::new(TracingStatsSink),
        }
    }

    /// Replace the stats sink.
    #[must_use]
    pub fn with_stats_sink(mut self, sink: impl SyncStatsSink + 'static) -> Self {
        self.stats = Box::new(sink);
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn history(&self) -> &H {
        &self.history
    }

    /// Resolve and decide without running anything.
    #[must_use]
    pub fn plan(&self, requested: SyncMode, project: &ProjectConfiguration) -> SyncPlan {
        let resolution = resolve_configuration(project, &self.registry);
        let baseline = self.baseline();
        let decision = evaluate_escalation(requested, &resolution.configuration, baseline.as_ref());

        SyncPlan {
            decision,
            configuration: resolution.configuration,
            issues: resolution.issues,
            baseline,
        }
    }

    /// Run one sync attempt.
    ///
    /// Pipeline failures and cancellations are reported in the outcome and
    /// recorded as failure markers; they never replace the baseline. Stats
    /// are reported for every attempt. If the history rejects the attempt,
    /// the outcome still describes what ran and carries `history_error`.
    pub fn run_sync(&mut self, requested: SyncMode, project: &ProjectConfiguration) -> SyncOutcome {
        let started_at = Utc::now();
        log_phase(SyncPhase::Requested, requested);

        let SyncPlan {
            decision,
            configuration,
            issues,
            baseline,
        } = self.plan(requested, project);
        log_phase(SyncPhase::ConfigurationResolved, requested);
        log_phase(SyncPhase::ModeDecided, decision.effective);

        match &decision.reason {
            Some(reason) => tracing::info!(
                requested = %requested,
                effective = %decision.effective,
                %reason,
                "Escalating sync"
            ),
            None => tracing::info!(
                mode = %decision.effective,
                baseline = baseline.as_ref().map(SyncStateSnapshot::sequence),
                "Starting sync"
            ),
        }

        log_phase(SyncPhase::PipelineRunning, decision.effective);
        let executed = self
            .pipeline
            .execute(decision.effective, project, &configuration);

        let (result, detail) = match executed {
            Ok(detail) => (SyncResult::Success, detail),
            Err(PipelineError::Cancelled) => {
                (SyncResult::Cancelled, PipelineError::Cancelled.to_string())
            }
            Err(PipelineError::Failed(detail)) => (SyncResult::Failure, detail),
        };
        log_phase(
            if result.is_success() {
                SyncPhase::Succeeded
            } else {
                SyncPhase::Failed
            },
            decision.effective,
        );

        let attempt = SyncAttempt {
            sequence: 0,
            started_at,
            finished_at: Utc::now(),
            requested_mode: requested,
            effective_mode: decision.effective,
            result,
            configuration: configuration.clone(),
            detail: (!result.is_success()).then(|| detail.clone()),
        };
        self.stats
            .report(&SyncStats::from_attempt(&attempt, &decision));

        // The pipeline already ran; losing the record must not lose the outcome.
        let (sequence, history_error) = match self.history.append(attempt) {
            Ok(sequence) => (Some(sequence), None),
            Err(e) => {
                tracing::error!(error = %e, %result, "Failed to record sync attempt");
                (None, Some(e.to_string()))
            }
        };

        if result.is_success() {
            tracing::info!(?sequence, mode = %decision.effective, "Sync completed");
        } else {
            tracing::warn!(?sequence, %result, %detail, "Sync did not complete");
        }

        SyncOutcome {
            sequence,
            decision,
            configuration,
            issues,
            result,
            detail,
            history_error,
        }
    }

    /// Most recent successful snapshot, or `None` if it cannot be read.
    ///
    /// An unreadable baseline is treated as absent so an incremental request
    /// fails safe toward a full sync.
    fn baseline(&self) -> Option<SyncStateSnapshot> {
        match self.history.last_successful() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Sync history unreadable; treating as no previous sync");
                None
            }
        }
    }
}

fn log_phase(phase: SyncPhase, mode: SyncMode) {
    tracing::debug!(%phase, %mode, "Sync phase");
}

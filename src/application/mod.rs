//! Application layer - use cases and orchestration.
//!
//! This layer holds the capability registry, configuration resolution, the
//! escalation decision and the sync orchestrator.

pub mod escalation;
pub mod formatter;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod sync_service;

pub use escalation::{decide_effective_mode, evaluate_escalation};
pub use formatter::{
    format_history_markdown, format_history_table, format_json, format_outcome_markdown,
    format_plan_markdown, format_registry_table, format_status, OutputFormat,
};
pub use pipeline::{
    NoopPipeline, RecordingStatsSink, SyncPipeline, SyncStatsSink, TracingStatsSink,
};
pub use registry::CapabilityRegistry;
pub use resolver::{resolve_configuration, Resolution, ResolutionIssue};
pub use sync_service::{SyncOrchestrator, SyncOutcome, SyncPhase, SyncPlan};

//! Domain layer - core types and contracts.
//!
//! This layer contains pure domain models, the capability and history
//! contracts, and error types without any external dependencies (DB, IO, etc.).

pub mod capability;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod project;

pub use capability::CapabilityContributor;
pub use config::{AppConfig, HistoryConfig, PathConfig, PipelineConfig, SyncConfig};
pub use error::{AppError, PipelineError, Result};
pub use history::{InMemoryHistoryStore, SyncHistoryStore};
pub use models::{
    format_languages, EscalationReason, LanguageClass, ModeDecision, ResolvedConfiguration,
    SyncAttempt, SyncMode, SyncResult, SyncStateSnapshot, SyncStats, WorkspaceType,
};
pub use project::{DirectoryEntry, ProjectConfiguration};

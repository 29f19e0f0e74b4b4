//! Build-sync - decide and run incremental or full syncs of a build graph.
//!
//! A caller asks for a sync in some mode; the crate resolves the project's
//! active workspace type and languages against the registered language
//! integrations, compares them with the last successful sync, and escalates
//! an incremental request to a full one when the build graph can no longer
//! be trusted.
//!
//! ```no_run
//! use build_sync::application::{NoopPipeline, SyncOrchestrator};
//! use build_sync::domain::{InMemoryHistoryStore, ProjectConfiguration, SyncMode};
//! use build_sync::infrastructure::builtin_registry;
//!
//! let mut orchestrator =
//!     SyncOrchestrator::new(builtin_registry(), InMemoryHistoryStore::new(), NoopPipeline);
//! let outcome = orchestrator.run_sync(SyncMode::Incremental, &ProjectConfiguration::default());
//! assert_eq!(outcome.effective_mode(), SyncMode::Full);
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

//! Infrastructure layer - external adapters (database, filesystem, processes).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod command_pipeline;
pub mod config;
pub mod history_storage;
pub mod plugins;
pub mod project_view;
pub mod sync_lock;

pub use command_pipeline::CommandPipeline;
pub use config::{config_file_path, ensure_config_exists, load_config};
pub use history_storage::SqliteHistoryStore;
pub use plugins::{builtin_registry, StaticPlugin};
pub use project_view::{load_project_view, parse_project_view};
pub use sync_lock::SyncLock;

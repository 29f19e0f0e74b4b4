//! Capability facts contributed by language integrations.

use std::collections::BTreeSet;

use super::models::{LanguageClass, WorkspaceType};

/// A pluggable language integration's declared support.
///
/// Implementations are registered once per process and queried read-only at
/// resolution time.
pub trait CapabilityContributor: Send + Sync {
    /// Short identifier used in logs and the `languages` listing.
    fn name(&self) -> &str;

    /// Workspace types this integration supports.
    fn supported_workspace_types(&self) -> BTreeSet<WorkspaceType>;

    /// Languages this integration enables in `workspace_type`.
    fn supported_languages_in_workspace(
        &self,
        workspace_type: WorkspaceType,
    ) -> BTreeSet<LanguageClass>;
}

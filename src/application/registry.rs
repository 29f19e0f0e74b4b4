//! Language capability registry.
//!
//! Aggregates the capability facts of every registered language integration.
//! Aggregation is a plain set union, so registration order and duplicate
//! declarations never change a query result.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{CapabilityContributor, LanguageClass, WorkspaceType};

/// Ordered set of registered capability contributors.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    contributors: Vec<Arc<dyn CapabilityContributor>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from already-constructed contributors.
    #[must_use]
    pub fn with_contributors(contributors: Vec<Arc<dyn CapabilityContributor>>) -> Self {
        Self { contributors }
    }

    /// Register a contributor. Contributors are never removed.
    pub fn register(&mut self, contributor: Arc<dyn CapabilityContributor>) {
        tracing::debug!(contributor = contributor.name(), "Registered capability contributor");
        self.contributors.push(contributor);
    }

    /// Registered contributors, in registration order.
    #[must_use]
    pub fn contributors(&self) -> &[Arc<dyn CapabilityContributor>] {
        &self.contributors
    }

    /// Union of every contributor's supported workspace types.
    #[must_use]
    pub fn supported_workspace_types(&self) -> BTreeSet<WorkspaceType> {
        self.contributors
            .iter()
            .flat_map(|c| c.supported_workspace_types())
            .collect()
    }

    /// Whether any contributor supports `workspace_type`.
    #[must_use]
    pub fn supports_workspace_type(&self, workspace_type: WorkspaceType) -> bool {
        self.contributors
            .iter()
            .any(|c| c.supported_workspace_types().contains(&workspace_type))
    }

    /// Union of languages enabled for `workspace_type` by the contributors
    /// that support it.
    ///
    /// An unsupported workspace type yields the empty set.
    #[must_use]
    pub fn supported_languages(&self, workspace_type: WorkspaceType) -> BTreeSet<LanguageClass> {
        self.contributors
            .iter()
            .filter(|c| c.supported_workspace_types().contains(&workspace_type))
            .flat_map(|c| c.supported_languages_in_workspace(workspace_type))
            .collect()
    }

    /// Highest-priority supported workspace type, used when a project view
    /// declares none.
    #[must_use]
    pub fn default_workspace_type(&self) -> Option<WorkspaceType> {
        self.supported_workspace_types()
            .into_iter()
            .max_by_key(|ws| ws.priority())
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.contributors.iter().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        workspaces: Vec<WorkspaceType>,
        languages: Vec<LanguageClass>,
    }

    impl CapabilityContributor for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn supported_workspace_types(&self) -> BTreeSet<WorkspaceType> {
            self.workspaces.iter().copied().collect()
        }

        fn supported_languages_in_workspace(&self, _: WorkspaceType) -> BTreeSet<LanguageClass> {
            self.languages.iter().copied().collect()
        }
    }

    fn android() -> Arc<dyn CapabilityContributor> {
        Arc::new(Fixed {
            name: "android",
            workspaces: vec![WorkspaceType::Android],
            languages: vec![LanguageClass::Android, LanguageClass::Java],
        })
    }

    fn kotlin() -> Arc<dyn CapabilityContributor> {
        Arc::new(Fixed {
            name: "kotlin",
            workspaces: vec![WorkspaceType::Android, WorkspaceType::Java],
            languages: vec![LanguageClass::Kotlin],
        })
    }

    #[test]
    fn test_empty_registry() {
        let registry = CapabilityRegistry::new();
        assert!(registry.supported_workspace_types().is_empty());
        assert!(registry.supported_languages(WorkspaceType::Java).is_empty());
        assert!(registry.default_workspace_type().is_none());
    }

    #[test]
    fn test_languages_union_across_contributors() {
        let registry = CapabilityRegistry::with_contributors(vec![android(), kotlin()]);
        let langs = registry.supported_languages(WorkspaceType::Android);
        assert_eq!(
            langs,
            [LanguageClass::Android, LanguageClass::Java, LanguageClass::Kotlin]
                .into_iter()
                .collect()
        );
        // Only kotlin declares java workspaces.
        assert_eq!(
            registry.supported_languages(WorkspaceType::Java),
            [LanguageClass::Kotlin].into_iter().collect()
        );
    }

    #[test]
    fn test_registration_order_and_duplicates_do_not_matter() {
        let forward = CapabilityRegistry::with_contributors(vec![android(), kotlin()]);
        let reverse = CapabilityRegistry::with_contributors(vec![kotlin(), android(), android()]);

        assert_eq!(
            forward.supported_workspace_types(),
            reverse.supported_workspace_types()
        );
        for ws in WorkspaceType::ALL {
            assert_eq!(forward.supported_languages(ws), reverse.supported_languages(ws));
        }
        assert_eq!(forward.default_workspace_type(), reverse.default_workspace_type());
    }

    #[test]
    fn test_unsupported_workspace_type_is_empty_not_error() {
        let registry = CapabilityRegistry::with_contributors(vec![android()]);
        assert!(!registry.supports_workspace_type(WorkspaceType::Python));
        assert!(registry.supported_languages(WorkspaceType::Python).is_empty());
    }

    #[test]
    fn test_default_workspace_type_uses_priority() {
        let registry = CapabilityRegistry::with_contributors(vec![kotlin()]);
        assert_eq!(registry.default_workspace_type(), Some(WorkspaceType::Android));
    }
}

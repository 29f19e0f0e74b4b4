//! Built-in language integrations.
//!
//! Each integration declares which workspace types it supports and which
//! languages it enables there. The CLI registers all of them at startup.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::CapabilityRegistry;
use crate::domain::{CapabilityContributor, LanguageClass, WorkspaceType};

/// An integration whose capabilities are fixed at compile time.
#[derive(Debug)]
pub struct StaticPlugin {
    name: &'static str,
    workspace_types: &'static [WorkspaceType],
    languages: &'static [LanguageClass],
}

impl StaticPlugin {
    #[must_use]
    pub const fn new(
        name: &'static str,
        workspace_types: &'static [WorkspaceType],
        languages: &'static [LanguageClass],
    ) -> Self {
        Self {
            name,
            workspace_types,
            languages,
        }
    }
}

impl CapabilityContributor for StaticPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_workspace_types(&self) -> BTreeSet<WorkspaceType> {
        self.workspace_types.iter().copied().collect()
    }

    fn supported_languages_in_workspace(
        &self,
        workspace_type: WorkspaceType,
    ) -> BTreeSet<LanguageClass> {
        if self.workspace_types.contains(&workspace_type) {
            self.languages.iter().copied().collect()
        } else {
            BTreeSet::new()
        }
    }
}

pub const JAVA: StaticPlugin =
    StaticPlugin::new("java", &[WorkspaceType::Java], &[LanguageClass::Java]);

pub const ANDROID: StaticPlugin = StaticPlugin::new(
    "android",
    &[WorkspaceType::Android],
    &[LanguageClass::Android, LanguageClass::Java],
);

pub const KOTLIN: StaticPlugin = StaticPlugin::new(
    "kotlin",
    &[
        WorkspaceType::Java,
        WorkspaceType::Android,
        WorkspaceType::IntellijPlugin,
    ],
    &[LanguageClass::Kotlin],
);

pub const SCALA: StaticPlugin =
    StaticPlugin::new("scala", &[WorkspaceType::Java], &[LanguageClass::Scala]);

pub const INTELLIJ_PLUGIN: StaticPlugin = StaticPlugin::new(
    "intellij-plugin",
    &[WorkspaceType::IntellijPlugin],
    &[LanguageClass::Java],
);

pub const CPP: StaticPlugin = StaticPlugin::new("cpp", &[WorkspaceType::C], &[LanguageClass::C]);

pub const PYTHON: StaticPlugin =
    StaticPlugin::new("python", &[WorkspaceType::Python], &[LanguageClass::Python]);

pub const GO: StaticPlugin = StaticPlugin::new("go", &[WorkspaceType::Go], &[LanguageClass::Go]);

pub const JAVASCRIPT: StaticPlugin = StaticPlugin::new(
    "javascript",
    &[WorkspaceType::Javascript],
    &[LanguageClass::Javascript, LanguageClass::Typescript],
);

pub const DART: StaticPlugin =
    StaticPlugin::new("dart", &[WorkspaceType::Dart], &[LanguageClass::Dart]);

/// Registry holding every built-in integration.
#[must_use]
pub fn builtin_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    for plugin in [
        JAVA,
        ANDROID,
        KOTLIN,
        SCALA,
        INTELLIJ_PLUGIN,
        CPP,
        PYTHON,
        GO,
        JAVASCRIPT,
        DART,
    ] {
        registry.register(Arc::new(plugin));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_workspace_type_is_supported() {
        let registry = builtin_registry();
        for ws in WorkspaceType::ALL {
            assert!(registry.supports_workspace_type(ws), "{ws} unsupported");
        }
    }

    #[test]
    fn test_base_languages_are_always_supported() {
        let registry = builtin_registry();
        for ws in WorkspaceType::ALL {
            assert!(
                ws.base_languages().is_subset(&registry.supported_languages(ws)),
                "{ws} cannot enable its own languages"
            );
        }
    }

    #[test]
    fn test_android_workspace_languages() {
        let langs = builtin_registry().supported_languages(WorkspaceType::Android);
        assert_eq!(
            langs,
            [LanguageClass::Java, LanguageClass::Android, LanguageClass::Kotlin]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn test_plugin_only_answers_for_its_workspaces() {
        assert!(SCALA
            .supported_languages_in_workspace(WorkspaceType::Android)
            .is_empty());
    }

    #[test]
    fn test_default_workspace_type_is_highest_priority() {
        assert_eq!(
            builtin_registry().default_workspace_type(),
            Some(WorkspaceType::IntellijPlugin)
        );
    }
}

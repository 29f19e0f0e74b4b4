//! Project configuration as declared by the user's project view.
//!
//! This is the opaque "current state" input to configuration resolution.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::models::{LanguageClass, WorkspaceType};

/// A directory line from a project view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Workspace-relative path.
    pub path: String,
    /// `false` for `-path` exclusions.
    pub included: bool,
}

impl DirectoryEntry {
    #[must_use]
    pub fn include(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            included: true,
        }
    }

    #[must_use]
    pub fn exclude(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            included: false,
        }
    }
}

/// What the project view currently declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    /// Source directories to import.
    #[serde(default)]
    pub directories: Vec<DirectoryEntry>,
    /// Explicit build targets.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Declared workspace type, if any.
    #[serde(default)]
    pub workspace_type: Option<WorkspaceType>,
    /// Languages requested on top of the workspace type's own.
    #[serde(default)]
    pub additional_languages: BTreeSet<LanguageClass>,
}

impl ProjectConfiguration {
    /// Set the declared workspace type.
    #[must_use]
    pub const fn with_workspace_type(mut self, workspace_type: WorkspaceType) -> Self {
        self.workspace_type = Some(workspace_type);
        self
    }

    /// Add declared additional languages.
    #[must_use]
    pub fn with_additional_languages(
        mut self,
        languages: impl IntoIterator<Item = LanguageClass>,
    ) -> Self {
        self.additional_languages.extend(languages);
        self
    }

    /// Add an included directory.
    #[must_use]
    pub fn with_directory(mut self, path: impl Into<String>) -> Self {
        self.directories.push(DirectoryEntry::include(path));
        self
    }

    /// Included directories, in declaration order.
    pub fn included_directories(&self) -> impl Iterator<Item = &str> {
        self.directories
            .iter()
            .filter(|d| d.included)
            .map(|d| d.path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_languages() {
        let project = ProjectConfiguration::default()
            .with_workspace_type(WorkspaceType::Android)
            .with_additional_languages([LanguageClass::Kotlin])
            .with_additional_languages([LanguageClass::Kotlin, LanguageClass::Scala]);

        assert_eq!(project.workspace_type, Some(WorkspaceType::Android));
        assert_eq!(project.additional_languages.len(), 2);
    }

    #[test]
    fn test_included_directories_skip_exclusions() {
        let mut project = ProjectConfiguration::default().with_directory("src/main/java");
        project
            .directories
            .push(DirectoryEntry::exclude("src/main/java/gen"));

        let dirs: Vec<_> = project.included_directories().collect();
        assert_eq!(dirs, vec!["src/main/java"]);
    }
}

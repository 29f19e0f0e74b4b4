//! Configuration resolution.
//!
//! Turns what the project view declares into the workspace type and active
//! language set a sync will run with, bounded by what the registered
//! language integrations support.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::domain::{LanguageClass, ProjectConfiguration, ResolvedConfiguration, WorkspaceType};

use super::registry::CapabilityRegistry;

/// Used when neither the project view nor any integration names a type.
const FALLBACK_WORKSPACE_TYPE: WorkspaceType = WorkspaceType::Java;

/// A non-fatal problem found while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionIssue {
    /// No integration supports the declared workspace type.
    UnsupportedWorkspaceType { workspace_type: WorkspaceType },
    /// A language was requested that the workspace type cannot enable.
    UnsupportedLanguage {
        language: LanguageClass,
        workspace_type: WorkspaceType,
    },
}

impl fmt::Display for ResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedWorkspaceType { workspace_type } => write!(
                f,
                "workspace type '{workspace_type}' is not supported by any language integration"
            ),
            Self::UnsupportedLanguage {
                language,
                workspace_type,
            } => write!(
                f,
                "language '{language}' is not supported in '{workspace_type}' workspaces"
            ),
        }
    }
}

/// Resolved configuration plus the issues found on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub configuration: ResolvedConfiguration,
    pub issues: Vec<ResolutionIssue>,
}

/// Resolve the configuration for one sync attempt.
///
/// Never fails: unsupported declarations are dropped and reported as
/// issues, which can leave the active language set empty.
#[must_use]
pub fn resolve_configuration(
    project: &ProjectConfiguration,
    registry: &CapabilityRegistry,
) -> Resolution {
    let workspace_type = project
        .workspace_type
        .or_else(|| registry.default_workspace_type())
        .unwrap_or(FALLBACK_WORKSPACE_TYPE);

    let mut issues = Vec::new();
    if !registry.supports_workspace_type(workspace_type) {
        issues.push(ResolutionIssue::UnsupportedWorkspaceType { workspace_type });
    }

    let supported = registry.supported_languages(workspace_type);
    let mut candidates: BTreeSet<LanguageClass> = workspace_type.base_languages();
    candidates.extend(project.additional_languages.iter().copied());

    let (active, dropped): (BTreeSet<_>, BTreeSet<_>) =
        candidates.into_iter().partition(|l| supported.contains(l));

    // Unsupported base languages are implied by the workspace type issue.
    if issues.is_empty() {
        issues.extend(
            dropped
                .into_iter()
                .map(|language| ResolutionIssue::UnsupportedLanguage {
                    language,
                    workspace_type,
                }),
        );
    }

    for issue in &issues {
        tracing::warn!(%issue, "Configuration resolution issue");
    }

    let configuration = ResolvedConfiguration::new(workspace_type, active);
    tracing::debug!(
        workspace_type = %configuration.workspace_type,
        languages = configuration.active_languages.len(),
        "Resolved configuration"
    );

    Resolution {
        configuration,
        issues,
    }
}

//! Project view file parsing.
//!
//! A project view is a small, human-edited file of sections:
//!
//! ```text
//! directories:
//!   src/main/java/com/google
//!   -src/main/java/com/google/generated
//! workspace_type: android
//! additional_languages:
//!   kotlin
//! ```

use std::fs;
use std::path::Path;

use crate::domain::{
    AppError, DirectoryEntry, LanguageClass, ProjectConfiguration, Result, WorkspaceType,
};

/// Section currently receiving indented items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Directories,
    Targets,
    AdditionalLanguages,
    Ignored,
}

/// Read and parse a project view file.
///
/// # Errors
/// Returns error if the file cannot be read or does not parse.
pub fn load_project_view(path: &Path) -> Result<ProjectConfiguration> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::io(format!("Failed to read project view: {}", path.display()), e)
    })?;
    let project = parse_project_view(&content)?;

    tracing::debug!(
        path = %path.display(),
        directories = project.directories.len(),
        workspace_type = ?project.workspace_type,
        additional_languages = project.additional_languages.len(),
        "Loaded project view"
    );

    Ok(project)
}

/// Parse project view text.
///
/// # Errors
/// Returns `InvalidData` naming the line for unknown workspace types or
/// languages and for items outside any section.
pub fn parse_project_view(content: &str) -> Result<ProjectConfiguration> {
    let mut project = ProjectConfiguration::default();
    let mut section: Option<Section> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indented = raw.starts_with(' ') || raw.starts_with('\t');
        if indented {
            let current = section.ok_or_else(|| {
                AppError::invalid(format!("line {line_no}: item '{trimmed}' outside any section"))
            })?;
            add_item(&mut project, current, trimmed, line_no)?;
            continue;
        }

        let (key, value) = trimmed.split_once(':').ok_or_else(|| {
            AppError::invalid(format!("line {line_no}: expected 'key:' but found '{trimmed}'"))
        })?;
        let (key, value) = (key.trim(), value.trim());

        section = match key {
            "workspace_type" => {
                let workspace_type = value.parse::<WorkspaceType>().map_err(|e| {
                    AppError::invalid(format!("line {line_no}: {e}"))
                })?;
                project.workspace_type = Some(workspace_type);
                None
            }
            "directories" => Some(Section::Directories),
            "targets" => Some(Section::Targets),
            "additional_languages" => Some(Section::AdditionalLanguages),
            other => {
                tracing::debug!(key = other, line = line_no, "Ignoring project view section");
                Some(Section::Ignored)
            }
        };

        // `key: value` on one line is a single-item list.
        if let Some(current) = section {
            if !value.is_empty() {
                add_item(&mut project, current, value, line_no)?;
            }
        }
    }

    Ok(project)
}

fn add_item(
    project: &mut ProjectConfiguration,
    section: Section,
    item: &str,
    line_no: usize,
) -> Result<()> {
    match section {
        Section::Directories => {
            let entry = item
                .strip_prefix('-')
                .map_or_else(|| DirectoryEntry::include(item), DirectoryEntry::exclude);
            project.directories.push(entry);
        }
        Section::Targets => project.targets.push(item.to_string()),
        Section::AdditionalLanguages => {
            let language = item
                .parse::<LanguageClass>()
                .map_err(|e| AppError::invalid(format!("line {line_no}: {e}")))?;
            project.additional_languages.insert(language);
        }
        Section::Ignored => {}
    }
    Ok(())
}

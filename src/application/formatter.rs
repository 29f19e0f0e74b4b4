//! Output formatting for sync outcomes, plans and history.
//!
//! Supports multiple output formats: Markdown, JSON, and table view.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::domain::{
    format_languages, ModeDecision, ResolvedConfiguration, SyncAttempt, SyncStateSnapshot,
    WorkspaceType,
};

use super::registry::CapabilityRegistry;
use super::resolver::ResolutionIssue;
use super::sync_service::{SyncOutcome, SyncPlan};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// JSON format for programmatic use.
    Json,
    /// Compact table listing.
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: markdown, json, table")),
        }
    }
}

/// Serializes any report as pretty JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Formats the result of a sync run.
pub fn format_outcome_markdown(outcome: &SyncOutcome) -> String {
    let mut out = String::new();

    let status = if outcome.succeeded() {
        "✓ Sync succeeded".green().bold()
    } else {
        format!("✗ Sync {}", outcome.result).red().bold()
    };
    match outcome.sequence {
        Some(sequence) => out.push_str(&format!("# {status} (#{sequence})\n\n")),
        None => out.push_str(&format!("# {status}\n\n")),
    }
    push_decision(&mut out, &outcome.decision);
    push_configuration(&mut out, &outcome.configuration);
    push_issues(&mut out, &outcome.issues);

    if !outcome.detail.is_empty() {
        out.push_str(&format!("\n**Detail:** {}\n", outcome.detail));
    }
    if let Some(error) = &outcome.history_error {
        out.push_str(&format!(
            "\n{} {error}\n",
            "Not recorded in history:".yellow().bold()
        ));
    }

    out
}

/// Formats a dry-run plan.
pub fn format_plan_markdown(plan: &SyncPlan) -> String {
    let mut out = String::from("# Sync plan\n\n");
    push_decision(&mut out, &plan.decision);
    push_configuration(&mut out, &plan.configuration);
    push_issues(&mut out, &plan.issues);

    match &plan.baseline {
        Some(baseline) => {
            out.push_str(&format!(
                "\n**Baseline:** #{} ({} sync at {})\n",
                baseline.sequence(),
                baseline.sync_mode(),
                baseline.recorded_at().format("%Y-%m-%d %H:%M:%S UTC")
            ));
            out.push_str(&format!(
                "  Workspace type: {}\n  Languages: {}\n",
                baseline.configuration().workspace_type,
                format_languages(&baseline.configuration().active_languages)
            ));
        }
        None => out.push_str("\n**Baseline:** none\n"),
    }

    out
}

/// Formats the most recent successful snapshot.
pub fn format_status(snapshot: Option<&SyncStateSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return format!("{}", "No successful sync recorded yet.".yellow());
    };

    format!(
        "{}\n  Sequence: {}\n  Mode: {}\n  Finished: {}\n  Workspace type: {}\n  Languages: {}",
        "📦 Last successful sync".bold(),
        snapshot.sequence().to_string().cyan(),
        snapshot.sync_mode().to_string().cyan(),
        snapshot.recorded_at().format("%Y-%m-%d %H:%M:%S UTC"),
        snapshot.configuration().workspace_type.to_string().green(),
        format_languages(&snapshot.configuration().active_languages).green()
    )
}

/// Formats recent attempts as Markdown.
pub fn format_history_markdown(attempts: &[SyncAttempt]) -> String {
    if attempts.is_empty() {
        return "No sync attempts recorded.\n".to_string();
    }

    let mut out = String::from("# Sync history\n\n");
    for attempt in attempts {
        out.push_str(&format!(
            "## #{} {} ({})\n\n",
            attempt.sequence,
            attempt.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            attempt.result
        ));
        out.push_str(&format!(
            "**Mode:** {} (requested {})\n",
            attempt.effective_mode, attempt.requested_mode
        ));
        push_configuration(&mut out, &attempt.configuration);
        if let Some(detail) = &attempt.detail {
            out.push_str(&format!("**Detail:** {detail}\n"));
        }
        out.push('\n');
    }
    out
}

/// Formats recent attempts as a table.
pub fn format_history_table(attempts: &[SyncAttempt]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "#",
        "Started",
        "Requested",
        "Ran",
        "Result",
        "Workspace",
        "Languages",
        "Detail",
    ]);

    for attempt in attempts {
        let ran = if attempt.was_escalated() {
            format!("{} ↑", attempt.effective_mode)
        } else {
            attempt.effective_mode.to_string()
        };

        table.add_row(vec![
            attempt.sequence.to_string(),
            attempt.started_at.format("%Y-%m-%d %H:%M").to_string(),
            attempt.requested_mode.to_string(),
            ran,
            attempt.result.to_string(),
            attempt.configuration.workspace_type.to_string(),
            truncate(&format_languages(&attempt.configuration.active_languages), 30),
            attempt
                .detail
                .as_deref()
                .map_or_else(|| "-".to_string(), |d| truncate(d, 35)),
        ]);
    }

    table.to_string()
}

/// Formats what the registry supports, one row per workspace type.
pub fn format_registry_table(registry: &CapabilityRegistry) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Workspace type", "Priority", "Languages"]);

    let mut workspaces: Vec<WorkspaceType> =
        registry.supported_workspace_types().into_iter().collect();
    workspaces.sort_by_key(|ws| std::cmp::Reverse(ws.priority()));

    for ws in workspaces {
        table.add_row(vec![
            ws.to_string(),
            ws.priority().to_string(),
            format_languages(&registry.supported_languages(ws)),
        ]);
    }

    let names: Vec<&str> = registry.contributors().iter().map(|c| c.name()).collect();
    format!("{table}\nIntegrations: {}", names.join(", "))
}

fn push_decision(out: &mut String, decision: &ModeDecision) {
    out.push_str(&format!("**Requested:** {}\n", decision.requested));
    match &decision.reason {
        Some(reason) => out.push_str(&format!(
            "**Runs as:** {} (escalated: {reason})\n",
            decision.effective
        )),
        None => out.push_str(&format!("**Runs as:** {}\n", decision.effective)),
    }
}

fn push_configuration(out: &mut String, configuration: &ResolvedConfiguration) {
    out.push_str(&format!(
        "**Workspace type:** {}\n**Languages:** {}\n",
        configuration.workspace_type,
        format_languages(&configuration.active_languages)
    ));
}

fn push_issues(out: &mut String, issues: &[ResolutionIssue]) {
    if issues.is_empty() {
        return;
    }
    out.push_str("\n**Warnings:**\n");
    for issue in issues {
        out.push_str(&format!("- {issue}\n"));
    }
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{EscalationReason, LanguageClass, SyncMode, SyncResult};

    fn attempt(result: SyncResult, detail: Option<&str>) -> SyncAttempt {
        let now = Utc::now();
        SyncAttempt {
            sequence: 4,
            started_at: now,
            finished_at: now,
            requested_mode: SyncMode::Incremental,
            effective_mode: SyncMode::Full,
            result,
            configuration: ResolvedConfiguration::new(
                WorkspaceType::Android,
                [LanguageClass::Java, LanguageClass::Kotlin],
            ),
            detail: detail.map(String::from),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
        assert_eq!(truncate("first\nsecond", 20), "first");
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!(
            "markdown".parse::<OutputFormat>(),
            Ok(OutputFormat::Markdown)
        ));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!(matches!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table)));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_history_table_marks_escalation() {
        let table = format_history_table(&[attempt(SyncResult::Success, None)]);
        assert!(table.contains("full ↑"));
        assert!(table.contains("java, kotlin"));
    }

    #[test]
    fn test_history_markdown_includes_failure_detail() {
        let md = format_history_markdown(&[attempt(SyncResult::Failure, Some("exit 2"))]);
        assert!(md.contains("**Detail:** exit 2"));
        assert!(md.contains("requested incremental"));
    }

    #[test]
    fn test_history_json_is_serializable() {
        let json = format_json(&[attempt(SyncResult::Success, None)]).unwrap();
        assert!(json.contains("\"effective_mode\": \"full\""));
        assert!(!json.contains("\"detail\""));
    }

    #[test]
    fn test_plan_mentions_escalation_reason() {
        let plan = SyncPlan {
            decision: ModeDecision::escalate(SyncMode::Incremental, EscalationReason::NoPreviousSync),
            configuration: ResolvedConfiguration::new(WorkspaceType::Java, [LanguageClass::Java]),
            issues: Vec::new(),
            baseline: None,
        };
        let md = format_plan_markdown(&plan);
        assert!(md.contains("escalated: no previous successful sync"));
        assert!(md.contains("**Baseline:** none"));
    }
}

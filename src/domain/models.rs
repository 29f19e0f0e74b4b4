//! Domain models for build-graph sync.
//!
//! These models describe what a sync resolved, which mode it ran in and how
//! it ended. They carry no I/O.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall project flavor; constrains which languages may be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceType {
    C,
    Java,
    Python,
    Javascript,
    Go,
    Dart,
    Android,
    IntellijPlugin,
}

impl WorkspaceType {
    /// Every workspace type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::C,
        Self::Java,
        Self::Python,
        Self::Javascript,
        Self::Go,
        Self::Dart,
        Self::Android,
        Self::IntellijPlugin,
    ];

    /// Name used in project views and persisted history.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Java => "java",
            Self::Python => "python",
            Self::Javascript => "javascript",
            Self::Go => "go",
            Self::Dart => "dart",
            Self::Android => "android",
            Self::IntellijPlugin => "intellij_plugin",
        }
    }

    /// Preference when a project view declares no workspace type.
    /// Higher wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::IntellijPlugin => 7,
            Self::Android => 6,
            Self::C => 5,
            Self::Java => 4,
            Self::Go => 3,
            Self::Python => 2,
            Self::Dart => 1,
            Self::Javascript => 0,
        }
    }

    /// Languages this workspace type always activates.
    #[must_use]
    pub fn base_languages(self) -> BTreeSet<LanguageClass> {
        let langs: &[LanguageClass] = match self {
            Self::C => &[LanguageClass::C],
            Self::Java | Self::IntellijPlugin => &[LanguageClass::Java],
            Self::Python => &[LanguageClass::Python],
            Self::Javascript => &[LanguageClass::Javascript],
            Self::Go => &[LanguageClass::Go],
            Self::Dart => &[LanguageClass::Dart],
            Self::Android => &[LanguageClass::Android, LanguageClass::Java],
        };
        langs.iter().copied().collect()
    }
}

impl fmt::Display for WorkspaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkspaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|ws| ws.name() == wanted)
            .ok_or_else(|| format!("Unknown workspace type: {s}"))
    }
}

/// One language ecosystem participating in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageClass {
    Generic,
    C,
    Java,
    Android,
    Javascript,
    Typescript,
    Dart,
    Go,
    Python,
    Scala,
    Kotlin,
}

impl LanguageClass {
    /// Every language class, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Generic,
        Self::C,
        Self::Java,
        Self::Android,
        Self::Javascript,
        Self::Typescript,
        Self::Dart,
        Self::Go,
        Self::Python,
        Self::Scala,
        Self::Kotlin,
    ];

    /// Name used in project views and persisted history.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::C => "c",
            Self::Java => "java",
            Self::Android => "android",
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Dart => "dart",
            Self::Go => "go",
            Self::Python => "python",
            Self::Scala => "scala",
            Self::Kotlin => "kotlin",
        }
    }
}

impl fmt::Display for LanguageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LanguageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == wanted)
            .ok_or_else(|| format!("Unknown language: {s}"))
    }
}

/// Joins a language set for display, e.g. `android, java, kotlin`.
#[must_use]
pub fn format_languages(languages: &BTreeSet<LanguageClass>) -> String {
    if languages.is_empty() {
        return "(none)".to_string();
    }
    languages
        .iter()
        .map(|l| l.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How much derived build state a sync recomputes.
///
/// Ordered by strength: `NoBuild < Incremental < Full`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Bookkeeping only; derived build state is untouched.
    NoBuild,
    /// Reuse prior derived state and update what changed.
    #[default]
    Incremental,
    /// Recompute all derived state from scratch.
    Full,
}

impl SyncMode {
    /// Name used on the command line and in persisted history.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoBuild => "no_build",
            Self::Incremental => "incremental",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "incremental" => Ok(Self::Incremental),
            "no_build" | "no-build" | "nobuild" => Ok(Self::NoBuild),
            _ => Err(format!(
                "Unknown sync mode: {s}. Use: full, incremental, no-build"
            )),
        }
    }
}

/// Workspace type and active languages resolved for one sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    /// The single workspace type in effect.
    pub workspace_type: WorkspaceType,
    /// Languages active for this sync.
    pub active_languages: BTreeSet<LanguageClass>,
}

impl ResolvedConfiguration {
    /// Create a resolved configuration.
    #[must_use]
    pub fn new(
        workspace_type: WorkspaceType,
        active_languages: impl IntoIterator<Item = LanguageClass>,
    ) -> Self {
        Self {
            workspace_type,
            active_languages: active_languages.into_iter().collect(),
        }
    }

    /// Whether `language` is active.
    #[must_use]
    pub fn is_active(&self, language: LanguageClass) -> bool {
        self.active_languages.contains(&language)
    }

    /// Languages active here but not in `baseline`.
    #[must_use]
    pub fn languages_added_since(&self, baseline: &Self) -> BTreeSet<LanguageClass> {
        self.active_languages
            .difference(&baseline.active_languages)
            .copied()
            .collect()
    }
}

/// Terminal state of a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResult {
    Success,
    Failure,
    Cancelled,
}

impl SyncResult {
    /// Only successful attempts become an escalation baseline.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyncResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown sync result: {s}")),
        }
    }
}

/// Immutable record of a successful sync, used as the escalation baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStateSnapshot {
    sequence: u64,
    sync_mode: SyncMode,
    configuration: ResolvedConfiguration,
    recorded_at: DateTime<Utc>,
}

impl SyncStateSnapshot {
    /// Create a snapshot of a successful sync.
    #[must_use]
    pub const fn new(
        sequence: u64,
        sync_mode: SyncMode,
        configuration: ResolvedConfiguration,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence,
            sync_mode,
            configuration,
            recorded_at,
        }
    }

    /// Position of the originating attempt in the history.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The mode that actually ran.
    #[must_use]
    pub const fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    #[must_use]
    pub const fn configuration(&self) -> &ResolvedConfiguration {
        &self.configuration
    }

    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// One entry in the sync history: a success or a failure marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAttempt {
    /// Assigned by the history store on append; 0 until then.
    pub sequence: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub requested_mode: SyncMode,
    pub effective_mode: SyncMode,
    pub result: SyncResult,
    /// Configuration the attempt resolved before running.
    pub configuration: ResolvedConfiguration,
    /// Failure detail reported by the pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SyncAttempt {
    /// The baseline snapshot, if this attempt succeeded.
    #[must_use]
    pub fn snapshot(&self) -> Option<SyncStateSnapshot> {
        self.result.is_success().then(|| {
            SyncStateSnapshot::new(
                self.sequence,
                self.effective_mode,
                self.configuration.clone(),
                self.finished_at,
            )
        })
    }

    /// Whether the effective mode is stronger than what was requested.
    #[must_use]
    pub fn was_escalated(&self) -> bool {
        self.effective_mode > self.requested_mode
    }

    /// Wall-clock duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Why an incremental request was upgraded to a full sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscalationReason {
    /// No successful sync on record to diff against.
    NoPreviousSync,
    /// The workspace type differs from the baseline.
    WorkspaceTypeChanged {
        from: WorkspaceType,
        to: WorkspaceType,
    },
    /// Languages became active that the baseline did not have.
    LanguagesAdded { languages: BTreeSet<LanguageClass> },
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPreviousSync => write!(f, "no previous successful sync"),
            Self::WorkspaceTypeChanged { from, to } => {
                write!(f, "workspace type changed from {from} to {to}")
            }
            Self::LanguagesAdded { languages } => {
                write!(f, "languages added: {}", format_languages(languages))
            }
        }
    }
}

/// Outcome of the escalation decision for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeDecision {
    pub requested: SyncMode,
    pub effective: SyncMode,
    /// Set only when `effective` is stronger than `requested`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<EscalationReason>,
}

impl ModeDecision {
    /// Keep the requested mode.
    #[must_use]
    pub const fn keep(requested: SyncMode) -> Self {
        Self {
            requested,
            effective: requested,
            reason: None,
        }
    }

    /// Upgrade to a full sync.
    #[must_use]
    pub const fn escalate(requested: SyncMode, reason: EscalationReason) -> Self {
        Self {
            requested,
            effective: SyncMode::Full,
            reason: Some(reason),
        }
    }

    #[must_use]
    pub const fn escalated(&self) -> bool {
        self.reason.is_some()
    }
}

/// Telemetry emitted once per sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub requested_mode: SyncMode,
    pub effective_mode: SyncMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationReason>,
    pub result: SyncResult,
    pub duration_ms: i64,
    pub workspace_type: WorkspaceType,
    pub language_count: usize,
}

impl SyncStats {
    /// Build the telemetry record for a finished attempt.
    #[must_use]
    pub fn from_attempt(attempt: &SyncAttempt, decision: &ModeDecision) -> Self {
        Self {
            requested_mode: attempt.requested_mode,
            effective_mode: attempt.effective_mode,
            escalation: decision.reason.clone(),
            result: attempt.result,
            duration_ms: attempt.duration_ms(),
            workspace_type: attempt.configuration.workspace_type,
            language_count: attempt.configuration.active_languages.len(),
        }
    }
}

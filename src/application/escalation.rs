//! Full-sync escalation.
//!
//! Decides whether an incremental request can run as asked or must be
//! upgraded to a full sync because the incremental machinery cannot
//! represent the change since the last successful sync.
//!
//! Errors here are one-sided: a missed escalation leaves the project model
//! silently wrong, an unneeded one only costs time. Whenever the baseline is
//! missing or differs in a way incremental sync cannot retrofit, the answer
//! is `Full`.

use crate::domain::{
    EscalationReason, ModeDecision, ResolvedConfiguration, SyncMode, SyncStateSnapshot,
};

/// Effective mode for `requested`, given the current configuration and the
/// most recent successful snapshot.
#[must_use]
pub fn decide_effective_mode(
    requested: SyncMode,
    current: &ResolvedConfiguration,
    previous: Option<&SyncStateSnapshot>,
) -> SyncMode {
    evaluate_escalation(requested, current, previous).effective
}

/// Like [`decide_effective_mode`], also reporting why it escalated.
#[must_use]
pub fn evaluate_escalation(
    requested: SyncMode,
    current: &ResolvedConfiguration,
    previous: Option<&SyncStateSnapshot>,
) -> ModeDecision {
    match requested {
        // Full is already maximal. NoBuild touches no derived state, so a
        // stale language set cannot corrupt it.
        SyncMode::Full | SyncMode::NoBuild => ModeDecision::keep(requested),
        SyncMode::Incremental => match incremental_blocker(current, previous) {
            Some(reason) => ModeDecision::escalate(requested, reason),
            None => ModeDecision::keep(requested),
        },
    }
}

/// What prevents an incremental sync from building on `previous`, if anything.
fn incremental_blocker(
    current: &ResolvedConfiguration,
    previous: Option<&SyncStateSnapshot>,
) -> Option<EscalationReason> {
    let Some(previous) = previous else {
        return Some(EscalationReason::NoPreviousSync);
    };
    let baseline = previous.configuration();

    if baseline.workspace_type != current.workspace_type {
        return Some(EscalationReason::WorkspaceTypeChanged {
            from: baseline.workspace_type,
            to: current.workspace_type,
        });
    }

    // Removed languages leave stale but harmless derived state; only
    // additions need state that does not exist yet.
    let added = current.languages_added_since(baseline);
    if !added.is_empty() {
        return Some(EscalationReason::LanguagesAdded { languages: added });
    }

    None
}

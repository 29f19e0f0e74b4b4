//! Sync history: the append-only record of sync attempts.

use super::error::Result;
use super::models::{ResolvedConfiguration, SyncAttempt, SyncStateSnapshot};

/// Append-only, ordered record of sync attempts.
///
/// The baseline for escalation is the most recent entry whose result is a
/// success. Entries are never removed.
pub trait SyncHistoryStore {
    /// Append an attempt and return its assigned sequence number.
    ///
    /// A successful attempt becomes visible as the latest snapshot only once
    /// this returns.
    ///
    /// # Errors
    /// Returns error if the attempt cannot be stored.
    fn append(&mut self, attempt: SyncAttempt) -> Result<u64>;

    /// The most recent `limit` attempts, newest first.
    ///
    /// # Errors
    /// Returns error if the history cannot be read.
    fn recent(&self, limit: usize) -> Result<Vec<SyncAttempt>>;

    /// The most recent successful attempt's snapshot.
    ///
    /// # Errors
    /// Returns `HistoryCorruption` if the stored baseline cannot be
    /// interpreted, or another error if the history cannot be read.
    fn last_successful(&self) -> Result<Option<SyncStateSnapshot>>;

    /// Configuration recorded by the most recent successful attempt.
    ///
    /// # Errors
    /// Same as [`SyncHistoryStore::last_successful`].
    fn last_successful_configuration(&self) -> Result<Option<ResolvedConfiguration>> {
        Ok(self
            .last_successful()?
            .map(|snapshot| snapshot.configuration().clone()))
    }
}

/// Session-scoped history kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    attempts: Vec<SyncAttempt>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

impl SyncHistoryStore for InMemoryHistoryStore {
    fn append(&mut self, mut attempt: SyncAttempt) -> Result<u64> {
        let sequence = self.attempts.last().map_or(1, |last| last.sequence + 1);
        attempt.sequence = sequence;
        self.attempts.push(attempt);
        Ok(sequence)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SyncAttempt>> {
        Ok(self.attempts.iter().rev().take(limit).cloned().collect())
    }

    fn last_successful(&self) -> Result<Option<SyncStateSnapshot>> {
        Ok(self.attempts.iter().rev().find_map(SyncAttempt::snapshot))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::models::{LanguageClass, SyncMode, SyncResult, WorkspaceType};

    fn attempt(result: SyncResult, languages: &[LanguageClass]) -> SyncAttempt {
        let now = Utc::now();
        SyncAttempt {
            sequence: 0,
            started_at: now,
            finished_at: now,
            requested_mode: SyncMode::Full,
            effective_mode: SyncMode::Full,
            result,
            configuration: ResolvedConfiguration::new(
                WorkspaceType::Android,
                languages.iter().copied(),
            ),
            detail: None,
        }
    }

    #[test]
    fn test_empty_store_has_no_baseline() {
        let store = InMemoryHistoryStore::new();
        assert!(store.last_successful().unwrap().is_none());
        assert!(store.recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_sequences_increase() {
        let mut store = InMemoryHistoryStore::new();
        assert_eq!(store.append(attempt(SyncResult::Success, &[])).unwrap(), 1);
        assert_eq!(store.append(attempt(SyncResult::Failure, &[])).unwrap(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failures_do_not_replace_baseline() {
        let mut store = InMemoryHistoryStore::new();
        store
            .append(attempt(SyncResult::Success, &[LanguageClass::Java]))
            .unwrap();
        store
            .append(attempt(
                SyncResult::Failure,
                &[LanguageClass::Java, LanguageClass::Kotlin],
            ))
            .unwrap();
        store
            .append(attempt(SyncResult::Cancelled, &[LanguageClass::Kotlin]))
            .unwrap();

        let baseline = store.last_successful().unwrap().unwrap();
        assert_eq!(baseline.sequence(), 1);
        assert_eq!(
            baseline.configuration().active_languages,
            [LanguageClass::Java].into_iter().collect()
        );
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut store = InMemoryHistoryStore::new();
        for _ in 0..4 {
            store.append(attempt(SyncResult::Success, &[])).unwrap();
        }
        let recent: Vec<u64> = store.recent(2).unwrap().iter().map(|a| a.sequence).collect();
        assert_eq!(recent, vec![4, 3]);
    }
}

//! SQLite-backed sync history.
//!
//! Persists every sync attempt so the escalation baseline survives restarts.
//! Each append is a single INSERT, so a reader never sees a partial attempt.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{
    AppError, LanguageClass, ResolvedConfiguration, Result, SyncAttempt, SyncHistoryStore,
    SyncMode, SyncResult, SyncStateSnapshot, WorkspaceType,
};

const SELECT_ATTEMPT: &str = r"
    SELECT sequence, started_at, finished_at, requested_mode, effective_mode,
           result, workspace_type, languages, detail
    FROM sync_attempts";

/// Sync history repository using SQLite.
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Opens or creates the history database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create history directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        let store = Self { conn };
        store.init_schema()?;

        tracing::debug!(path = %path.display(), "Opened sync history");
        Ok(store)
    }

    /// Opens a throwaway in-memory history.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r"
            CREATE TABLE IF NOT EXISTS sync_attempts (
                sequence INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                requested_mode TEXT NOT NULL,
                effective_mode TEXT NOT NULL,
                result TEXT NOT NULL,
                workspace_type TEXT NOT NULL,
                languages TEXT NOT NULL,
                detail TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_sync_attempts_result
                ON sync_attempts(result, sequence DESC);
            ",
            )
            .map_err(AppError::database)?;

        Ok(())
    }

    fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawAttempt> {
        Ok(RawAttempt {
            sequence: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            requested_mode: row.get(3)?,
            effective_mode: row.get(4)?,
            result: row.get(5)?,
            workspace_type: row.get(6)?,
            languages: row.get(7)?,
            detail: row.get(8)?,
        })
    }
}

impl SyncHistoryStore for SqliteHistoryStore {
    fn append(&mut self, attempt: SyncAttempt) -> Result<u64> {
        let languages: Vec<&str> = attempt
            .configuration
            .active_languages
            .iter()
            .map(|l| l.name())
            .collect();
        let languages = serde_json::to_string(&languages).map_err(AppError::json_parse)?;

        self.conn
            .execute(
                r"
            INSERT INTO sync_attempts
                (started_at, finished_at, requested_mode, effective_mode, result,
                 workspace_type, languages, detail)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
                params![
                    attempt.started_at.to_rfc3339(),
                    attempt.finished_at.to_rfc3339(),
                    attempt.requested_mode.name(),
                    attempt.effective_mode.name(),
                    attempt.result.name(),
                    attempt.configuration.workspace_type.name(),
                    languages,
                    attempt.detail,
                ],
            )
            .map_err(AppError::database)?;

        let sequence = u64::try_from(self.conn.last_insert_rowid()).unwrap_or_default();
        tracing::debug!(sequence, result = %attempt.result, "Recorded sync attempt");
        Ok(sequence)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SyncAttempt>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ATTEMPT} ORDER BY sequence DESC LIMIT ?1"))
            .map_err(AppError::database)?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map([limit], Self::row_to_raw)
            .map_err(AppError::database)?;

        let mut attempts = Vec::new();
        for row in rows {
            match row.map_err(AppError::database)?.into_attempt() {
                Ok(attempt) => attempts.push(attempt),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable history entry"),
            }
        }

        Ok(attempts)
    }

    fn last_successful(&self) -> Result<Option<SyncStateSnapshot>> {
        let raw = self
            .conn
            .query_row(
                &format!("{SELECT_ATTEMPT} WHERE result = ?1 ORDER BY sequence DESC LIMIT 1"),
                [SyncResult::Success.name()],
                Self::row_to_raw,
            )
            .optional()
            .map_err(AppError::database)?;

        match raw {
            Some(raw) => Ok(raw.into_attempt()?.snapshot()),
            None => Ok(None),
        }
    }
}

/// A row as stored, before interpretation.
struct RawAttempt {
    sequence: i64,
    started_at: String,
    finished_at: String,
    requested_mode: String,
    effective_mode: String,
    result: String,
    workspace_type: String,
    languages: String,
    detail: Option<String>,
}

impl RawAttempt {
    fn into_attempt(self) -> Result<SyncAttempt> {
        let sequence = self.sequence;
        let corrupt = |what: &str, detail: String| AppError::HistoryCorruption {
            message: format!("attempt {sequence}: {what}: {detail}"),
        };

        let languages: Vec<String> = serde_json::from_str(&self.languages)
            .map_err(|e| corrupt("languages", e.to_string()))?;
        let active_languages: BTreeSet<LanguageClass> = languages
            .iter()
            .map(|l| l.parse::<LanguageClass>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| corrupt("languages", e))?;

        Ok(SyncAttempt {
            sequence: u64::try_from(sequence)
                .map_err(|e| corrupt("sequence", e.to_string()))?,
            started_at: parse_timestamp(&self.started_at)
                .ok_or_else(|| corrupt("started_at", self.started_at.clone()))?,
            finished_at: parse_timestamp(&self.finished_at)
                .ok_or_else(|| corrupt("finished_at", self.finished_at.clone()))?,
            requested_mode: self
                .requested_mode
                .parse::<SyncMode>()
                .map_err(|e| corrupt("requested_mode", e))?,
            effective_mode: self
                .effective_mode
                .parse::<SyncMode>()
                .map_err(|e| corrupt("effective_mode", e))?,
            result: self
                .result
                .parse::<SyncResult>()
                .map_err(|e| corrupt("result", e))?,
            configuration: ResolvedConfiguration {
                workspace_type: self
                    .workspace_type
                    .parse::<WorkspaceType>()
                    .map_err(|e| corrupt("workspace_type", e))?,
                active_languages,
            },
            detail: self.detail,
        })
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn attempt(result: SyncResult, languages: &[LanguageClass]) -> SyncAttempt {
        let now = Utc::now();
        SyncAttempt {
            sequence: 0,
            started_at: now,
            finished_at: now,
            requested_mode: SyncMode::Incremental,
            effective_mode: SyncMode::Full,
            result,
            configuration: ResolvedConfiguration::new(
                WorkspaceType::Android,
                languages.iter().copied(),
            ),
            detail: (!result.is_success()).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let store = SqliteHistoryStore::open(&dir.path().join("history.db")).unwrap();

        let count: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='sync_attempts'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert!(store.recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_last_successful_skips_failures() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        let first = store
            .append(attempt(SyncResult::Success, &[LanguageClass::Java]))
            .unwrap();
        store
            .append(attempt(SyncResult::Failure, &[LanguageClass::Kotlin]))
            .unwrap();

        let snapshot = store.last_successful().unwrap().unwrap();
        assert_eq!(snapshot.sequence(), first);
        assert_eq!(snapshot.sync_mode(), SyncMode::Full);
        assert_eq!(
            snapshot.configuration(),
            &ResolvedConfiguration::new(WorkspaceType::Android, [LanguageClass::Java])
        );
    }

    #[test]
    fn test_recent_preserves_failure_detail_and_order() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        store.append(attempt(SyncResult::Success, &[])).unwrap();
        store.append(attempt(SyncResult::Cancelled, &[])).unwrap();

        let recent = store.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].result, SyncResult::Cancelled);
        assert_eq!(recent[0].detail.as_deref(), Some("boom"));
        assert!(recent[0].sequence > recent[1].sequence);
    }

    #[test]
    fn test_history_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let mut store = SqliteHistoryStore::open(&path).unwrap();
            store
                .append(attempt(SyncResult::Success, &[LanguageClass::Kotlin]))
                .unwrap();
        }

        let store = SqliteHistoryStore::open(&path).unwrap();
        let config = store.last_successful_configuration().unwrap().unwrap();
        assert!(config.is_active(LanguageClass::Kotlin));
    }

    #[test]
    fn test_corrupt_baseline_is_reported() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        store
            .append(attempt(SyncResult::Success, &[LanguageClass::Java]))
            .unwrap();
        store
            .conn
            .execute("UPDATE sync_attempts SET languages = '[\"cobol\"]'", [])
            .unwrap();

        let err = store.last_successful().unwrap_err();
        assert!(matches!(err, AppError::HistoryCorruption { .. }));
        // Listing skips the bad row instead of failing.
        assert!(store.recent(5).unwrap().is_empty());
    }
}

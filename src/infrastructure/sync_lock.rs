//! Single-flight lock for sync runs.
//!
//! Two `build-sync sync` processes sharing a data directory would race on
//! the baseline, so a sync holds an exclusive advisory lock on `sync.lock`
//! while it runs. The OS drops the lock when the holder exits, crashed or not.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::{AppError, Result};

/// Held lock; released when dropped or when the process exits.
#[derive(Debug)]
pub struct SyncLock {
    file: File,
    path: PathBuf,
}

impl SyncLock {
    /// Take the lock at `path` without waiting.
    ///
    /// # Errors
    /// Returns `SyncInProgress` if another process holds the lock, or an I/O
    /// error if the lock file cannot be opened.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create lock directory", e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| AppError::io("Failed to open sync lock", e))?;

        if let Err(e) = file.try_lock_exclusive() {
            // fs2 reports contention as its own error kind on some platforms.
            if e.kind() == ErrorKind::WouldBlock
                || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
            {
                return Err(AppError::SyncInProgress {
                    lock_path: path.to_path_buf(),
                });
            }
            return Err(AppError::io("Failed to lock sync lock", e));
        }

        // Owner pid is informational; the lock holds even if this fails.
        if let Err(e) = write_owner(&mut file) {
            tracing::debug!(error = %e, "Could not record sync lock owner");
        }

        tracing::debug!(path = %path.display(), "Acquired sync lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_owner(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release sync lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.lock");

        let _lock = SyncLock::acquire(&path).unwrap();
        let err = SyncLock::acquire(&path).unwrap_err();
        assert!(matches!(err, AppError::SyncInProgress { lock_path } if lock_path == path));
    }

    #[test]
    fn test_drop_releases_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/sync.lock");

        {
            let lock = SyncLock::acquire(&path).unwrap();
            assert!(lock.path().exists());
        }
        assert!(SyncLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_leftover_lock_file_does_not_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.lock");
        // A crashed holder leaves the file behind but not the lock.
        fs::write(&path, "12345\n").unwrap();

        let lock = SyncLock::acquire(&path).unwrap();
        assert_eq!(
            fs::read_to_string(lock.path()).unwrap().trim(),
            std::process::id().to_string()
        );
    }
}

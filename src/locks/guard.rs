//! RAII lock guard implementation.

use super::metadata::LockRecord;
use super::operations::remove_lock_if_matches;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// RAII guard for a held lock file.
///
/// When dropped, the lock file is removed. If removal fails, a warning is
/// logged and no panic occurs.
///
/// Removal only happens while the file still carries this guard's record:
/// if another process reclaimed the lock as stale and now holds it, the new
/// holder's file is left alone.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the lock file.
    path: PathBuf,

    /// Record written when the lock was created.
    record: LockRecord,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    pub(super) fn new(path: PathBuf, record: LockRecord) -> Self {
        Self {
            path,
            record,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the record this guard wrote.
    pub fn record(&self) -> &LockRecord {
        &self.record
    }

    /// Release the lock, reporting any I/O failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.remove()
    }

    fn remove(&self) -> Result<()> {
        if !remove_lock_if_matches(&self.path, &self.record)? && self.path.exists() {
            tracing::warn!(
                lock = %self.path.display(),
                "lock was reclaimed by another process; leaving it in place"
            );
        }
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.remove()
        {
            tracing::warn!(
                lock = %self.path.display(),
                error = %e,
                "failed to release lock"
            );
        }
    }
}

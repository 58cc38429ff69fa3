//! Lock inspection results.

use super::metadata::LockRecord;
use std::path::PathBuf;
use std::time::Duration;

/// What was found at a lock path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    /// No lock file exists (it may have been released between steps).
    Absent,

    /// A lock file with a well-formed record.
    Held(LockRecord),

    /// A lock file exists but its content is empty or malformed.
    ///
    /// `age` is derived from the file's modification time when available.
    /// A freshly created lock is briefly empty before its record is written.
    Unreadable { age: Option<Duration> },
}

/// Information about a lock file found in a locks directory.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The lock record, if it could be parsed.
    pub record: Option<LockRecord>,

    /// Whether the lock may be reclaimed.
    pub is_stale: bool,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        match &self.record {
            Some(record) => write!(
                f,
                "{} (pid: {}, age: {}, url: {}{})",
                name,
                record.pid,
                record.age_string(super::now_millis()),
                record.url,
                if self.is_stale { ", STALE" } else { "" }
            ),
            None => write!(
                f,
                "{} (unreadable{})",
                name,
                if self.is_stale { ", STALE" } else { "" }
            ),
        }
    }
}

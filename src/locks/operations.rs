//! Lock creation, inspection, staleness, and removal.
//!
//! Every operation here races with other processes. A lock file appearing
//! or vanishing between steps is an expected outcome, never an error; only
//! genuine I/O failures are returned as errors.

use super::guard::LockGuard;
use super::liveness::ProcessProbe;
use super::metadata::LockRecord;
use super::path::LOCK_EXTENSION;
use super::types::{LockInfo, LockStatus};
use crate::error::{FetchError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::Duration;

/// Atomically create a lock file containing `record`.
///
/// Uses create_new semantics: if the file already exists it is left
/// untouched and `Ok(None)` is returned.
///
/// The locks directory must already exist.
pub fn try_create_lock(lock_path: &Path, record: &LockRecord) -> Result<Option<LockGuard>> {
    let json = record.to_json()?;

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => {
            return Err(FetchError::Io(format!(
                "failed to create lock file '{}': {}",
                lock_path.display(),
                e
            )));
        }
    };

    // From here on the file is ours; remove it if the record cannot be written.
    file.write_all(json.as_bytes()).map_err(|e| {
        let _ = fs::remove_file(lock_path);
        FetchError::Io(format!(
            "failed to write lock file '{}': {}",
            lock_path.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(lock_path);
        FetchError::Io(format!(
            "failed to sync lock file '{}': {}",
            lock_path.display(),
            e
        ))
    })?;

    Ok(Some(LockGuard::new(lock_path.to_path_buf(), record.clone())))
}

/// Read the lock file at `lock_path`.
pub fn read_lock(lock_path: &Path) -> Result<LockStatus> {
    let content = match fs::read(lock_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LockStatus::Absent),
        Err(e) => {
            return Err(FetchError::Io(format!(
                "failed to read lock file '{}': {}",
                lock_path.display(),
                e
            )));
        }
    };

    match serde_json::from_slice::<LockRecord>(&content) {
        Ok(record) => Ok(LockStatus::Held(record)),
        Err(e) => {
            tracing::debug!(
                lock = %lock_path.display(),
                error = %e,
                "lock file content is not a valid record"
            );
            unreadable_status(lock_path)
        }
    }
}

fn unreadable_status(lock_path: &Path) -> Result<LockStatus> {
    match fs::metadata(lock_path) {
        Ok(meta) => Ok(LockStatus::Unreadable {
            age: meta.modified().ok().and_then(|t| t.elapsed().ok()),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LockStatus::Absent),
        Err(_) => Ok(LockStatus::Unreadable { age: None }),
    }
}

/// Decide whether a lock may be reclaimed.
///
/// A lock is stale when its holder is no longer running or when it is older
/// than `stale_timeout`. Either condition is sufficient. The pid is only
/// probed for records written on this host.
pub fn is_stale<P>(record: &LockRecord, stale_timeout: Duration, now_ms: i64, probe: &P) -> bool
where
    P: ProcessProbe + ?Sized,
{
    if record.is_local() && !probe.is_alive(record.pid) {
        return true;
    }
    record.age_millis(now_ms) > super::duration_millis(stale_timeout)
}

/// Remove a lock file.
///
/// Returns `Ok(false)` if there was nothing to remove.
pub fn remove_lock(lock_path: &Path) -> Result<bool> {
    match fs::remove_file(lock_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FetchError::Io(format!(
            "failed to remove lock file '{}': {}",
            lock_path.display(),
            e
        ))),
    }
}

/// Remove a lock file only if it still holds `expected`.
///
/// Used when reclaiming a stale lock and when releasing: between reading a
/// record and removing it, another process may have replaced the file with
/// its own lock, which must survive.
pub fn remove_lock_if_matches(lock_path: &Path, expected: &LockRecord) -> Result<bool> {
    match read_lock(lock_path)? {
        LockStatus::Held(current) if current == *expected => remove_lock(lock_path),
        _ => Ok(false),
    }
}

/// List all lock files in a locks directory.
///
/// Files that are not `*.lock` are skipped. A missing directory yields an
/// empty list. Locks are sorted by path.
pub fn list_locks<P>(locks_dir: &Path, stale_timeout: Duration, probe: &P) -> Result<Vec<LockInfo>>
where
    P: ProcessProbe + ?Sized,
{
    let mut locks = Vec::new();

    let entries = match fs::read_dir(locks_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(locks),
        Err(e) => {
            return Err(FetchError::Io(format!(
                "failed to read locks directory '{}': {}",
                locks_dir.display(),
                e
            )));
        }
    };

    let now_ms = super::now_millis();
    for entry in entries {
        let entry = entry.map_err(|e| {
            FetchError::Io(format!("failed to read locks directory entry: {}", e))
        })?;

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(LOCK_EXTENSION) {
            continue;
        }

        let (record, is_stale) = match read_lock(&path)? {
            LockStatus::Absent => continue,
            LockStatus::Held(record) => {
                let stale = is_stale(&record, stale_timeout, now_ms, probe);
                (Some(record), stale)
            }
            LockStatus::Unreadable { age } => (None, age.is_some_and(|a| a > stale_timeout)),
        };

        locks.push(LockInfo {
            path,
            record,
            is_stale,
        });
    }

    locks.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(locks)
}

//! Lock files coordinating who produces a destination path.
//!
//! # Lock Files
//!
//! A lock file lives in a locks directory and is named after the encoded
//! absolute destination path (see [`lock_path_for`]). It is created with
//! **create_new** semantics (exclusive create), which is the only mutual
//! exclusion primitive shared by unrelated processes. The existence of the
//! file *is* the lock.
//!
//! # Lock Records
//!
//! Each lock file contains a JSON [`LockRecord`]:
//! - `pid`: process id of the holder
//! - `startTime`: milliseconds since the Unix epoch at acquisition
//! - `url`: the resource being fetched (diagnostics only)
//! - `host`: hostname of the holder, so liveness is only probed locally
//!
//! Records only exist to judge staleness: a lock whose holder died, or that
//! is older than the stale timeout, may be removed by anyone.
//!
//! # RAII Guards
//!
//! A successful create returns a [`LockGuard`] that removes the lock file
//! when released or dropped, so every exit path releases the lock.

mod guard;
mod liveness;
mod metadata;
mod operations;
mod path;
mod types;


pub use guard::LockGuard;
pub use liveness::{ProcessProbe, SystemProbe};
pub use metadata::LockRecord;
pub use operations::{
    is_stale, list_locks, read_lock, remove_lock, remove_lock_if_matches, try_create_lock,
};
pub use path::{LOCK_EXTENSION, lock_path_for};
pub use types::{LockInfo, LockStatus};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a duration to whole milliseconds, saturating at `i64::MAX`.
pub(crate) fn duration_millis(duration: std::time::Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

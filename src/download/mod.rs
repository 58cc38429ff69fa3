//! Download coordination.
//!
//! Produces a destination file exactly once even when many threads or
//! processes ask for it concurrently:
//!
//! 1. **Fast path**: an existing destination is returned without locking.
//! 2. **Acquire**: contend for the destination's lock file, reclaiming stale
//!    locks and polling while a live holder works.
//! 3. **Holding**: fetch the URL and persist it atomically.
//! 4. **Release**: remove the lock on every exit path.
//!
//! Waiters observe the finished file and return without fetching again.

mod coordinator;
mod options;
mod result;


pub use coordinator::{Downloader, download_with_lock, resolve_destination};
pub use options::{
    DEFAULT_LOCK_TIMEOUT, DEFAULT_LOCKS_DIR_NAME, DEFAULT_POLL_INTERVAL, DEFAULT_STALE_TIMEOUT,
    DownloadOptions, default_locks_dir,
};
pub use result::DownloadResult;

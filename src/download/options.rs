//! Options controlling lock acquisition.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the locks directory created next to a destination by default.
pub const DEFAULT_LOCKS_DIR_NAME: &str = ".locks";

/// Default maximum time to wait for another holder (5 minutes).
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default delay between acquisition attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default age after which a held lock is presumed abandoned (10 minutes).
pub const DEFAULT_STALE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Options for [`super::Downloader::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Directory holding lock files. `None` means `<dest parent>/.locks`.
    pub locks_dir: Option<PathBuf>,

    /// Maximum total time spent waiting for the lock.
    pub lock_timeout: Duration,

    /// Delay between acquisition retries while the lock is held.
    pub poll_interval: Duration,

    /// Age past which a held lock is presumed abandoned.
    pub stale_timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            locks_dir: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stale_timeout: DEFAULT_STALE_TIMEOUT,
        }
    }
}

impl DownloadOptions {
    pub fn with_locks_dir(mut self, locks_dir: impl Into<PathBuf>) -> Self {
        self.locks_dir = Some(locks_dir.into());
        self
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_stale_timeout(mut self, stale_timeout: Duration) -> Self {
        self.stale_timeout = stale_timeout;
        self
    }

    /// Locks directory to use for `dest`.
    ///
    /// Computed on every call from the inputs alone, so concurrent callers
    /// with different destinations never share hidden state.
    pub fn locks_dir_for(&self, dest: &Path) -> PathBuf {
        match &self.locks_dir {
            Some(dir) => dir.clone(),
            None => default_locks_dir(dest),
        }
    }
}

/// Default locks directory for a destination: `<dest parent>/.locks`.
pub fn default_locks_dir(dest: &Path) -> PathBuf {
    dest.parent()
        .unwrap_or(Path::new("."))
        .join(DEFAULT_LOCKS_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locks_dir_is_sibling() {
        assert_eq!(
            default_locks_dir(Path::new("/srv/cache/file.bin")),
            PathBuf::from("/srv/cache/.locks")
        );
    }

    #[test]
    fn test_explicit_locks_dir_wins() {
        let options = DownloadOptions::default().with_locks_dir("/var/lock/oncefetch");
        assert_eq!(
            options.locks_dir_for(Path::new("/srv/cache/file.bin")),
            PathBuf::from("/var/lock/oncefetch")
        );
    }

    #[test]
    fn test_builder_setters() {
        let options = DownloadOptions::default()
            .with_lock_timeout(Duration::from_secs(1))
            .with_poll_interval(Duration::from_millis(5))
            .with_stale_timeout(Duration::from_secs(2));

        assert_eq!(options.lock_timeout, Duration::from_secs(1));
        assert_eq!(options.poll_interval, Duration::from_millis(5));
        assert_eq!(options.stale_timeout, Duration::from_secs(2));
        assert_eq!(options.locks_dir, None);
    }
}

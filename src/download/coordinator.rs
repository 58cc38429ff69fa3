//! The download-once protocol.
//!
//! ```text
//!            dest exists? ──yes──> return {path, size}
//!                 │no
//!                 v
//!   ┌──> try_create_lock ──won──> (dest exists? release) fetch ─> persist ─> release ─> return
//!   │          │lost
//!   │          v
//!   │     read_lock ── absent ─────────────────┐
//!   │          │                               │
//!   │          ├── stale ─> remove ────────────┤ (retry immediately)
//!   │          │                               │
//!   │          └── held ─> sleep(poll) ─> timed out? ──yes──> LockTimeout
//!   │                                          │no
//!   │                                   dest exists? ──yes──> return {path, size}
//!   └──────────────────────────────────────────┘no
//! ```

use super::options::DownloadOptions;
use super::result::DownloadResult;
use crate::error::{FetchError, Result};
use crate::fs::atomic_write_from;
use crate::http::{HttpClient, ReqwestClient};
use crate::locks::{
    LockGuard, LockRecord, LockStatus, ProcessProbe, SystemProbe, is_stale, lock_path_for,
    now_millis, read_lock, remove_lock, remove_lock_if_matches, try_create_lock,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of the acquisition loop.
enum Acquired {
    /// We created the lock and must produce the destination.
    Holding(LockGuard),
    /// Another holder produced the destination while we waited.
    Completed(DownloadResult),
}

/// Downloads URLs to destinations at most once across processes.
///
/// Generic over the HTTP client and the process liveness probe so both can
/// be replaced in tests.
#[derive(Debug, Clone)]
pub struct Downloader<C = ReqwestClient, P = SystemProbe> {
    client: C,
    probe: P,
}

impl Downloader {
    /// Create a downloader using reqwest and the operating system's probe.
    pub fn new() -> Result<Self> {
        Ok(Self::with_collaborators(ReqwestClient::new()?, SystemProbe))
    }
}

impl<C: HttpClient> Downloader<C, SystemProbe> {
    /// Create a downloader with a custom HTTP client.
    pub fn with_client(client: C) -> Self {
        Self::with_collaborators(client, SystemProbe)
    }
}

impl<C: HttpClient, P: ProcessProbe> Downloader<C, P> {
    pub fn with_collaborators(client: C, probe: P) -> Self {
        Self { client, probe }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Make sure `dest` holds the content of `url`, fetching it at most once.
    ///
    /// Returns immediately without locking if `dest` already exists.
    /// Otherwise waits for the destination's lock, fetches, persists, and
    /// releases the lock on every exit path.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - malformed or non-HTTP(S) URL, or unusable destination
    /// * `LockTimeout` - another holder kept the lock past `lock_timeout`
    /// * `DownloadFailed` - non-2xx response or transport failure
    /// * `Io` - filesystem failure other than exists/not-found
    pub fn download(
        &self,
        url: &str,
        dest: impl AsRef<Path>,
        options: &DownloadOptions,
    ) -> Result<DownloadResult> {
        let url = parse_url(url)?;
        let dest = resolve_destination(dest.as_ref())?;

        if let Some(existing) = existing_result(&dest)? {
            debug!(dest = %dest.display(), size = existing.size, "destination already present");
            return Ok(existing);
        }

        let locks_dir = options.locks_dir_for(&dest);
        fs::create_dir_all(&locks_dir).map_err(|e| {
            FetchError::Io(format!(
                "failed to create locks directory '{}': {}",
                locks_dir.display(),
                e
            ))
        })?;
        let lock_path = lock_path_for(&dest, &locks_dir);

        let guard = match self.acquire(&url, &dest, &lock_path, options)? {
            Acquired::Holding(guard) => guard,
            Acquired::Completed(result) => return Ok(result),
        };

        let outcome = self.fetch_and_persist(&url, &dest);
        let released = guard.release();

        match (outcome, released) {
            (Ok(result), Ok(())) => Ok(result),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                warn!(lock = %lock_path.display(), error = %release_err, "failed to release lock");
                Err(e)
            }
        }
    }

    fn acquire(
        &self,
        url: &Url,
        dest: &Path,
        lock_path: &Path,
        options: &DownloadOptions,
    ) -> Result<Acquired> {
        let started = Instant::now();

        loop {
            let record = LockRecord::new(url.as_str());
            if let Some(guard) = try_create_lock(lock_path, &record)? {
                // A previous holder may have finished just before we won.
                if let Some(existing) = existing_result(dest)? {
                    guard.release()?;
                    debug!(dest = %dest.display(), "destination appeared before fetch");
                    return Ok(Acquired::Completed(existing));
                }
                debug!(lock = %guard.path().display(), pid = guard.record().pid, "lock acquired");
                return Ok(Acquired::Holding(guard));
            }

            match read_lock(lock_path)? {
                LockStatus::Absent => continue,
                LockStatus::Held(existing)
                    if is_stale(&existing, options.stale_timeout, now_millis(), &self.probe) =>
                {
                    warn!(
                        lock = %lock_path.display(),
                        pid = existing.pid,
                        age_ms = existing.age_millis(now_millis()),
                        "reclaiming stale lock"
                    );
                    remove_lock_if_matches(lock_path, &existing)?;
                    continue;
                }
                LockStatus::Unreadable { age: Some(age) } if age > options.stale_timeout => {
                    warn!(lock = %lock_path.display(), ?age, "reclaiming unreadable lock");
                    remove_lock(lock_path)?;
                    continue;
                }
                LockStatus::Held(existing) => {
                    debug!(lock = %lock_path.display(), pid = existing.pid, "lock held, waiting");
                }
                LockStatus::Unreadable { .. } => {
                    debug!(lock = %lock_path.display(), "lock unreadable, waiting");
                }
            }

            thread::sleep(options.poll_interval);

            let waited = started.elapsed();
            if waited > options.lock_timeout {
                warn!(lock = %lock_path.display(), ?waited, "timed out waiting for lock");
                return Err(FetchError::LockTimeout(format!(
                    "waited {}ms for lock '{}' guarding '{}'",
                    waited.as_millis(),
                    lock_path.display(),
                    dest.display()
                )));
            }

            if let Some(existing) = existing_result(dest)? {
                debug!(dest = %dest.display(), "destination produced by another holder");
                return Ok(Acquired::Completed(existing));
            }
        }
    }

    fn fetch_and_persist(&self, url: &Url, dest: &Path) -> Result<DownloadResult> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FetchError::Io(format!(
                    "failed to create destination directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        info!(%url, dest = %dest.display(), "fetching");
        let mut response = self.client.get(url)?;
        if !response.is_success() {
            return Err(FetchError::DownloadFailed(format!(
                "server responded with HTTP {} for {}",
                response.status, url
            )));
        }
        debug!(
            status = response.status,
            content_length = response.header("content-length").unwrap_or("unknown"),
            "response received"
        );

        let size = atomic_write_from(&mut response.body, dest)?;
        info!(dest = %dest.display(), size, "download complete");

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size,
        })
    }
}

/// Download `url` to `dest` with the default HTTP client and process probe.
pub fn download_with_lock(
    url: &str,
    dest: impl AsRef<Path>,
    options: &DownloadOptions,
) -> Result<DownloadResult> {
    Downloader::new()?.download(url, dest, options)
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| FetchError::InvalidInput(format!("invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidInput(format!(
            "unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

/// Resolve `dest` to an absolute path with `.` and `..` segments folded.
///
/// Every spelling of the same location must map to the same lock file, so
/// this is applied before deriving the lock path. The folding is lexical;
/// symlinks are not followed.
pub fn resolve_destination(dest: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(dest).map_err(|e| {
        FetchError::InvalidInput(format!("invalid destination '{}': {}", dest.display(), e))
    })?;
    let absolute = normalize_lexically(&absolute);

    if absolute.file_name().is_none() {
        return Err(FetchError::InvalidInput(format!(
            "destination '{}' does not name a file",
            dest.display()
        )));
    }

    Ok(absolute)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // Popping at the root is a no-op, matching how `/..` resolves
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Result for a destination that already exists, if it does.
fn existing_result(dest: &Path) -> Result<Option<DownloadResult>> {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_dir() => Err(FetchError::InvalidInput(format!(
            "destination '{}' is a directory",
            dest.display()
        ))),
        Ok(meta) => Ok(Some(DownloadResult {
            path: dest.to_path_buf(),
            size: meta.len(),
        })),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FetchError::Io(format!(
            "failed to inspect destination '{}': {}",
            dest.display(),
            e
        ))),
    }
}

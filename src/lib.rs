//! oncefetch: fetch a URL to a local path exactly once.
//!
//! Many threads or processes may ask for the same destination at the same
//! time. One of them wins an exclusively created lock file and performs the
//! download; the others poll until the file appears and return it without
//! fetching again. Locks left behind by crashed processes are reclaimed
//! once their holder is gone or they exceed a stale timeout.
//!
//! ```no_run
//! use oncefetch::{DownloadOptions, download_with_lock};
//!
//! let result = download_with_lock(
//!     "https://example.com/archive.tar.gz",
//!     "/var/cache/archives/archive.tar.gz",
//!     &DownloadOptions::default(),
//! )?;
//! println!("{} is {} bytes", result.path.display(), result.size);
//! # Ok::<(), oncefetch::FetchError>(())
//! ```

pub mod config;
pub mod download;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod http;
pub mod locks;

pub use download::{DownloadOptions, DownloadResult, Downloader, download_with_lock};
pub use error::{FetchError, Result};

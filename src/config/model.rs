//! Config struct definition and default implementation.

use crate::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for oncefetch.
///
/// This struct represents the contents of a YAML config file.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Maximum milliseconds to wait for another holder of a destination lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Milliseconds between acquisition attempts while a lock is held.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Milliseconds after which a held lock is presumed abandoned.
    #[serde(default = "default_stale_timeout_ms")]
    pub stale_timeout_ms: u64,

    /// Directory for lock files. Unset means `.locks` next to each destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locks_dir: Option<PathBuf>,

    // =========================================================================
    // HTTP settings
    // =========================================================================
    /// Timeout for a whole request, body included, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            stale_timeout_ms: default_stale_timeout_ms(),
            locks_dir: None,
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_lock_timeout_ms() -> u64 {
    5 * 60 * 1000
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_stale_timeout_ms() -> u64 {
    10 * 60 * 1000
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

//! Lock record stored inside lock files.

use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};

/// Metadata written into a lock file by the process that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    /// Process ID of the lock holder.
    pub pid: u32,

    /// Milliseconds since the Unix epoch when the lock was acquired.
    pub start_time: i64,

    /// The URL being fetched. Diagnostic only.
    pub url: String,

    /// Hostname of the lock holder.
    ///
    /// Records written without a host are assumed to come from this machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl LockRecord {
    /// Create a record for the current process with the current timestamp.
    pub fn new(url: &str) -> Self {
        Self {
            pid: std::process::id(),
            start_time: super::now_millis(),
            url: url.to_string(),
            host: local_hostname(),
        }
    }

    /// Serialize the record to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FetchError::Io(format!("failed to serialize lock record: {}", e)))
    }

    /// Milliseconds elapsed between `start_time` and `now_ms`.
    ///
    /// Negative when the holder's clock is ahead of ours.
    pub fn age_millis(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.start_time)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self, now_ms: i64) -> String {
        let seconds = self.age_millis(now_ms).max(0) / 1000;
        let minutes = seconds / 60;
        let hours = minutes / 60;
        let days = hours / 24;

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m", minutes)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Whether the record was written on this machine, so its pid can be probed.
    pub fn is_local(&self) -> bool {
        match &self.host {
            None => true,
            Some(host) => local_hostname().as_deref() == Some(host.as_str()),
        }
    }
}

/// Hostname of this machine, if it can be determined.
pub(crate) fn local_hostname() -> Option<String> {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
}

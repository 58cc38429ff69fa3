use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a successful download, or of finding the destination present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Absolute destination path.
    pub path: PathBuf,

    /// Final file size in bytes.
    pub size: u64,
}

impl std::fmt::Display for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes)", self.path.display(), self.size)
    }
}

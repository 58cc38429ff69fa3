//! Error types for oncefetch.
//!
//! Uses thiserror for derive macros and keeps messages user-actionable:
//! every message names the URL or path involved.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for oncefetch operations.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL or destination cannot be used. Raised before any lock is attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Another process held the destination lock for longer than the lock timeout.
    #[error("Lock acquisition timed out: {0}")]
    LockTimeout(String),

    /// The fetch returned a non-success status or the transport failed.
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// A filesystem operation failed for a reason other than exists/not-found.
    #[error("I/O failure: {0}")]
    Io(String),

    /// Invalid configuration or command-line usage.
    #[error("{0}")]
    UserError(String),
}

impl FetchError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::InvalidInput(_) => exit_codes::USER_ERROR,
            FetchError::UserError(_) => exit_codes::USER_ERROR,
            FetchError::DownloadFailed(_) => exit_codes::DOWNLOAD_FAILURE,
            FetchError::Io(_) => exit_codes::IO_FAILURE,
            FetchError::LockTimeout(_) => exit_codes::LOCK_TIMEOUT,
        }
    }
}

/// Result type alias for oncefetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_a_user_error() {
        let err = FetchError::InvalidInput("relative URL without a base".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn download_failure_has_correct_exit_code() {
        let err = FetchError::DownloadFailed("HTTP 500".to_string());
        assert_eq!(err.exit_code(), exit_codes::DOWNLOAD_FAILURE);
    }

    #[test]
    fn io_failure_has_correct_exit_code() {
        let err = FetchError::Io("permission denied".to_string());
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
    }

    #[test]
    fn lock_timeout_has_correct_exit_code() {
        let err = FetchError::LockTimeout("held by pid 42".to_string());
        assert_eq!(err.exit_code(), exit_codes::LOCK_TIMEOUT);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = FetchError::DownloadFailed("HTTP 404 Not Found from http://x/y".to_string());
        assert_eq!(
            err.to_string(),
            "Download failed: HTTP 404 Not Found from http://x/y"
        );

        let err = FetchError::UserError("bad config".to_string());
        assert_eq!(err.to_string(), "bad config");
    }
}

//! Exit code constants for the oncefetch CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid URL, invalid config)
//! - 2: Download failure (non-2xx status or transport error)
//! - 3: I/O failure (filesystem or lock file manipulation)
//! - 4: Lock acquisition timed out

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, malformed URL, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The fetch returned a non-success status or the transport failed.
pub const DOWNLOAD_FAILURE: i32 = 2;

/// A filesystem operation failed for a reason other than exists/not-found.
pub const IO_FAILURE: i32 = 3;

/// Waiting for another holder of the destination lock exceeded the timeout.
pub const LOCK_TIMEOUT: i32 = 4;

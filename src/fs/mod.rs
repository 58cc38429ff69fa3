//! Filesystem utilities for oncefetch.
//!
//! Downloads are placed with an atomic rename so that a destination path is
//! either absent or complete, never partially written.

pub mod atomic;

pub use atomic::atomic_write_from;

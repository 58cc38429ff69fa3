//! Atomic placement of downloaded content.
//!
//! All writes follow this pattern:
//! 1. Stream content into a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it onto the target
//!
//! A reader therefore either sees no destination or the complete one.
//!
//! # Important Notes
//!
//! - Source and destination must be on the same filesystem for atomic rename,
//!   which is why the temporary file is a sibling of the target
//! - On crash, a temporary file may remain (named `.{filename}.{pid}-{seq}.part`)

use crate::error::{FetchError, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Buffer size for copying the body to disk (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Atomically write everything read from `reader` to `path`.
///
/// Returns the number of bytes written. Failures reading from `reader` are
/// reported as [`FetchError::DownloadFailed`] since the reader is a response
/// body; failures on the local side are [`FetchError::Io`]. On any failure
/// the temporary file is removed and `path` is untouched.
pub fn atomic_write_from<R: Read + ?Sized>(reader: &mut R, path: &Path) -> Result<u64> {
    let temp_path = generate_temp_path(path)?;

    let written = write_and_sync(reader, &temp_path).inspect_err(|_| {
        let _ = fs::remove_file(&temp_path);
    })?;

    atomic_replace(&temp_path, path)?;

    Ok(written)
}

/// Generate a temporary file path in the same directory as the target.
///
/// The pid and a per-process sequence number keep concurrent writers apart.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target.file_name().ok_or_else(|| {
        FetchError::InvalidInput(format!(
            "destination '{}' has no file name",
            target.display()
        ))
    })?;

    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(
        ".{}.{}-{}.part",
        filename.to_string_lossy(),
        std::process::id(),
        seq
    );
    Ok(parent.join(temp_name))
}

fn write_and_sync<R: Read + ?Sized>(reader: &mut R, path: &Path) -> Result<u64> {
    let mut file = File::create(path).map_err(|e| {
        FetchError::Io(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written: u64 = 0;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FetchError::DownloadFailed(format!(
                    "failed to read response body: {}",
                    e
                )));
            }
        };
        file.write_all(&buffer[..n]).map_err(|e| {
            FetchError::Io(format!(
                "failed to write to temporary file '{}': {}",
                path.display(),
                e
            ))
        })?;
        written += n as u64;
    }

    file.sync_all().map_err(|e| {
        FetchError::Io(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(written)
}

/// Rename the finished temporary file onto the target.
fn atomic_replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        FetchError::Io(format!(
            "failed to move download into place at '{}': {}",
            target.display(),
            e
        ))
    })?;

    // Persist the directory entry as well
    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Reader that yields some bytes and then fails.
    struct BrokenReader {
        sent: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.sent {
                return Err(std::io::Error::new(
                    ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"part");
            Ok(4)
        }
    }

    fn leftover_entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        let written = atomic_write_from(&mut Cursor::new(b"hello world"), &file_path).unwrap();

        assert_eq!(written, 11);
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "hello world");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original content").unwrap();

        atomic_write_from(&mut Cursor::new(b"new content"), &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_temp_file_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write_from(&mut Cursor::new(b"content"), &file_path).unwrap();

        assert_eq!(leftover_entries(temp_dir.path()), vec!["test.txt".to_string()]);
    }

    #[test]
    fn test_atomic_write_large_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("large.bin");

        // Several buffer lengths worth of data
        let large_content: Vec<u8> = (0..(BUFFER_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();

        let written = atomic_write_from(&mut Cursor::new(&large_content), &file_path).unwrap();

        assert_eq!(written, large_content.len() as u64);
        assert_eq!(fs::read(&file_path).unwrap(), large_content);
    }

    #[test]
    fn test_atomic_write_empty_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("empty.txt");

        let written = atomic_write_from(&mut std::io::empty(), &file_path).unwrap();

        assert_eq!(written, 0);
        assert!(fs::read(&file_path).unwrap().is_empty());
    }

    #[test]
    fn test_read_failure_leaves_no_trace() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("broken.bin");

        let err = atomic_write_from(&mut BrokenReader { sent: false }, &file_path).unwrap_err();

        assert!(matches!(err, FetchError::DownloadFailed(_)));
        assert!(!file_path.exists());
        assert!(leftover_entries(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_generate_temp_path_is_unique_sibling() {
        let target = Path::new("/some/path/file.txt");
        let a = generate_temp_path(target).unwrap();
        let b = generate_temp_path(target).unwrap();

        assert_eq!(a.parent().unwrap(), Path::new("/some/path"));
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".file.txt."));
        assert!(name.ends_with(".part"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_target_without_file_name_is_invalid() {
        let err = generate_temp_path(Path::new("/")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
    }
}

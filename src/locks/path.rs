//! Deterministic mapping from destination paths to lock file paths.
//!
//! The file stem is an escaped form of the absolute destination path:
//! bytes in `[A-Za-z0-9.-]` are kept and every other byte becomes `_xx`
//! (lowercase hex). Because `_` only ever starts an escape, distinct paths
//! give distinct stems. Stems longer than [`MAX_STEM_LEN`] keep a readable
//! tail and append `_h` plus the SHA-256 of the full path; `_h` can never
//! appear in a short stem since `h` is not a hex digit.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// File extension of lock files.
pub const LOCK_EXTENSION: &str = "lock";

const MAX_STEM_LEN: usize = 200;
const HASHED_TAIL_LEN: usize = 100;

/// Compute the lock file path guarding `dest`.
///
/// `dest` should already be absolute; this function does no I/O and does
/// not resolve it.
pub fn lock_path_for(dest: &Path, locks_dir: &Path) -> PathBuf {
    locks_dir.join(format!("{}.{}", encode_stem(dest), LOCK_EXTENSION))
}

fn encode_stem(dest: &Path) -> String {
    let bytes = path_bytes(dest);
    let encoded = encode_bytes(&bytes);
    if encoded.len() <= MAX_STEM_LEN {
        return encoded;
    }

    // Longest suffix of whole escape tokens that fits the tail budget.
    let mut tail_len = 0;
    let mut cut = bytes.len();
    for (i, &b) in bytes.iter().enumerate().rev() {
        let width = if is_kept(b) { 1 } else { 3 };
        if tail_len + width > HASHED_TAIL_LEN {
            break;
        }
        tail_len += width;
        cut = i;
    }

    let digest = hex::encode(Sha256::digest(&bytes));
    format!("{}_h{}", encode_bytes(&bytes[cut..]), digest)
}

fn encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if is_kept(b) {
            out.push(char::from(b));
        } else {
            out.push('_');
            out.push_str(&format!("{:02x}", b));
        }
    }
    out
}

fn is_kept(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-'
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(windows)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str()
        .encode_wide()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

#[cfg(not(any(unix, windows)))]
fn path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

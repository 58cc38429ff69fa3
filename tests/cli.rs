//! Exit codes and lock management through the `oncefetch` binary.

use oncefetch::exit_codes;
use oncefetch::locks::{LockRecord, lock_path_for, now_millis};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn oncefetch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oncefetch"))
        .args(args)
        .output()
        .expect("failed to spawn oncefetch")
}

fn plant_lock(dest: &Path, record: &LockRecord) -> std::path::PathBuf {
    let locks_dir = dest.parent().unwrap().join(".locks");
    fs::create_dir_all(&locks_dir).unwrap();
    let lock_path = lock_path_for(dest, &locks_dir);
    fs::write(&lock_path, record.to_json().unwrap()).unwrap();
    lock_path
}

fn fresh_record() -> LockRecord {
    LockRecord::new("https://example.com/data.bin")
}

fn stale_record() -> LockRecord {
    LockRecord {
        start_time: now_millis() - 24 * 60 * 60 * 1000,
        ..fresh_record()
    }
}

#[test]
fn test_invalid_url_is_user_error() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out.bin");

    let output = oncefetch(&["fetch", "ftp://example.com/a", dest.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(exit_codes::USER_ERROR));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported URL scheme"));
    assert!(!temp.path().join(".locks").exists());
}

#[test]
fn test_existing_destination_needs_no_network() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("present.txt");
    fs::write(&dest, "cached").unwrap();

    // Nothing listens on port 9; success proves no request was made.
    let output = oncefetch(&[
        "fetch",
        "--json",
        "http://127.0.0.1:9/present.txt",
        dest.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["size"], 6);
}

#[test]
fn test_live_lock_times_out() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("blocked.bin");
    let lock_path = plant_lock(&dest, &fresh_record());

    let output = oncefetch(&[
        "fetch",
        "http://127.0.0.1:9/blocked.bin",
        dest.to_str().unwrap(),
        "--lock-timeout-ms",
        "200",
        "--poll-interval-ms",
        "20",
    ]);

    assert_eq!(output.status.code(), Some(exit_codes::LOCK_TIMEOUT));
    assert!(lock_path.exists());
}

#[test]
fn test_lock_clear_removes_stale_lock() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("data.bin");
    let lock_path = plant_lock(&dest, &stale_record());

    let output = oncefetch(&["lock", "clear", dest.to_str().unwrap()]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(!lock_path.exists());
}

#[test]
fn test_lock_clear_refuses_live_lock_without_force() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("data.bin");
    let lock_path = plant_lock(&dest, &fresh_record());

    let refused = oncefetch(&["lock", "clear", dest.to_str().unwrap()]);
    assert_eq!(refused.status.code(), Some(exit_codes::USER_ERROR));
    assert!(String::from_utf8_lossy(&refused.stderr).contains("--force"));
    assert!(lock_path.exists());

    let forced = oncefetch(&["lock", "clear", "--force", dest.to_str().unwrap()]);
    assert!(forced.status.success());
    assert!(!lock_path.exists());
}

#[test]
fn test_lock_clear_without_lock_is_user_error() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("nothing.bin");

    let output = oncefetch(&["lock", "clear", dest.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(exit_codes::USER_ERROR));
}

#[test]
fn test_lock_list_marks_stale_entries() {
    let temp = TempDir::new().unwrap();
    plant_lock(&temp.path().join("old.bin"), &stale_record());
    plant_lock(&temp.path().join("new.bin"), &fresh_record());
    let locks_dir = temp.path().join(".locks");

    let output = oncefetch(&["lock", "list", locks_dir.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "stdout: {}", stdout);
    assert_eq!(lines.iter().filter(|l| l.ends_with(", STALE)")).count(), 1);
}

#[test]
fn test_lock_list_empty_directory() {
    let temp = TempDir::new().unwrap();

    let output = oncefetch(&["lock", "list", temp.path().to_str().unwrap()]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("No locks"));
}

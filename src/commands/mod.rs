//! Command implementations for the oncefetch CLI.
//!
//! Routes parsed CLI commands to the library. Configuration is resolved
//! once per invocation: the optional YAML file first, then flag overrides.

use crate::cli::{Cli, Command, FetchArgs, LockAction, LockClearArgs, LockListArgs};
use oncefetch::config::Config;
use oncefetch::download::{Downloader, default_locks_dir, resolve_destination};
use oncefetch::error::{FetchError, Result};
use oncefetch::locks::{
    LockStatus, ProcessProbe, SystemProbe, is_stale, list_locks, lock_path_for, now_millis, read_lock,
    remove_lock, remove_lock_if_matches,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Fetch(args) => cmd_fetch(config, args),
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::List(args) => cmd_lock_list(&config, args),
            LockAction::Clear(args) => cmd_lock_clear(&config, args),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn cmd_fetch(mut config: Config, args: FetchArgs) -> Result<()> {
    if let Some(dir) = args.locks_dir {
        config.locks_dir = Some(dir);
    }
    if let Some(ms) = args.lock_timeout_ms {
        config.lock_timeout_ms = ms;
    }
    if let Some(ms) = args.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    if let Some(ms) = args.stale_timeout_ms {
        config.stale_timeout_ms = ms;
    }
    if let Some(secs) = args.http_timeout_secs {
        config.http_timeout_secs = secs;
    }
    config.validate()?;

    let downloader = Downloader::with_client(config.http_client()?);
    let result = downloader.download(&args.url, &args.dest, &config.download_options())?;

    if args.json {
        let json = serde_json::to_string(&result)
            .map_err(|e| FetchError::Io(format!("failed to serialize result: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", result);
    }

    Ok(())
}

fn cmd_lock_list(config: &Config, args: LockListArgs) -> Result<()> {
    let stale_timeout = Duration::from_millis(config.stale_timeout_ms);
    let found = list_locks(&args.locks_dir, stale_timeout, &SystemProbe)?;

    if found.is_empty() {
        println!("No locks in {}", args.locks_dir.display());
        return Ok(());
    }

    for info in &found {
        println!("{}", info);
    }

    Ok(())
}

fn cmd_lock_clear(config: &Config, args: LockClearArgs) -> Result<()> {
    let dest = resolve_destination(&args.dest)?;
    let locks_dir: PathBuf = args
        .locks_dir
        .or_else(|| config.locks_dir.clone())
        .unwrap_or_else(|| default_locks_dir(&dest));
    let lock_path = lock_path_for(&dest, &locks_dir);
    let stale_timeout = Duration::from_millis(config.stale_timeout_ms);

    let removed = clear_lock(&dest, &lock_path, stale_timeout, args.force, &SystemProbe)?;

    if removed {
        println!("Cleared lock {}", lock_path.display());
    } else {
        println!("Lock {} changed since it was read; left in place", lock_path.display());
    }

    Ok(())
}

/// Remove the lock at `lock_path` if it is stale, or unconditionally with
/// `force`. Returns false when the lock changed hands after it was judged.
fn clear_lock<P: ProcessProbe + ?Sized>(
    dest: &Path,
    lock_path: &Path,
    stale_timeout: Duration,
    force: bool,
    probe: &P,
) -> Result<bool> {
    match read_lock(lock_path)? {
        LockStatus::Absent => Err(FetchError::UserError(format!(
            "no lock for '{}' at: {}",
            dest.display(),
            lock_path.display()
        ))),
        LockStatus::Held(_) if force => remove_lock(lock_path),
        LockStatus::Held(record) => {
            if !is_stale(&record, stale_timeout, now_millis(), probe) {
                return Err(FetchError::UserError(format!(
                    "lock for '{}' is held by live pid {} (age {}); use --force to remove it",
                    dest.display(),
                    record.pid,
                    record.age_string(now_millis())
                )));
            }
            remove_lock_if_matches(lock_path, &record)
        }
        LockStatus::Unreadable { age } => {
            if !force && !age.is_some_and(|a| a > stale_timeout) {
                return Err(FetchError::UserError(format!(
                    "lock for '{}' is unreadable but recent; use --force to remove it",
                    dest.display()
                )));
            }
            remove_lock(lock_path)
        }
    }
}

//! CLI argument parsing for oncefetch.
//!
//! Uses clap derive macros for declarative argument definitions.
//! Implementations live in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// oncefetch: download a URL to a path exactly once, even across processes.
///
/// Concurrent invocations for the same destination coordinate through a lock
/// file: one downloads, the others wait for the file and reuse it.
#[derive(Parser, Debug)]
#[command(name = "oncefetch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// YAML config file providing defaults for the options below.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for oncefetch.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a URL to a destination unless it is already present.
    Fetch(FetchArgs),

    /// Lock management commands.
    ///
    /// List or clear destination locks.
    Lock(LockCommand),
}

/// Arguments for the `fetch` command.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// URL to download (http or https).
    pub url: String,

    /// Destination file path.
    pub dest: PathBuf,

    /// Directory for lock files (default: `.locks` next to the destination).
    #[arg(long, value_name = "DIR")]
    pub locks_dir: Option<PathBuf>,

    /// Maximum milliseconds to wait for another process holding the lock.
    #[arg(long, value_name = "MS")]
    pub lock_timeout_ms: Option<u64>,

    /// Milliseconds between lock acquisition attempts.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Milliseconds after which a held lock is presumed abandoned.
    #[arg(long, value_name = "MS")]
    pub stale_timeout_ms: Option<u64>,

    /// Timeout for the whole HTTP request in seconds.
    #[arg(long, value_name = "SECS")]
    pub http_timeout_secs: Option<u64>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Lock subcommand wrapper.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Lock subcommand actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List lock files in a locks directory.
    List(LockListArgs),

    /// Remove the lock guarding a destination.
    Clear(LockClearArgs),
}

/// Arguments for `lock list`.
#[derive(Parser, Debug)]
pub struct LockListArgs {
    /// Locks directory to inspect.
    pub locks_dir: PathBuf,
}

/// Arguments for `lock clear`.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Destination whose lock should be removed.
    pub dest: PathBuf,

    /// Directory for lock files (default: `.locks` next to the destination).
    #[arg(long, value_name = "DIR")]
    pub locks_dir: Option<PathBuf>,

    /// Remove the lock even if its holder looks alive.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

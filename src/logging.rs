//! Logging setup for the oncefetch binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "ONCEFETCH_LOG";

/// Install a stderr subscriber.
///
/// `ONCEFETCH_LOG` takes precedence; otherwise verbosity picks the level
/// (0 = warn, 1 = debug, 2+ = trace).
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

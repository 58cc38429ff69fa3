//! Tests for config functionality.

use crate::config::Config;
use crate::download::DownloadOptions;
use crate::http::DEFAULT_USER_AGENT;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.lock_timeout_ms, 300_000);
    assert_eq!(config.poll_interval_ms, 100);
    assert_eq!(config.stale_timeout_ms, 600_000);
    assert_eq!(config.locks_dir, None);
    assert_eq!(config.http_timeout_secs, 300);
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
}

#[test]
fn test_default_config_matches_default_options() {
    assert_eq!(Config::default().download_options(), DownloadOptions::default());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
poll_interval_ms: 250
locks_dir: /var/lock/oncefetch
"#;
    let config = Config::from_yaml(yaml).unwrap();

    // Specified values should be used
    assert_eq!(config.poll_interval_ms, 250);
    assert_eq!(config.locks_dir, Some(PathBuf::from("/var/lock/oncefetch")));

    // Unspecified values should use defaults
    assert_eq!(config.lock_timeout_ms, 300_000);
    assert_eq!(config.stale_timeout_ms, 600_000);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
lock_timeout_ms: 1000
future_option: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.lock_timeout_ms, 1000);
}

#[test]
fn test_invalid_yaml_is_rejected() {
    let err = Config::from_yaml("lock_timeout_ms: [not, a, number]").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_validation_rejects_zero_values() {
    for yaml in [
        "poll_interval_ms: 0",
        "stale_timeout_ms: 0",
        "http_timeout_secs: 0",
        "user_agent: '  '",
    ] {
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(
            err.to_string().contains("config validation failed"),
            "{} should fail validation",
            yaml
        );
    }
}

#[test]
fn test_zero_lock_timeout_is_allowed() {
    let config = Config::from_yaml("lock_timeout_ms: 0").unwrap();
    assert_eq!(config.download_options().lock_timeout, Duration::ZERO);
}

#[test]
fn test_download_options_conversion() {
    let config = Config {
        lock_timeout_ms: 1_500,
        poll_interval_ms: 20,
        stale_timeout_ms: 60_000,
        locks_dir: Some(PathBuf::from("/tmp/locks")),
        ..Config::default()
    };

    let options = config.download_options();
    assert_eq!(options.lock_timeout, Duration::from_millis(1_500));
    assert_eq!(options.poll_interval, Duration::from_millis(20));
    assert_eq!(options.stale_timeout, Duration::from_secs(60));
    assert_eq!(options.locks_dir, Some(PathBuf::from("/tmp/locks")));
}

#[test]
fn test_yaml_round_trip() {
    let config = Config {
        poll_interval_ms: 42,
        ..Config::default()
    };
    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("oncefetch.yaml");
    std::fs::write(&path, "stale_timeout_ms: 5000\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.stale_timeout_ms, 5000);

    let err = Config::load(temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_http_client_uses_configured_timeout() {
    let config = Config {
        http_timeout_secs: 12,
        ..Config::default()
    };
    let client = config.http_client().unwrap();
    assert_eq!(client.timeout(), Duration::from_secs(12));
}

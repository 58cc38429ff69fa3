//! Config loading, validation, and conversion.

use super::model::Config;
use crate::download::DownloadOptions;
use crate::error::{FetchError, Result};
use crate::http::ReqwestClient;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(FetchError::UserError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            FetchError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| FetchError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            FetchError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `poll_interval_ms` must be positive
    /// - `stale_timeout_ms` must be positive
    /// - `http_timeout_secs` must be positive
    /// - `user_agent` must be non-empty
    ///
    /// A zero `lock_timeout_ms` is allowed: it means "check once, then give up".
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms must be greater than 0"));
        }

        if self.stale_timeout_ms == 0 {
            return Err(invalid("stale_timeout_ms must be greater than 0"));
        }

        if self.http_timeout_secs == 0 {
            return Err(invalid("http_timeout_secs must be greater than 0"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent must be non-empty"));
        }

        Ok(())
    }

    /// Download options described by this config.
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            locks_dir: self.locks_dir.clone(),
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            stale_timeout: Duration::from_millis(self.stale_timeout_ms),
        }
    }

    /// HTTP client described by this config.
    pub fn http_client(&self) -> Result<ReqwestClient> {
        ReqwestClient::with_settings(Duration::from_secs(self.http_timeout_secs), &self.user_agent)
    }
}

fn invalid(reason: &str) -> FetchError {
    FetchError::UserError(format!("config validation failed: {}", reason))
}

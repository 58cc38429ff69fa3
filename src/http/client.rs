//! reqwest-backed HTTP client.

use super::{HttpClient, HttpResponse};
use crate::error::{FetchError, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

/// Default timeout for a whole request, body included, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("oncefetch/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client built on reqwest.
///
/// Redirects follow reqwest's default policy. The timeout bounds the whole
/// fetch; the lock protocol itself never cancels a fetch in progress.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Create a client with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        Self::with_settings(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Create a client with a custom timeout and user agent.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::UserError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url) -> Result<HttpResponse> {
        let response = self.client.get(url.clone()).send().map_err(|e| {
            FetchError::DownloadFailed(format!("request to {} failed: {}", url, e))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(HttpResponse {
            status,
            headers,
            body: Box::new(response),
        })
    }
}

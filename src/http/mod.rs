//! HTTP collaborator used to obtain bytes.
//!
//! The download protocol only needs a GET that yields a status, headers, and
//! a body stream. [`HttpClient`] is that seam; [`ReqwestClient`] is the
//! production implementation.

mod client;

pub use client::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ReqwestClient};

use crate::error::Result;
use std::io::Read;
use url::Url;

/// Response to a GET request with an unread body.
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,

    /// Response headers as (lowercase name, value) pairs.
    pub headers: Vec<(String, String)>,

    /// Body stream.
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Performs GET requests.
///
/// Transport failures (connection refused, DNS, timeouts) are returned as
/// [`crate::error::FetchError::DownloadFailed`]. Non-2xx statuses are *not*
/// errors at this layer; callers inspect [`HttpResponse::status`].
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &Url) -> Result<HttpResponse>;
}

//! Outbound HTTP fetching.
//!
//! `Fetcher` performs a GET against whatever URL it is handed. There is no
//! scheme or host allow-list and loopback/private ranges are reachable; that
//! is the SSRF exercise. The only guard is the request timeout.

use std::time::Duration;

use thiserror::Error;

use crate::{Result, constants::FETCH_TIMEOUT};

/// Errors from outbound requests.
///
/// Messages embed the underlying error text verbatim; the HTTP layer shows
/// them to the requester.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    /// The URL could not be parsed
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// Connecting, sending or reading the response failed
    #[error("{source}")]
    Transport { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Check if the request ran out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Get the URL associated with this error, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::InvalidUrl { url, .. } | FetchError::Transport { url, .. } => Some(url),
            FetchError::ClientBuild { .. } => None,
        }
    }
}

// Conversion from FetchError to the main Error type
impl From<FetchError> for crate::Error {
    fn from(err: FetchError) -> Self {
        crate::Error::Fetch(err)
    }
}

/// Response of a completed fetch, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client for user supplied URLs.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with the default five second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// GET `url` and return the status and body text.
    ///
    /// Non-2xx responses are returned as-is, not as errors.
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let parsed = url::Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        tracing::info!(host = ?parsed.host_str(), "Fetching {url}");
        let response = self.client.get(parsed).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        Ok(FetchResponse { status, body })
    }
}

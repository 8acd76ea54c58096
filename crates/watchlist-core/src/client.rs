//! HTTP client for the wiki
//!
//! This module provides the client used to download the timeline page and
//! episode detail pages. Detail fetches wait a fixed delay before each
//! request; the delay is local to the calling task, not a shared limiter.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use tokio::time::sleep;

use crate::error::{Result, WatchlistError};

/// Default User-Agent mimicking a modern browser
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default Accept-Language header for English wiki content
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Configuration for the wiki HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Delay before each throttled request in milliseconds (default: 1000)
    pub request_delay_ms: u64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// HTTP client for wiki pages
///
/// Non-success responses become [`WatchlistError::Status`]; nothing is
/// retried.
#[derive(Debug, Clone)]
pub struct WatchlistClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Delay applied by [`WatchlistClient::fetch_throttled`]
    request_delay: Duration,
}

impl WatchlistClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Fetch HTML content from an absolute URL
    ///
    /// # Errors
    /// - `WatchlistError::InvalidUrl` - URL is not http(s)
    /// - `WatchlistError::HttpError` - Network error
    /// - `WatchlistError::Status` - Server answered with a non-success status
    pub async fn fetch(&self, url: &str) -> Result<String> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(WatchlistError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchlistError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Wait the configured delay, then fetch `url`
    pub async fn fetch_throttled(&self, url: &str) -> Result<String> {
        if !self.request_delay.is_zero() {
            sleep(self.request_delay).await;
        }
        self.fetch(url).await
    }

    /// Delay applied before each throttled request
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }
}

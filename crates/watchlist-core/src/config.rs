//! Scraper configuration
//!
//! Read from a TOML file; every key is optional and falls back to its default.
//!
//! ```toml
//! base_url = "https://starwars.fandom.com"
//! source_path = "/wiki/Timeline_of_canon_media"
//! request_delay_ms = 1000
//! max_concurrent_requests = 8
//! timeout_secs = 30
//! store_path = "watchlist.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::client::ClientConfig;
use crate::error::{Result, WatchlistError};

/// Default wiki origin
pub const DEFAULT_BASE_URL: &str = "https://starwars.fandom.com";

/// Default path of the timeline page on the wiki
pub const DEFAULT_SOURCE_PATH: &str = "/wiki/Timeline_of_canon_media";

/// Default number of detail pages fetched at once
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Top-level scraper configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Origin prepended to site-relative links
    pub base_url: String,
    /// Path of the timeline page
    pub source_path: String,
    /// Delay before each detail request in milliseconds
    pub request_delay_ms: u64,
    /// Upper bound on detail requests in flight
    pub max_concurrent_requests: usize,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent override
    pub user_agent: Option<String>,
    /// JSON file holding the records
    pub store_path: PathBuf,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            source_path: DEFAULT_SOURCE_PATH.to_string(),
            request_delay_ms: client.request_delay_ms,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            timeout_secs: client.timeout_secs,
            user_agent: None,
            store_path: PathBuf::from("watchlist.json"),
        }
    }
}

impl ScraperConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds inconsistent values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value consistency.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(WatchlistError::InvalidUrl(self.base_url.clone()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(WatchlistError::Config(
                "max_concurrent_requests must be positive".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(WatchlistError::Config(
                "timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute URL of the timeline page.
    pub fn source_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.source_path.trim_start_matches('/')
        )
    }

    /// HTTP client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig {
            request_delay_ms: self.request_delay_ms,
            timeout_secs: self.timeout_secs,
            ..ClientConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            client.user_agent.clone_from(user_agent);
        }
        client
    }
}

//! Error types for the watchlist scraper
//!
//! Extraction problems never surface here: malformed rows and missing cells
//! degrade to empty fields. What remains are transport, store and
//! configuration failures. WatchlistError implements Serialize so front ends
//! can hand it to JSON consumers as a plain message.

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::RecordId;

/// Error type for watchlist operations
#[derive(Error, Debug)]
pub enum WatchlistError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Record store could not complete a read or write
    #[error("Record store error: {0}")]
    Store(String),

    /// No record with this id exists
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored records could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file is not valid TOML
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Serialize WatchlistError as its display string
impl Serialize for WatchlistError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for watchlist operations
pub type Result<T> = std::result::Result<T, WatchlistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_status() {
        let error = WatchlistError::Status {
            url: "https://starwars.fandom.com/wiki/Rookies".to_string(),
            status: 404,
        };
        assert_eq!(
            error.to_string(),
            "Request to https://starwars.fandom.com/wiki/Rookies failed with status 404"
        );
    }

    #[test]
    fn test_error_display_invalid_url() {
        let error = WatchlistError::InvalidUrl("not-a-url".to_string());
        assert_eq!(error.to_string(), "Invalid URL: not-a-url");
    }

    #[test]
    fn test_error_display_store() {
        let error = WatchlistError::Store("lock poisoned".to_string());
        assert_eq!(error.to_string(), "Record store error: lock poisoned");
    }

    #[test]
    fn test_error_display_record_not_found() {
        let error = WatchlistError::RecordNotFound(RecordId(42));
        assert_eq!(error.to_string(), "Record not found: 42");
    }

    #[test]
    fn test_error_display_config() {
        let error = WatchlistError::Config("max_concurrent_requests must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: max_concurrent_requests must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let error: WatchlistError = io.into();
        assert!(error.to_string().starts_with("I/O error:"));
        assert!(error.to_string().contains("missing.json"));
    }

    #[test]
    fn test_error_serialize() {
        let error = WatchlistError::InvalidUrl("ftp://x".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, "\"Invalid URL: ftp://x\"");
    }

    #[test]
    fn test_error_serialize_record_not_found() {
        let error = WatchlistError::RecordNotFound(RecordId(7));
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, "\"Record not found: 7\"");
    }
}

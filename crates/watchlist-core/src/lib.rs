//! Canon Watchlist Core Library
//!
//! This crate turns a wiki timeline of media releases into a stable set of
//! typed records and keeps them up to date across re-scrapes.
//!
//! # Features
//! - Locate timeline tables and extract one candidate record per row
//! - Reconcile candidates with stored records by natural key, never touching
//!   the user's watched flag
//! - Enrich TV episodes with season/episode codes from their detail pages,
//!   concurrently and with a per-request delay
//! - JSON-file-backed record store with filtering and chronological ordering

pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod parser;
pub mod reconcile;
pub mod scraper;
pub mod store;
pub mod types;
pub mod year;

// Re-export main types for convenience
pub use client::{ClientConfig, WatchlistClient};
pub use config::ScraperConfig;
pub use enrich::{DetailEnricher, EnrichOutcome, EnrichReport};
pub use error::{Result, WatchlistError};
pub use reconcile::{Reconciler, Reconciliation, ScrapeReport};
pub use scraper::WatchlistScraper;
pub use store::{MemoryStore, RecordFilter, RecordStore};
pub use types::{CandidateRecord, MediaRecord, NaturalKey, RecordId, RecordUpdate};

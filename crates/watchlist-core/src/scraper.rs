//! Main watchlist scraper API
//!
//! This module ties the parsers, the reconciler and the enricher to a record
//! store handed in by the caller. Table scraping is synchronous; only page
//! downloads and detail enrichment are async.

use std::sync::Arc;

use crate::client::WatchlistClient;
use crate::config::ScraperConfig;
use crate::enrich::{DetailEnricher, EnrichReport};
use crate::error::{Result, WatchlistError};
use crate::parser::parse_media_table;
use crate::reconcile::{Reconciler, ScrapeReport};
use crate::store::{RecordFilter, RecordStore};
use crate::types::{MediaRecord, RecordId, RecordUpdate};

/// Main scraper API for the canon media watchlist
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use watchlist_core::{MemoryStore, ScraperConfig, WatchlistScraper};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(MemoryStore::open("watchlist.json")?);
///     let scraper = WatchlistScraper::new(ScraperConfig::default(), store)?;
///
///     let report = scraper.scrape_url(None).await?;
///     println!("{} new records", report.inserted);
///
///     scraper.enrich().await?;
///     Ok(())
/// }
/// ```
pub struct WatchlistScraper<S: RecordStore + 'static> {
    client: Arc<WatchlistClient>,
    store: Arc<S>,
    config: ScraperConfig,
}

impl<S: RecordStore + 'static> WatchlistScraper<S> {
    /// Create a scraper with a client built from `config`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ScraperConfig, store: Arc<S>) -> Result<Self> {
        config.validate()?;
        let client = WatchlistClient::with_config(config.client_config())?;
        Ok(Self::with_client(client, store, config))
    }

    /// Create a scraper with a pre-configured client.
    pub fn with_client(client: WatchlistClient, store: Arc<S>, config: ScraperConfig) -> Self {
        Self {
            client: Arc::new(client),
            store,
            config,
        }
    }

    /// The record store this scraper writes to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Extract and reconcile every row of the timeline tables in `html`.
    ///
    /// The rows are written as one store batch. A failure part-way still
    /// commits the rows reconciled before it.
    ///
    /// # Errors
    /// Only store failures are returned; unusable rows are skipped.
    pub fn scrape_html(&self, html: &str) -> Result<ScrapeReport> {
        let candidates = parse_media_table(html, &self.config.base_url);
        tracing::debug!("Extracted {} candidate rows", candidates.len());

        let mut reconciler = Reconciler::new(self.store.as_ref())?;
        reconciler.reconcile_all(candidates)?;

        let report = reconciler.finish();
        tracing::info!(
            "Scraped {} rows: {} inserted, {} matched ({} changed)",
            report.rows,
            report.inserted,
            report.updated,
            report.changed
        );
        Ok(report)
    }

    /// Download the timeline page and scrape it.
    ///
    /// # Arguments
    /// * `url` - Page to fetch; the configured source page when `None`
    pub async fn scrape_url(&self, url: Option<&str>) -> Result<ScrapeReport> {
        let url = url.map_or_else(|| self.config.source_url(), str::to_string);
        tracing::info!("Fetching timeline from {}", url);
        let html = self.client.fetch(&url).await?;
        self.scrape_html(&html)
    }

    /// Fill season/episode codes from episode detail pages.
    pub async fn enrich(&self) -> Result<EnrichReport> {
        DetailEnricher::with_workers(
            self.client.clone(),
            self.store.clone(),
            self.config.max_concurrent_requests,
        )
        .run()
        .await
    }

    /// Records passing `filter`, ordered by id.
    pub fn records(&self, filter: &RecordFilter) -> Result<Vec<MediaRecord>> {
        Ok(filter.apply(self.store.list()?))
    }

    /// Set the watched flag of one record.
    ///
    /// # Errors
    /// `WatchlistError::RecordNotFound` if no record has this id.
    pub fn set_watched(&self, id: RecordId, watched: bool) -> Result<MediaRecord> {
        self.store.update(id, &RecordUpdate::watched(watched))?;
        self.store
            .get(id)?
            .ok_or(WatchlistError::RecordNotFound(id))
    }
}

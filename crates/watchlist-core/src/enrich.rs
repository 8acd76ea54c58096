//! Season/episode enrichment from episode detail pages
//!
//! One task per TV record with an episode link. Each task waits the client's
//! request delay, fetches the page, and writes the codes it finds back to its
//! own record by id. A semaphore caps how many tasks are in flight. Fetch
//! failures only affect their own record.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;

use crate::client::WatchlistClient;
use crate::config::DEFAULT_MAX_CONCURRENT_REQUESTS;
use crate::error::Result;
use crate::parser::parse_episode_info;
use crate::store::RecordStore;
use crate::types::{MediaRecord, RecordId, RecordUpdate};

/// What happened to one record during enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Season and/or episode were written
    Updated {
        season: Option<String>,
        episode: Option<String>,
    },
    /// Page fetched, nothing recognizable on it
    NoMatch,
    /// Page could not be fetched
    Failed(String),
}

/// Summary of an enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichReport {
    /// Records with a TV type and an episode link
    pub eligible: usize,
    /// Records that received season/episode codes
    pub updated: usize,
    /// Pages with no recognizable codes
    pub unmatched: usize,
    /// Pages that could not be fetched
    pub failed: usize,
}

/// Concurrent detail-page enricher
pub struct DetailEnricher<S: RecordStore + 'static> {
    client: Arc<WatchlistClient>,
    store: Arc<S>,
    semaphore: Arc<Semaphore>,
}

impl<S: RecordStore + 'static> DetailEnricher<S> {
    /// Create an enricher with the default concurrency cap.
    pub fn new(client: Arc<WatchlistClient>, store: Arc<S>) -> Self {
        Self::with_workers(client, store, DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    /// Create an enricher allowing `workers` requests in flight.
    pub fn with_workers(client: Arc<WatchlistClient>, store: Arc<S>, workers: usize) -> Self {
        Self {
            client,
            store,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Enrich every eligible record.
    ///
    /// All tasks run to completion before this returns.
    ///
    /// # Errors
    /// Returns the first store failure, if any task hit one. Fetch failures
    /// are counted in the report instead.
    pub async fn run(&self) -> Result<EnrichReport> {
        let eligible: Vec<MediaRecord> = self
            .store
            .list()?
            .into_iter()
            .filter(MediaRecord::is_enrichable)
            .collect();

        let mut report = EnrichReport {
            eligible: eligible.len(),
            ..EnrichReport::default()
        };

        self.store.begin_batch()?;
        let mut handles = Vec::with_capacity(eligible.len());
        for record in eligible {
            let client = self.client.clone();
            let store = self.store.clone();
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return Ok(EnrichOutcome::Failed("worker pool closed".to_string()));
                };
                enrich_record(&client, store.as_ref(), &record).await
            }));
        }

        let mut first_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(EnrichOutcome::Updated { .. })) => report.updated += 1,
                Ok(Ok(EnrichOutcome::NoMatch)) => report.unmatched += 1,
                Ok(Ok(EnrichOutcome::Failed(_))) => report.failed += 1,
                Ok(Err(e)) => {
                    tracing::error!("Store write failed during enrichment: {}", e);
                    report.failed += 1;
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    report.failed += 1;
                }
            }
        }

        let committed = self.store.commit_batch();
        if let Some(e) = first_error {
            return Err(e);
        }
        committed?;

        tracing::info!(
            "Enriched {} of {} records ({} unmatched, {} failed)",
            report.updated,
            report.eligible,
            report.unmatched,
            report.failed
        );
        Ok(report)
    }
}

/// Fetch one record's detail page and store what it yields.
///
/// # Errors
/// Only store failures; fetch problems come back as [`EnrichOutcome::Failed`].
pub async fn enrich_record<S: RecordStore + ?Sized>(
    client: &WatchlistClient,
    store: &S,
    record: &MediaRecord,
) -> Result<EnrichOutcome> {
    let Some(url) = record.episode_url.as_deref() else {
        return Ok(EnrichOutcome::NoMatch);
    };

    let html = match client.fetch_throttled(url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Failed to fetch {} for record {}: {}", url, record.id, e);
            return Ok(EnrichOutcome::Failed(e.to_string()));
        }
    };

    let info = parse_episode_info(&html);
    tracing::info!(
        "Entry {}: season={:?}, episode={:?}, url={}",
        record.id,
        info.season,
        info.episode,
        url
    );
    if info.is_empty() {
        return Ok(EnrichOutcome::NoMatch);
    }

    write_codes(store, record.id, info.season.clone(), info.episode.clone())?;
    Ok(EnrichOutcome::Updated {
        season: info.season,
        episode: info.episode,
    })
}

fn write_codes<S: RecordStore + ?Sized>(
    store: &S,
    id: RecordId,
    season: Option<String>,
    episode: Option<String>,
) -> Result<()> {
    let update = RecordUpdate {
        season,
        episode,
        ..RecordUpdate::default()
    };
    store.update(id, &update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::store::MemoryStore;
    use crate::types::CandidateRecord;

    fn client() -> Arc<WatchlistClient> {
        Arc::new(
            WatchlistClient::with_config(ClientConfig {
                request_delay_ms: 0,
                timeout_secs: 5,
                ..ClientConfig::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_no_eligible_records() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(CandidateRecord {
                content_type: Some("N".to_string()),
                title: Some("Lost Stars".to_string()),
                episode_url: Some("http://127.0.0.1:9/never".to_string()),
                ..CandidateRecord::default()
            })
            .unwrap();

        let report = DetailEnricher::new(client(), store).run().await.unwrap();
        assert_eq!(report, EnrichReport::default());
    }

    #[tokio::test]
    async fn test_invalid_url_counts_as_failed() {
        let store = Arc::new(MemoryStore::new());
        let id = store
            .insert(CandidateRecord {
                content_type: Some("TV".to_string()),
                title: Some("Andor".to_string()),
                episode_url: Some("wiki/Kassa".to_string()),
                ..CandidateRecord::default()
            })
            .unwrap();

        let report = DetailEnricher::new(client(), store.clone()).run().await.unwrap();
        assert_eq!(report.eligible, 1);
        assert_eq!(report.failed, 1);

        let record = store.get(id).unwrap().unwrap();
        assert!(record.season.is_empty());
        assert!(record.episode.is_empty());
    }
}

//! Keyed record store
//!
//! The scrape path uses `list`, `find_by_natural_key`, `insert` and `update`;
//! the enricher uses `list` and `update`. Front ends toggle `watched` through
//! `update` as well. Implementations serialize their own writes.
//!
//! Bulk writers bracket their work with `begin_batch`/`commit_batch` so a
//! persisting store can write once per run instead of once per record.

pub mod memory;

pub use memory::MemoryStore;

use std::cmp::Ordering;

use crate::error::Result;
use crate::types::{CandidateRecord, MediaRecord, NaturalKey, RecordId, RecordUpdate};
use crate::year::parse_year;

/// Storage for reconciled media records
pub trait RecordStore: Send + Sync {
    /// All records, ordered by id.
    fn list(&self) -> Result<Vec<MediaRecord>>;

    /// Record whose natural key equals `key`.
    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<MediaRecord>>;

    /// Insert a new record with `watched = false`, returning its fresh id.
    fn insert(&self, candidate: CandidateRecord) -> Result<RecordId>;

    /// Apply a partial update to the record with `id`.
    ///
    /// Fails with `RecordNotFound` when no such record exists.
    fn update(&self, id: RecordId, update: &RecordUpdate) -> Result<()>;

    /// Record with `id`, if any.
    fn get(&self, id: RecordId) -> Result<Option<MediaRecord>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Start a batch of writes. Writes stay visible to readers immediately.
    fn begin_batch(&self) -> Result<()> {
        Ok(())
    }

    /// End the current batch, making its writes durable.
    fn commit_batch(&self) -> Result<()> {
        Ok(())
    }
}

/// Listing filter offered to front ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Keep only these content types; empty keeps all
    pub content_types: Vec<String>,
    /// Keep only records with this watched state
    pub watched: Option<bool>,
    /// Keep ids strictly greater than this
    pub id_gt: Option<u64>,
    /// Keep ids strictly less than this
    pub id_lt: Option<u64>,
}

impl RecordFilter {
    /// Returns true when `record` passes every configured condition.
    pub fn matches(&self, record: &MediaRecord) -> bool {
        let type_ok = self.content_types.is_empty()
            || record
                .content_type
                .as_ref()
                .is_some_and(|t| self.content_types.contains(t));
        let watched_ok = self.watched.map_or(true, |w| record.watched == w);
        let gt_ok = self.id_gt.map_or(true, |gt| record.id.0 > gt);
        let lt_ok = self.id_lt.map_or(true, |lt| record.id.0 < lt);

        type_ok && watched_ok && gt_ok && lt_ok
    }

    /// Keep the records that match.
    pub fn apply(&self, records: Vec<MediaRecord>) -> Vec<MediaRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct content types present in `records`, sorted.
pub fn content_types(records: &[MediaRecord]) -> Vec<String> {
    let mut types: Vec<String> = records
        .iter()
        .filter_map(|r| r.content_type.clone())
        .collect();
    types.sort();
    types.dedup();
    types
}

/// Order records by in-universe year, earliest first.
///
/// Records without a parseable year go last; ties keep their id order.
pub fn sort_chronologically(records: &mut [MediaRecord]) {
    records.sort_by(|a, b| {
        let ya = a.year.as_deref().and_then(parse_year);
        let yb = b.year.as_deref().and_then(parse_year);
        match (ya, yb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, year: Option<&str>, content_type: &str, watched: bool) -> MediaRecord {
        let mut record = MediaRecord::from_candidate(
            RecordId(id),
            CandidateRecord {
                year: year.map(str::to_string),
                content_type: Some(content_type.to_string()),
                title: Some(format!("Work {}", id)),
                ..CandidateRecord::default()
            },
        );
        record.watched = watched;
        record
    }

    fn sample() -> Vec<MediaRecord> {
        vec![
            record(1, Some("19 BBY"), "TV", false),
            record(2, Some("382 BBY"), "N", true),
            record(3, None, "C", false),
            record(4, Some("4 ABY"), "TV", true),
        ]
    }

    #[test]
    fn test_filter_by_type_and_watched() {
        let filter = RecordFilter {
            content_types: vec!["TV".to_string()],
            watched: Some(true),
            ..RecordFilter::default()
        };
        let ids: Vec<u64> = filter.apply(sample()).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![4]);
    }

    #[test]
    fn test_filter_by_id_range() {
        let filter = RecordFilter {
            id_gt: Some(1),
            id_lt: Some(4),
            ..RecordFilter::default()
        };
        let ids: Vec<u64> = filter.apply(sample()).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        assert_eq!(RecordFilter::default().apply(sample()).len(), 4);
    }

    #[test]
    fn test_content_types_sorted_unique() {
        assert_eq!(content_types(&sample()), vec!["C", "N", "TV"]);
    }

    #[test]
    fn test_sort_chronologically() {
        let mut records = sample();
        sort_chronologically(&mut records);
        let ids: Vec<u64> = records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 1, 4, 3]);
    }
}

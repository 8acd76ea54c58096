//! Merge-or-insert reconciliation of scraped candidates
//!
//! A candidate is matched against stored records by its natural key
//! (year, type, title, episode title, released). On a hit the stored record
//! takes every non-null candidate field; `watched` is never touched. On a miss
//! a new record is inserted.
//!
//! Rows whose title could not be extracted share a `None` title, so untitled
//! rows with identical year/type/released collapse into one record.
//!
//! When the exact key misses but the candidate is titled, a looser match is
//! tried so that a corrected release date or year keeps the record (and its
//! watched flag): same type and title, compatible episode title, and not
//! already matched during this run. It only applies when exactly one stored
//! record qualifies.
//!
//! A run works in two passes. Every exact-key hit is claimed first, so a new
//! same-titled row earlier on the page can never take over a record that a
//! later, unchanged row still names exactly.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::store::RecordStore;
use crate::types::{CandidateRecord, MediaRecord, RecordId};

/// Outcome of reconciling one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// An existing record was matched and merged
    Updated(RecordId),
    /// A new record was created
    Inserted(RecordId),
}

impl Reconciliation {
    /// Id of the affected record.
    pub fn id(self) -> RecordId {
        match self {
            Self::Updated(id) | Self::Inserted(id) => id,
        }
    }
}

/// Summary of a table scrape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReport {
    /// Candidates reconciled
    pub rows: usize,
    /// New records
    pub inserted: usize,
    /// Existing records matched
    pub updated: usize,
    /// Matched records whose stored values actually changed
    pub changed: usize,
}

type TitleKey = (Option<String>, String);

/// Run-scoped reconciler over a record store
pub struct Reconciler<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    /// Records present before the run, grouped by (type, title)
    previous: HashMap<TitleKey, Vec<MediaRecord>>,
    /// Ids already matched or inserted during this run
    claimed: HashSet<RecordId>,
    report: ScrapeReport,
}

impl<'s, S: RecordStore + ?Sized> Reconciler<'s, S> {
    /// Start a reconciliation run.
    ///
    /// # Errors
    /// Returns an error if the store cannot be listed.
    pub fn new(store: &'s S) -> Result<Self> {
        let mut previous: HashMap<TitleKey, Vec<MediaRecord>> = HashMap::new();
        for record in store.list()? {
            if let Some(title) = record.title.clone() {
                previous
                    .entry((record.content_type.clone(), title))
                    .or_default()
                    .push(record);
            }
        }

        Ok(Self {
            store,
            previous,
            claimed: HashSet::new(),
            report: ScrapeReport::default(),
        })
    }

    /// Reconcile a page worth of candidates, in page order.
    ///
    /// The store sees the writes as one batch; rows reconciled before a
    /// failure are still committed.
    ///
    /// # Errors
    /// Only store failures are returned.
    pub fn reconcile_all(
        &mut self,
        candidates: Vec<CandidateRecord>,
    ) -> Result<Vec<Reconciliation>> {
        self.store.begin_batch()?;
        let outcomes = self.reconcile_in_passes(candidates);
        let committed = self.store.commit_batch();
        let outcomes = outcomes?;
        committed?;
        Ok(outcomes)
    }

    /// Finish the run and return its summary.
    pub fn finish(self) -> ScrapeReport {
        self.report
    }

    fn reconcile_in_passes(
        &mut self,
        candidates: Vec<CandidateRecord>,
    ) -> Result<Vec<Reconciliation>> {
        for candidate in &candidates {
            if let Some(record) = self.store.find_by_natural_key(&candidate.natural_key())? {
                self.claimed.insert(record.id);
            }
        }

        candidates
            .into_iter()
            .map(|candidate| self.reconcile(candidate))
            .collect()
    }

    fn reconcile(&mut self, candidate: CandidateRecord) -> Result<Reconciliation> {
        self.report.rows += 1;

        let existing = match self.store.find_by_natural_key(&candidate.natural_key())? {
            Some(record) => Some(record),
            None => self.loose_match(&candidate),
        };

        let outcome = match existing {
            Some(mut record) => {
                let update = candidate.to_update();
                if record.apply(&update) {
                    self.store.update(record.id, &update)?;
                    self.report.changed += 1;
                }
                self.report.updated += 1;
                tracing::debug!("Matched record {} ({:?})", record.id, record.title);
                Reconciliation::Updated(record.id)
            }
            None => {
                let title = candidate.title.clone();
                let id = self.store.insert(candidate)?;
                self.report.inserted += 1;
                tracing::debug!("Inserted record {} ({:?})", id, title);
                Reconciliation::Inserted(id)
            }
        };

        self.claimed.insert(outcome.id());
        Ok(outcome)
    }

    fn loose_match(&self, candidate: &CandidateRecord) -> Option<MediaRecord> {
        let title = candidate.title.clone()?;
        let group = self.previous.get(&(candidate.content_type.clone(), title))?;

        let mut matches = group.iter().filter(|record| {
            !self.claimed.contains(&record.id)
                && (candidate.episode_title.is_none()
                    || candidate.episode_title == record.episode_title)
        });

        let only = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(only.clone())
    }
}

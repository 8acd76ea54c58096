//! In-memory record store with optional JSON file persistence
//!
//! When opened on a path, every successful write rewrites the file
//! (temp file + rename). A write whose file update fails is rolled back in
//! memory. Inside a batch the file is written once, on commit.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchlistError};
use crate::types::{CandidateRecord, MediaRecord, NaturalKey, RecordId, RecordUpdate};

use super::RecordStore;

/// On-disk layout; `next_id` keeps ids from being reused
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    next_id: u64,
    records: Vec<MediaRecord>,
}

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<RecordId, MediaRecord>,
    by_key: HashMap<NaturalKey, RecordId>,
    next_id: u64,
    batch_depth: usize,
    /// Memory holds writes the file does not have yet
    dirty: bool,
}

impl StoreState {
    fn from_file(file: StoreFile) -> Self {
        let mut state = Self::default();
        let max_id = file.records.iter().map(|r| r.id.0).max().unwrap_or(0);
        state.next_id = file.next_id.max(max_id + 1).max(1);
        for record in file.records {
            state.index(&record);
            state.records.insert(record.id, record);
        }
        state
    }

    fn to_file(&self) -> StoreFile {
        StoreFile {
            next_id: self.next_id,
            records: self.records.values().cloned().collect(),
        }
    }

    // First record seen for a key owns it, matching lookup-by-key semantics.
    fn index(&mut self, record: &MediaRecord) {
        self.by_key.entry(record.natural_key()).or_insert(record.id);
    }

    fn unindex(&mut self, record: &MediaRecord) {
        let key = record.natural_key();
        if self.by_key.get(&key) == Some(&record.id) {
            self.by_key.remove(&key);
        }
    }

    fn replace(&mut self, record: MediaRecord) {
        if let Some(old) = self.records.remove(&record.id) {
            self.unindex(&old);
        }
        self.index(&record);
        self.records.insert(record.id, record);
    }
}

/// Thread-safe record store backed by memory and, optionally, a JSON file
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, purely in-memory store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                next_id: 1,
                ..StoreState::default()
            }),
            path: None,
        }
    }

    /// Open a store persisted at `path`, loading it if the file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&content)?;
            tracing::debug!("Loaded {} records from {}", file.records.len(), path.display());
            StoreState::from_file(file)
        } else {
            StoreState {
                next_id: 1,
                ..StoreState::default()
            }
        };

        Ok(Self {
            state: RwLock::new(state),
            path: Some(path),
        })
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|e| WatchlistError::Store(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| WatchlistError::Store(e.to_string()))
    }

    fn sync(&self, state: &mut StoreState) -> Result<()> {
        if state.batch_depth > 0 {
            state.dirty = true;
            return Ok(());
        }
        self.persist(state)?;
        state.dirty = false;
        Ok(())
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&state.to_file())?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn list(&self) -> Result<Vec<MediaRecord>> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<MediaRecord>> {
        let state = self.read()?;
        Ok(state
            .by_key
            .get(key)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    fn insert(&self, candidate: CandidateRecord) -> Result<RecordId> {
        let mut state = self.write()?;
        let id = RecordId(state.next_id);
        state.next_id += 1;
        state.replace(MediaRecord::from_candidate(id, candidate));

        // the id stays consumed even when the write is rolled back
        if let Err(e) = self.sync(&mut state) {
            if let Some(record) = state.records.remove(&id) {
                state.unindex(&record);
            }
            return Err(e);
        }
        Ok(id)
    }

    fn update(&self, id: RecordId, update: &RecordUpdate) -> Result<()> {
        let mut state = self.write()?;
        let previous = state
            .records
            .get(&id)
            .cloned()
            .ok_or(WatchlistError::RecordNotFound(id))?;

        let mut record = previous.clone();
        if !record.apply(update) {
            return Ok(());
        }
        state.replace(record);

        if let Err(e) = self.sync(&mut state) {
            state.replace(previous);
            return Err(e);
        }
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Option<MediaRecord>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn begin_batch(&self) -> Result<()> {
        self.write()?.batch_depth += 1;
        Ok(())
    }

    fn commit_batch(&self) -> Result<()> {
        let mut state = self.write()?;
        state.batch_depth = state.batch_depth.saturating_sub(1);
        if state.batch_depth == 0 && state.dirty {
            self.persist(&state)?;
            state.dirty = false;
        }
        Ok(())
    }
}

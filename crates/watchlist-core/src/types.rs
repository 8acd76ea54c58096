//! Data types for the watchlist scraper
//!
//! This module contains the record model shared by the extractor, the
//! reconciler, the enricher and the store. All types implement Serialize and
//! Deserialize with camelCase field names for JSON consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned record identifier, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A reconciled media release as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Unique identifier assigned on insert
    pub id: RecordId,
    /// Era-qualified year, e.g. "382 BBY"
    pub year: Option<String>,
    /// Display fragment of the year cell
    pub year_html: Option<String>,
    /// Category code, e.g. "TV", "N", "C"
    pub content_type: Option<String>,
    /// Display fragment of the type cell
    pub content_type_html: Option<String>,
    /// Work title
    pub title: Option<String>,
    /// Display fragment of the title cell
    pub title_html: Option<String>,
    /// Episode title when the title cell links both work and episode
    pub episode_title: Option<String>,
    /// Absolute link to the episode detail page
    pub episode_url: Option<String>,
    /// Release date as written in the table
    pub released: Option<String>,
    /// Display fragment of the released cell
    pub released_html: Option<String>,
    /// Season code such as "S01", empty until enriched
    #[serde(default)]
    pub season: String,
    /// Episode code such as "E03", empty until enriched
    #[serde(default)]
    pub episode: String,
    /// User state, never written by scraping
    #[serde(default)]
    pub watched: bool,
}

impl MediaRecord {
    /// Build a freshly inserted record from a candidate.
    pub fn from_candidate(id: RecordId, candidate: CandidateRecord) -> Self {
        Self {
            id,
            year: candidate.year,
            year_html: candidate.year_html,
            content_type: candidate.content_type,
            content_type_html: candidate.content_type_html,
            title: candidate.title,
            title_html: candidate.title_html,
            episode_title: candidate.episode_title,
            episode_url: candidate.episode_url,
            released: candidate.released,
            released_html: candidate.released_html,
            season: String::new(),
            episode: String::new(),
            watched: false,
        }
    }

    /// Natural identity of this record.
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            year: self.year.clone(),
            content_type: self.content_type.clone(),
            title: self.title.clone(),
            episode_title: self.episode_title.clone(),
            released: self.released.clone(),
        }
    }

    /// Whether the detail enricher should visit this record.
    pub fn is_enrichable(&self) -> bool {
        self.content_type.as_deref() == Some("TV") && self.episode_url.is_some()
    }

    /// Apply every populated field of `update`.
    ///
    /// Returns true when any stored value changed.
    pub fn apply(&mut self, update: &RecordUpdate) -> bool {
        let before = self.clone();

        overwrite(&mut self.year, &update.year);
        overwrite(&mut self.year_html, &update.year_html);
        overwrite(&mut self.content_type, &update.content_type);
        overwrite(&mut self.content_type_html, &update.content_type_html);
        overwrite(&mut self.title, &update.title);
        overwrite(&mut self.title_html, &update.title_html);
        overwrite(&mut self.episode_title, &update.episode_title);
        overwrite(&mut self.episode_url, &update.episode_url);
        overwrite(&mut self.released, &update.released);
        overwrite(&mut self.released_html, &update.released_html);
        if let Some(season) = &update.season {
            self.season.clone_from(season);
        }
        if let Some(episode) = &update.episode {
            self.episode.clone_from(episode);
        }
        if let Some(watched) = update.watched {
            self.watched = watched;
        }

        *self != before
    }
}

fn overwrite(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

/// A freshly extracted, not yet persisted record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub year: Option<String>,
    pub year_html: Option<String>,
    pub content_type: Option<String>,
    pub content_type_html: Option<String>,
    pub title: Option<String>,
    pub title_html: Option<String>,
    pub episode_title: Option<String>,
    pub episode_url: Option<String>,
    pub released: Option<String>,
    pub released_html: Option<String>,
}

impl CandidateRecord {
    /// Natural identity of this candidate.
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            year: self.year.clone(),
            content_type: self.content_type.clone(),
            title: self.title.clone(),
            episode_title: self.episode_title.clone(),
            released: self.released.clone(),
        }
    }

    /// Scrape-side update: every extracted field, never `watched`.
    pub fn to_update(&self) -> RecordUpdate {
        RecordUpdate {
            year: self.year.clone(),
            year_html: self.year_html.clone(),
            content_type: self.content_type.clone(),
            content_type_html: self.content_type_html.clone(),
            title: self.title.clone(),
            title_html: self.title_html.clone(),
            episode_title: self.episode_title.clone(),
            episode_url: self.episode_url.clone(),
            released: self.released.clone(),
            released_html: self.released_html.clone(),
            ..RecordUpdate::default()
        }
    }
}

/// Field tuple deciding whether two rows are the same real-world item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalKey {
    pub year: Option<String>,
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub episode_title: Option<String>,
    pub released: Option<String>,
}

/// Partial update addressed by record id
///
/// `None` leaves the stored value as it is, so an update can never reset a
/// populated field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUpdate {
    pub year: Option<String>,
    pub year_html: Option<String>,
    pub content_type: Option<String>,
    pub content_type_html: Option<String>,
    pub title: Option<String>,
    pub title_html: Option<String>,
    pub episode_title: Option<String>,
    pub episode_url: Option<String>,
    pub released: Option<String>,
    pub released_html: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub watched: Option<bool>,
}

impl RecordUpdate {
    /// Update that only flips the watched flag.
    pub fn watched(watched: bool) -> Self {
        Self {
            watched: Some(watched),
            ..Self::default()
        }
    }

    /// Returns true when the update would not touch any field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

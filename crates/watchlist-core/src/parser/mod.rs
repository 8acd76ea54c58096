//! HTML parsers for the wiki pages
//!
//! This module contains parsers for extracting data from wiki markup:
//! - `cell`: normalize a single table cell and absolutize its links
//! - `row`: turn a timeline row into a candidate record
//! - `table`: locate timeline tables and walk their data rows
//! - `detail`: recover season/episode codes from an episode page

pub mod cell;
pub mod detail;
pub mod row;
pub mod table;

// Re-export main parsing functions
pub use cell::{absolutize, normalize_cell, rewrite_links, stripped_text, NormalizedCell};
pub use detail::{
    normalize_episode, normalize_season, parse_episode_info, DetailStrategy, EpisodeInfo,
    Precedence, STRATEGY_ORDER,
};
pub use row::{extract_row, split_title_cell, TableRow, TitleParts};
pub use table::{is_media_table, media_rows, parse_media_table, REQUIRED_HEADERS};

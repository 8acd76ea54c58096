//! Media table locator
//!
//! Finds the timeline tables on a page and walks their data rows.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::CandidateRecord;

use super::row::{extract_row, TableRow};

static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));
static SELECTOR_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Invalid tr selector"));

/// Header texts a table must carry to be read
pub const REQUIRED_HEADERS: [&str; 3] = ["Year", "Title", "Released"];

/// Returns true when the first row of `table` names every required column.
///
/// Matching is exact and case-sensitive; column order does not matter.
pub fn is_media_table(table: ElementRef<'_>) -> bool {
    let Some(header) = table.select(&SELECTOR_TR).next() else {
        return false;
    };
    let texts = TableRow::from_element(header).texts();
    let headers: HashSet<&str> = texts.iter().map(String::as_str).collect();
    REQUIRED_HEADERS.iter().all(|h| headers.contains(h))
}

/// Data rows of every media table in `document`, in document order.
///
/// The first row of each matching table is the header and is never yielded.
pub fn media_rows(document: &Html) -> impl Iterator<Item = TableRow<'_>> + '_ {
    document
        .select(&SELECTOR_TABLE)
        .filter(|table| is_media_table(*table))
        .flat_map(|table| table.select(&SELECTOR_TR).skip(1))
        .map(TableRow::from_element)
}

/// Parse a page and extract a candidate for every usable data row.
///
/// # Arguments
/// * `html` - Raw HTML of the timeline page
/// * `base_url` - Origin used to absolutize site-relative links
///
/// # Returns
/// Candidates in document order; rows with fewer than four cells are skipped.
pub fn parse_media_table(html: &str, base_url: &str) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    media_rows(&document)
        .filter_map(|row| extract_row(&row, base_url))
        .collect()
}

//! Row extraction for the media timeline table
//!
//! Columns are positional: year, type, title, released. Anything after the
//! fourth cell is ignored.

use scraper::ElementRef;

use crate::types::CandidateRecord;

use super::cell::{
    absolutize, normalize_cell, rewrite_links, stripped_text, title_attr, titled_anchors,
};

/// Minimum number of cells a data row needs to be extracted
pub const MIN_CELLS: usize = 4;

const YEAR: usize = 0;
const TYPE: usize = 1;
const TITLE: usize = 2;
const RELEASED: usize = 3;

/// A table row as its direct `<td>`/`<th>` children
#[derive(Debug, Clone)]
pub struct TableRow<'a> {
    cells: Vec<ElementRef<'a>>,
}

impl<'a> TableRow<'a> {
    /// Wrap a `<tr>` element.
    pub fn from_element(row: ElementRef<'a>) -> Self {
        let cells = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"))
            .collect();
        Self { cells }
    }

    /// Cell at `index`, if the row has one.
    pub fn cell(&self, index: usize) -> Option<ElementRef<'a>> {
        self.cells.get(index).copied()
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true when the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Stripped text of every cell.
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(|c| stripped_text(*c)).collect()
    }
}

/// Work title, episode title and episode link recovered from the title cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleParts {
    pub title: Option<String>,
    pub episode_title: Option<String>,
    pub episode_url: Option<String>,
}

/// Extract a candidate record from a data row.
///
/// # Returns
/// * `Some(CandidateRecord)` for rows with at least four cells
/// * `None` for shorter rows
pub fn extract_row(row: &TableRow<'_>, base_url: &str) -> Option<CandidateRecord> {
    if row.len() < MIN_CELLS {
        return None;
    }
    let (year_cell, type_cell, title_cell, released_cell) = (
        row.cell(YEAR)?,
        row.cell(TYPE)?,
        row.cell(TITLE)?,
        row.cell(RELEASED)?,
    );

    let year = normalize_cell(year_cell, base_url);
    let content_type = normalize_cell(type_cell, base_url);
    let released = normalize_cell(released_cell, base_url);
    let parts = split_title_cell(title_cell, base_url);

    Some(CandidateRecord {
        year: year.preferred_title.and_then(non_empty),
        year_html: non_empty(year.html),
        content_type: non_empty(content_type.text),
        content_type_html: non_empty(content_type.html),
        title: parts.title,
        title_html: non_empty(rewrite_links(&title_cell.inner_html(), base_url)),
        episode_title: parts.episode_title,
        episode_url: parts.episode_url,
        released: non_empty(released.text),
        released_html: non_empty(released.html),
    })
}

/// Split the title cell into work and episode titles.
///
/// With two or more titled anchors the second-to-last names the work and the
/// last names the episode. A single titled anchor names the work. Without any,
/// the cell's own title attribute is used.
pub fn split_title_cell(cell: ElementRef<'_>, base_url: &str) -> TitleParts {
    match titled_anchors(cell).as_slice() {
        [.., work, episode] => TitleParts {
            title: title_attr(*work),
            episode_title: title_attr(*episode),
            episode_url: episode
                .value()
                .attr("href")
                .filter(|href| !href.is_empty())
                .map(|href| absolutize(href, base_url)),
        },
        [work] => TitleParts {
            title: title_attr(*work),
            ..TitleParts::default()
        },
        [] => TitleParts {
            title: title_attr(cell),
            ..TitleParts::default()
        },
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

use std::fs;
use std::path::Path;

use anyhow::Context;

use watchlist_core::store::{content_types, sort_chronologically};
use watchlist_core::{
    MediaRecord, MemoryStore, RecordFilter, RecordId, RecordStore, WatchlistScraper,
};

pub type Scraper = WatchlistScraper<MemoryStore>;

pub async fn scrape(scraper: &Scraper, file: Option<&Path>, url: Option<&str>) -> anyhow::Result<()> {
    let report = match file {
        Some(path) => {
            let html = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            scraper.scrape_html(&html)?
        }
        None => scraper.scrape_url(url).await?,
    };

    println!(
        "Scraped {} rows: {} new, {} existing ({} changed)",
        report.rows, report.inserted, report.updated, report.changed
    );
    Ok(())
}

pub async fn enrich(scraper: &Scraper) -> anyhow::Result<()> {
    let report = scraper.enrich().await?;
    println!(
        "Enriched {} of {} episodes ({} without codes, {} failed)",
        report.updated, report.eligible, report.unmatched, report.failed
    );
    Ok(())
}

pub fn list(
    scraper: &Scraper,
    filter: &RecordFilter,
    chronological: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut records = scraper.records(filter)?;
    if chronological {
        sort_chronologically(&mut records);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_row(record));
    }
    println!("\n{} records", records.len());
    Ok(())
}

pub fn types(scraper: &Scraper) -> anyhow::Result<()> {
    let records = scraper.store().list()?;
    for content_type in content_types(&records) {
        println!("{}", content_type);
    }
    Ok(())
}

pub fn watch(scraper: &Scraper, id: u64, watched: bool) -> anyhow::Result<()> {
    let record = scraper.set_watched(RecordId(id), watched)?;
    println!(
        "{} marked {}",
        display_title(&record),
        if record.watched { "watched" } else { "unwatched" }
    );
    Ok(())
}

fn display_title(record: &MediaRecord) -> String {
    let title = record.title.as_deref().unwrap_or("(untitled)");
    match &record.episode_title {
        Some(episode) => format!("{} -- {}", title, episode),
        None => title.to_string(),
    }
}

fn format_row(record: &MediaRecord) -> String {
    let code = format!("{}{}", record.season, record.episode);
    format!(
        "{:>5}  [{}]  {:<12} {:<4} {}{}  ({})",
        record.id,
        if record.watched { "x" } else { " " },
        record.year.as_deref().unwrap_or("-"),
        record.content_type.as_deref().unwrap_or("-"),
        display_title(record),
        if code.is_empty() { String::new() } else { format!(" {}", code) },
        record.released.as_deref().unwrap_or("unreleased"),
    )
}

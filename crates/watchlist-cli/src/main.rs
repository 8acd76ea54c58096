mod cli;
mod commands;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use watchlist_core::{MemoryStore, RecordFilter, WatchlistScraper};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.scraper_config()?;

    let store = Arc::new(MemoryStore::open(&config.store_path)?);
    tracing::debug!("Using record store at {}", config.store_path.display());
    let scraper = WatchlistScraper::new(config, store)?;

    match cli.command {
        Commands::Scrape { file, url } => {
            commands::scrape(&scraper, file.as_deref(), url.as_deref()).await?;
        }
        Commands::Enrich => {
            commands::enrich(&scraper).await?;
        }
        Commands::List {
            content_types,
            watched,
            id_gt,
            id_lt,
            chronological,
            json,
        } => {
            let filter = RecordFilter {
                content_types,
                watched,
                id_gt,
                id_lt,
            };
            commands::list(&scraper, &filter, chronological, json)?;
        }
        Commands::Types => {
            commands::types(&scraper)?;
        }
        Commands::Watch { id, unwatch } => {
            commands::watch(&scraper, id, !unwatch)?;
        }
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use watchlist_core::ScraperConfig;

#[derive(Parser, Debug)]
#[command(name = "watchlist")]
#[command(about = "Track canon media releases scraped from a wiki timeline", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "WATCHLIST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// JSON file holding the records
    #[arg(short, long, env = "WATCHLIST_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Wiki origin used for absolute links
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Delay before each detail request, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Maximum number of detail requests in flight
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape the timeline table into the store
    Scrape {
        /// Read the timeline from a saved HTML file
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
        /// Fetch the timeline from this URL instead of the configured page
        #[arg(long)]
        url: Option<String>,
    },
    /// Fill season/episode codes from episode pages
    Enrich,
    /// List stored records
    List {
        /// Only these content types (repeatable)
        #[arg(long = "type")]
        content_types: Vec<String>,
        /// Only watched (true) or unwatched (false) records
        #[arg(long)]
        watched: Option<bool>,
        /// Only ids greater than this
        #[arg(long)]
        id_gt: Option<u64>,
        /// Only ids less than this
        #[arg(long)]
        id_lt: Option<u64>,
        /// Order by in-universe year instead of id
        #[arg(long)]
        chronological: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the content types present in the store
    Types,
    /// Mark a record as watched
    Watch {
        /// Record id
        id: u64,
        /// Mark as unwatched instead
        #[arg(long)]
        unwatch: bool,
    },
}

impl Cli {
    /// Effective configuration: file (or defaults), then flag overrides.
    pub fn scraper_config(&self) -> watchlist_core::Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::load(path)?,
            None => ScraperConfig::default(),
        };

        if let Some(store) = &self.store {
            config.store_path.clone_from(store);
        }
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(delay_ms) = self.delay_ms {
            config.request_delay_ms = delay_ms;
        }
        if let Some(workers) = self.workers {
            config.max_concurrent_requests = workers;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::parse_from([
            "watchlist",
            "--store",
            "/tmp/records.json",
            "--workers",
            "2",
            "enrich",
        ]);
        let config = cli.scraper_config().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/records.json"));
        assert_eq!(config.max_concurrent_requests, 2);
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.toml");
        std::fs::write(&path, "request_delay_ms = 50\nmax_concurrent_requests = 3\n").unwrap();

        let cli = Cli::parse_from([
            "watchlist",
            "--config",
            path.to_str().unwrap(),
            "--delay-ms",
            "10",
            "list",
        ]);
        let config = cli.scraper_config().unwrap();
        assert_eq!(config.request_delay_ms, 10);
        assert_eq!(config.max_concurrent_requests, 3);
    }

    #[test]
    fn test_scrape_file_and_url_conflict() {
        let result = Cli::try_parse_from([
            "watchlist", "scrape", "--file", "page.html", "--url", "https://x.example",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_filters_parse() {
        let cli = Cli::parse_from([
            "watchlist", "list", "--type", "TV", "--type", "N", "--watched", "false",
        ]);
        match cli.command {
            Commands::List {
                content_types,
                watched,
                ..
            } => {
                assert_eq!(content_types, vec!["TV", "N"]);
                assert_eq!(watched, Some(false));
            }
            other => panic!("Expected list command, got {:?}", other),
        }
    }
}

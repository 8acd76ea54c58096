//! Episode detail page parser
//!
//! Recovers season and episode codes from a wiki episode page. Three
//! strategies run in a fixed order:
//!
//! 1. [`DetailStrategy::InfoBox`]: labelled rows of the `.infobox` table,
//!    where a later matching row replaces an earlier one
//! 2. [`DetailStrategy::Headings`]: `h2`-`h4` headings mentioning a season or episode
//! 3. [`DetailStrategy::MetadataPanel`]: portable-infobox items tagged
//!    `data-source="season"` / `data-source="episode"`
//!
//! The first two only fill fields that are still missing. The metadata panel
//! is the most precise source and overrides whatever came before it.

use std::sync::LazyLock;

use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};

use super::cell::stripped_text;

static SELECTOR_INFOBOX: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".infobox").expect("Invalid infobox selector"));
static SELECTOR_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Invalid tr selector"));
static SELECTOR_TH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("Invalid th selector"));
static SELECTOR_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Invalid td selector"));
static SELECTOR_HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4").expect("Invalid heading selector"));
static SELECTOR_SEASON_ITEM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-source="season"]"#).expect("Invalid season selector")
});
static SELECTOR_EPISODE_ITEM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-source="episode"]"#).expect("Invalid episode selector")
});
static SELECTOR_DATA_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pi-data-value").expect("Invalid value selector"));
static SELECTOR_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("Invalid anchor selector"));

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid number pattern"));

const SEASON_NAMES: [(&str, &str); 10] = [
    ("one", "01"),
    ("two", "02"),
    ("three", "03"),
    ("four", "04"),
    ("five", "05"),
    ("six", "06"),
    ("seven", "07"),
    ("eight", "08"),
    ("nine", "09"),
    ("ten", "10"),
];

/// Season and episode values found on a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeInfo {
    pub season: Option<String>,
    pub episode: Option<String>,
}

impl EpisodeInfo {
    /// Returns true when neither field was found.
    pub fn is_empty(&self) -> bool {
        self.season.is_none() && self.episode.is_none()
    }

    fn is_complete(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }

    fn merge(&mut self, found: EpisodeInfo, precedence: Precedence) {
        match precedence {
            Precedence::FillMissing => {
                if self.season.is_none() {
                    self.season = found.season;
                }
                if self.episode.is_none() {
                    self.episode = found.episode;
                }
            }
            Precedence::Override => {
                if found.season.is_some() {
                    self.season = found.season;
                }
                if found.episode.is_some() {
                    self.episode = found.episode;
                }
            }
        }
    }
}

/// How a strategy's findings combine with earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Only fill fields no earlier strategy found
    FillMissing,
    /// Replace earlier findings
    Override,
}

/// One way of reading season/episode off a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailStrategy {
    InfoBox,
    Headings,
    MetadataPanel,
}

/// Strategies in the order they are tried. Later entries win over earlier
/// ones according to their [`Precedence`].
pub const STRATEGY_ORDER: [DetailStrategy; 3] = [
    DetailStrategy::InfoBox,
    DetailStrategy::Headings,
    DetailStrategy::MetadataPanel,
];

impl DetailStrategy {
    /// How this strategy's findings are merged.
    pub fn precedence(self) -> Precedence {
        match self {
            Self::InfoBox | Self::Headings => Precedence::FillMissing,
            Self::MetadataPanel => Precedence::Override,
        }
    }

    /// Run the strategy against a parsed page.
    pub fn extract(self, document: &Html) -> EpisodeInfo {
        match self {
            Self::InfoBox => extract_from_infobox(document),
            Self::Headings => extract_from_headings(document),
            Self::MetadataPanel => extract_from_metadata_panel(document),
        }
    }
}

/// Parse season/episode codes from a detail page.
///
/// # Returns
/// An [`EpisodeInfo`] with whatever was found; empty when nothing matched.
pub fn parse_episode_info(html: &str) -> EpisodeInfo {
    let document = Html::parse_document(html);
    let mut info = EpisodeInfo::default();

    for strategy in STRATEGY_ORDER {
        if strategy.precedence() == Precedence::FillMissing && info.is_complete() {
            continue;
        }
        info.merge(strategy.extract(&document), strategy.precedence());
    }

    info
}

fn extract_from_infobox(document: &Html) -> EpisodeInfo {
    let mut info = EpisodeInfo::default();
    let Some(infobox) = document.select(&SELECTOR_INFOBOX).next() else {
        return info;
    };

    for row in infobox.select(&SELECTOR_TR) {
        let (Some(label), Some(value)) = (
            row.select(&SELECTOR_TH).next(),
            row.select(&SELECTOR_TD).next(),
        ) else {
            continue;
        };
        let label = stripped_text(label).to_lowercase();
        let value = stripped_text(value);
        if value.is_empty() {
            continue;
        }

        if label.contains("season") {
            info.season = Some(value.clone());
        }
        if label.contains("episode") {
            info.episode = Some(value);
        }
    }

    info
}

fn extract_from_headings(document: &Html) -> EpisodeInfo {
    let mut info = EpisodeInfo::default();

    for heading in document.select(&SELECTOR_HEADINGS) {
        let text = stripped_text(heading).to_lowercase();
        if info.season.is_none() && text.contains("season") {
            info.season = Some(text.clone());
        }
        if info.episode.is_none() && text.contains("episode") {
            info.episode = Some(text);
        }
    }

    info
}

fn extract_from_metadata_panel(document: &Html) -> EpisodeInfo {
    let season = panel_value(document, &SELECTOR_SEASON_ITEM)
        .map(|value| {
            value
                .select(&SELECTOR_ANCHOR)
                .next()
                .map_or_else(|| stripped_text(value), stripped_text)
        })
        .filter(|raw| !raw.is_empty())
        .map(|raw| format!("S{}", normalize_season(&raw)));

    let episode = panel_value(document, &SELECTOR_EPISODE_ITEM)
        .and_then(|value| normalize_episode(&value.text().collect::<String>()));

    EpisodeInfo { season, episode }
}

fn panel_value<'a>(document: &'a Html, item: &Selector) -> Option<ElementRef<'a>> {
    document
        .select(item)
        .next()?
        .select(&SELECTOR_DATA_VALUE)
        .next()
}

/// Normalize a season name to a two-digit number.
///
/// Spelled-out names "one" through "ten" map through a lookup table; any
/// other value is lower-cased and left-padded with zeros to two characters.
///
/// # Examples
/// ```
/// use watchlist_core::parser::normalize_season;
///
/// assert_eq!(normalize_season("Two"), "02");
/// assert_eq!(normalize_season("3"), "03");
/// assert_eq!(normalize_season("12"), "12");
/// ```
pub fn normalize_season(raw: &str) -> String {
    let season = raw.trim().to_lowercase();
    SEASON_NAMES
        .iter()
        .find(|(name, _)| *name == season)
        .map_or_else(|| format!("{:0>2}", season), |(_, number)| number.to_string())
}

/// Format the first integer in `raw` as an episode code.
///
/// # Examples
/// ```
/// use watchlist_core::parser::normalize_episode;
///
/// assert_eq!(normalize_episode("Episode 7 overview"), Some("E07".to_string()));
/// assert_eq!(normalize_episode("112"), Some("E112".to_string()));
/// assert_eq!(normalize_episode("unknown"), None);
/// ```
pub fn normalize_episode(raw: &str) -> Option<String> {
    let number: u64 = FIRST_NUMBER.find(raw)?.as_str().parse().ok()?;
    Some(format!("E{:02}", number))
}

//! In-universe year parsing
//!
//! Timeline years are written relative to the Battle of Yavin: "382 BBY" is
//! before it, "4 ABY" after. Parsing maps them onto one signed axis so records
//! can be ordered chronologically.

use std::sync::LazyLock;

use regex_lite::Regex;

static ERA_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+)(?:\s*(BBY|ABY))?").expect("Invalid year pattern"));

/// Parse an era-qualified year into a signed number (BBY negative).
///
/// Returns `None` when the text contains no number.
///
/// # Examples
/// ```
/// use watchlist_core::year::parse_year;
///
/// assert_eq!(parse_year("382 BBY"), Some(-382));
/// assert_eq!(parse_year("c. 232 BBY"), Some(-232));
/// assert_eq!(parse_year("4 ABY"), Some(4));
/// assert_eq!(parse_year("unknown"), None);
/// ```
pub fn parse_year(text: &str) -> Option<i64> {
    let caps = ERA_YEAR.captures(text)?;
    let value: i64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("BBY") => Some(-value.abs()),
        Some("ABY") => Some(value.abs()),
        _ => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_year_eras() {
        assert_eq!(parse_year("382 BBY"), Some(-382));
        assert_eq!(parse_year("0 ABY"), Some(0));
        assert_eq!(parse_year("34ABY"), Some(34));
    }

    #[test]
    fn test_parse_year_without_era() {
        assert_eq!(parse_year("2015"), Some(2015));
        assert_eq!(parse_year("-5"), Some(-5));
    }

    #[test]
    fn test_parse_year_no_number() {
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("Unknown"), None);
    }

    proptest! {
        #[test]
        fn prop_bby_is_never_positive(n in 0i64..100_000) {
            prop_assert_eq!(parse_year(&format!("{} BBY", n)), Some(-n));
            prop_assert_eq!(parse_year(&format!("{} ABY", n)), Some(n));
        }
    }
}

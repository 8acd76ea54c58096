//! Table cell normalization
//!
//! Reads one `<td>`/`<th>` into plain text, a preferred title and a display
//! fragment whose site-relative links point back at the wiki.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use scraper::{ElementRef, Selector};

static SELECTOR_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("Invalid anchor selector"));

// Serialized markup always quotes attributes with `"`, so matching the
// serializer output is enough. `//host` (protocol-relative) is left alone.
static SITE_RELATIVE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s)href="/((?:[^/"][^"]*)?)""#).expect("Invalid href pattern")
});

/// Normalized view of a single table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCell {
    /// Visible text, see [`stripped_text`]
    pub text: String,
    /// Title attribute of the last titled anchor, else of the cell itself
    pub preferred_title: Option<String>,
    /// Inner markup with site-relative links made absolute
    pub html: String,
}

/// Normalize a table cell.
///
/// # Arguments
/// * `cell` - The `<td>` or `<th>` element
/// * `base_url` - Origin prepended to site-relative links
pub fn normalize_cell(cell: ElementRef<'_>, base_url: &str) -> NormalizedCell {
    let text = stripped_text(cell);

    let preferred_title = titled_anchors(cell)
        .iter()
        .rev()
        .find_map(|a| title_attr(*a))
        .or_else(|| title_attr(cell));

    NormalizedCell {
        text,
        preferred_title,
        html: rewrite_links(&cell.inner_html(), base_url),
    }
}

/// Visible text of an element with every text node trimmed.
///
/// Whitespace-only nodes drop out and the rest are joined without a
/// separator, so `<span>Season</span> <span>Two</span>` reads "SeasonTwo".
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .collect()
}

/// Anchors inside `cell` that carry a non-empty title attribute, in document order.
pub fn titled_anchors(cell: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    cell.select(&SELECTOR_ANCHOR)
        .filter(|a| title_attr(*a).is_some())
        .collect()
}

/// Non-empty `title` attribute of an element.
pub fn title_attr(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("title")
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Rewrite every site-relative link in an HTML fragment to an absolute one.
///
/// Pure: the input fragment is not touched and a new string is returned.
///
/// # Examples
/// ```
/// use watchlist_core::parser::rewrite_links;
///
/// let html = r#"<a href="/wiki/Andor">Andor</a>"#;
/// assert_eq!(
///     rewrite_links(html, "https://starwars.fandom.com"),
///     r#"<a href="https://starwars.fandom.com/wiki/Andor">Andor</a>"#
/// );
/// ```
pub fn rewrite_links(fragment: &str, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    SITE_RELATIVE_HREF
        .replace_all(fragment, |caps: &Captures<'_>| {
            let path = caps.get(2).map_or("", |m| m.as_str());
            format!("{}href=\"{}/{}\"", &caps[1], base, path)
        })
        .into_owned()
}

/// Make a single link target absolute if it is site-relative.
pub fn absolutize(href: &str, base_url: &str) -> String {
    if href.starts_with('/') && !href.starts_with("//") {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

//! Everything that knows what scouting.org's markup looks like.
//!
//! These are deliberately narrow: when the site changes, only the patterns and selectors
//! in here should need touching.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::{Error, Result};

/// Link format for each merit badge requirements page.
static BADGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="/merit-badges/([^/]*)/">"#).expect("badge link regex is valid")
});
/// Badge links whose text starts with this aren't badges.
const EXCLUDED_LINK_MARKER: &str = "WEB";
static PAMPHLET_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="https://filestore\.scouting\.org/(?:.*)/Pamphlets([^"]*)""#)
        .expect("pamphlet link regex is valid")
});
/// Relation marking the WordPress REST API entry in a `Link` header.
pub const WORDPRESS_API_REL: &str = "https://api.w.org/";

/// Pulls the first user-agent string out of a useragentstring.com listing page.
/// Returns `None` when the page has no `<li><a>` entry with text.
pub fn user_agent_from_page(html: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let entry_selector = create_selector("li > a")?;

    let agent = doc
        .select(&entry_selector)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(agent)
}

/// Finds the WordPress JSON page URL in a `Link` response header.
///
/// WordPress sends something like
/// `<https://host/wp-json/>; rel="https://api.w.org/", <https://host/wp-json/wp/v2/pages/1>; rel="alternate"; type="application/json"`.
/// Splitting on `;` puts the API relation and the *next* link into the same piece,
/// so the URL we want is whatever follows the last `", "` in that piece.
pub fn listing_url_from_link_header(header: &str) -> Option<String> {
    let piece = header.split(';').find(|p| p.contains(WORDPRESS_API_REL))?;
    let link = piece.rsplit(", ").next()?.trim();
    let url = link.strip_prefix('<')?.strip_suffix('>')?;
    (!url.is_empty()).then(|| url.to_string())
}

/// Returns the rendered HTML of a WordPress page from its JSON representation.
pub fn listing_markup(json: &[u8]) -> Result<String> {
    let page: Value = serde_json::from_slice(json)?;
    page.get("content")
        .and_then(|content| content.get("rendered"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(Error::ListingShape("content.rendered"))
}

/// Extracts the badge identifiers linked from the listing markup.
/// The result has no duplicates and is sorted ascending.
pub fn discover_identifiers(markup: &str) -> Vec<String> {
    let badges: BTreeSet<String> = BADGE_LINK
        .captures_iter(markup)
        .filter(|caps| {
            let end = caps.get(0).map_or(0, |m| m.end());
            !markup[end..].starts_with(EXCLUDED_LINK_MARKER)
        })
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    badges.into_iter().collect()
}

/// Looks for a pamphlet link on a badge requirements page and rebuilds its URL on top of
/// `pamphlet_base`. Only the first link counts.
pub fn find_document(markup: &str, pamphlet_base: &str) -> Option<String> {
    PAMPHLET_LINK
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|fragment| format!("{pamphlet_base}{}", fragment.as_str()))
}

/// Local file name for a pamphlet URL: the last path segment, percent-decoded, with
/// underscores turned into spaces.
///
/// Never fails. Bytes that don't decode to UTF-8 become U+FFFD.
pub fn file_name_from_url(url: &str) -> String {
    let segment = url.rsplit('/').next().unwrap_or(url);
    let decoded = urlencoding::decode_binary(segment.as_bytes());
    String::from_utf8_lossy(&decoded).replace('_', " ")
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseSelector(sel_str.into()))
}

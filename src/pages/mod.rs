//! Raw field extractors.
//!
//! Every extractor is a pure function from a parsed page to primitive
//! values: strings, numbers and raw row tuples. They know nothing about
//! entities or the registry. Missing markup and site placeholders come back
//! as `None` or an empty list, never as an error; errors are reserved for
//! malformed selectors and patterns.

pub mod album;
pub mod artist;
pub mod band;

use std::time::Duration;

use scraper::{ElementRef, Html, Node, Selector};

use crate::{EnmetError, Result};

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EnmetError::Parse(format!("selector {css:?}: {e}")))
}

/// Concatenated text of an element and its descendants.
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// First element under `scope` matching `css`.
pub(crate) fn first<'a>(scope: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(scope.select(&selector(css)?).next())
}

/// `href` and text of the first link under `scope`.
pub(crate) fn link(scope: ElementRef<'_>) -> Result<Option<(String, String)>> {
    Ok(first(scope, "a")?.and_then(|a| {
        let href = a.value().attr("href")?;
        Some((href.to_string(), text(a)))
    }))
}

/// Text of the whole page, trimmed. Used for read-more and lyrics pages.
pub(crate) fn page_text(html: &Html) -> String {
    text(html.root_element()).trim().to_string()
}

/// Value element of a `<dt>label</dt><dd>value</dd>` header pair.
pub(crate) fn header_item<'a>(html: &'a Html, label: &str) -> Result<Option<ElementRef<'a>>> {
    let terms = selector("dt")?;
    Ok(html
        .select(&terms)
        .find(|dt| text(*dt).trim() == label)
        .and_then(|dt| dt.next_siblings().find_map(ElementRef::wrap)))
}

/// Trimmed text of a header value.
pub(crate) fn header_text(html: &Html, label: &str) -> Result<Option<String>> {
    Ok(header_item(html, label)?.map(|dd| text(dd).trim().to_string()))
}

/// Text of the direct children of `element`, each trimmed, joined by spaces.
pub(crate) fn joined_children(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| match node.value() {
            Node::Text(t) => Some(t.trim().to_string()),
            Node::Element(_) => ElementRef::wrap(node).map(|e| text(e).trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of whitespace (including non-breaking spaces) into one space.
pub(crate) fn squash(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a `,`/`;` separated list such as genres or lyrical themes.
pub fn split_by_sep(data: &str) -> Vec<String> {
    let data = data.trim();
    if data.is_empty() {
        return Vec::new();
    }
    data.split([',', ';'])
        .map(|part| part.trim().to_string())
        .collect()
}

/// Catalog id from an entity URL: the last path segment.
///
/// `https://www.metal-archives.com/bands/Black_Sabbath/99` -> `99`.
pub fn url_to_id(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Whether a scraped string is one of the site's "no data" placeholders.
pub fn is_placeholder(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("n/a") || s.eq_ignore_ascii_case("unknown")
}

/// Map placeholders to `None`.
pub fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !is_placeholder(s))
}

/// Map a placeholder-only list (`["N/A"]`) to an empty list.
pub fn normalize_list(values: Vec<String>) -> Vec<String> {
    match values.as_slice() {
        [only] if is_placeholder(only) => Vec::new(),
        _ => values,
    }
}

/// Parse a `[hh:]mm:ss` duration. Zero and unparsable values are `None`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let mut seconds = 0u64;
    for part in s.split(':') {
        let part = part.trim().parse::<u64>().ok()?;
        seconds = seconds.checked_mul(60)?.checked_add(part)?;
    }
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

/// Disc name from a tracklist header like "Disc 1 - Gloom".
pub fn disc_name(header: &str) -> Option<String> {
    let (_, name) = header.split_once("- ")?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// A person row in a lineup table: profile URL, displayed name, role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub url: String,
    pub name: String,
    pub role: Option<String>,
}

/// `tr.lineupRow` rows under `container`.
pub(crate) fn person_rows(html: &Html, container: &str) -> Result<Vec<PersonRow>> {
    let rows = selector(&format!("{container} tr.lineupRow"))?;
    let role_cell = selector("td:nth-child(2)")?;
    let mut result = Vec::new();
    for row in html.select(&rows) {
        let Some((url, name)) = link(row)? else {
            continue;
        };
        let role = row
            .select(&role_cell)
            .next()
            .map(|td| squash(&text(td)))
            .filter(|r| !r.is_empty());
        result.push(PersonRow {
            url,
            name: name.trim().to_string(),
            role,
        });
    }
    Ok(result)
}

/// Section of a page whose full text may live on a separate read-more page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Absent,
    Inline(String),
    ReadMore,
}

//! Selector helpers for article pages.
//!
//! Every lookup takes an ordered list of CSS selectors and returns the first
//! non-blank hit, so each field can carry a primary rule and its fallbacks.
//! `scraper::Html` is not `Send`; parse and query inside synchronous code
//! only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(selector = css, error = %e, "invalid CSS selector");
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matched by the first selector that yields
/// non-blank text.
pub(crate) fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().filter_map(|css| selector(css)).find_map(|s| {
        doc.select(&s)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
    })
}

/// Attribute value of the first matching element, across selectors in order.
pub(crate) fn first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    selectors.iter().filter_map(|css| selector(css)).find_map(|s| {
        doc.select(&s)
            .find_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    })
}

/// `content` of `<meta property=...>` or `<meta name=...>`.
pub(crate) fn meta_content(doc: &Html, key: &str) -> Option<String> {
    let by_property = format!("meta[property='{key}']");
    let by_name = format!("meta[name='{key}']");
    first_attr(doc, &[by_property.as_str(), by_name.as_str()], "content")
}

/// Paragraph text under the first selector that matches any non-blank
/// paragraph, joined with single spaces.
pub(crate) fn paragraphs(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().filter_map(|css| selector(css)).find_map(|s| {
        let text = doc
            .select(&s)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!text.is_empty()).then_some(text)
    })
}

/// Parse a published timestamp into UTC.
///
/// Accepts RFC 3339, ISO 8601 with a colon-less offset, offset-less
/// date-times (assumed UTC) and bare dates (midnight UTC).
pub(crate) fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolve `href` against `base`, keeping only http(s) results.
pub(crate) fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("javascript:")
    {
        return None;
    }
    base.join(href)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// `href`s of every element matched by `css`, in document order.
pub(crate) fn hrefs(doc: &Html, css: &str) -> Vec<String> {
    selector(css)
        .map(|s| {
            doc.select(&s)
                .filter_map(|el| el.value().attr("href"))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

//! Candidate link extraction from a course page.
//!
//! StudOn lists files as plain anchors whose `href` points at a `.pdf`, a
//! `sendfile` endpoint, or a `download` action. This module picks those out
//! with a substring heuristic, resolves them against the page URL and
//! deduplicates them in document order. It performs no network access.
//!
//! The heuristic over-collects on purpose: any navigational link that happens
//! to contain "download" is kept, and a PDF served from a URL with none of
//! the three markers is missed.

mod error;

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

pub use error::ExtractError;

/// Lower-case substrings that mark an `href` as a document link.
pub const CANDIDATE_MARKERS: [&str; 3] = [".pdf", "sendfile", "download"];

/// Result of scanning a page for document links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkExtraction {
    /// At least one candidate; absolute URLs in first-seen order, no duplicates.
    Found(Vec<String>),
    /// The page contains no matching anchors.
    Empty,
}

impl LinkExtraction {
    /// Number of links found (zero for [`LinkExtraction::Empty`]).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Found(links) => links.len(),
            Self::Empty => 0,
        }
    }

    /// Whether no links were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The links, empty for [`LinkExtraction::Empty`].
    #[must_use]
    pub fn into_links(self) -> Vec<String> {
        match self {
            Self::Found(links) => links,
            Self::Empty => Vec::new(),
        }
    }
}

impl From<Vec<String>> for LinkExtraction {
    fn from(links: Vec<String>) -> Self {
        if links.is_empty() {
            Self::Empty
        } else {
            Self::Found(links)
        }
    }
}

/// Returns `true` if `href` looks like a document link.
///
/// Case-insensitive; the original `href` is left untouched for resolution.
#[must_use]
pub fn is_candidate_href(href: &str) -> bool {
    let lower = href.to_lowercase();
    CANDIDATE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Extracts candidate document links from `html`, tagged as found or empty.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidBaseUrl`] if `base_url` is not absolute.
pub fn extract_links(base_url: &str, html: &str) -> Result<LinkExtraction, ExtractError> {
    candidate_links(base_url, html).map(LinkExtraction::from)
}

/// Extracts candidate document links from `html` as an ordered list.
///
/// Every `<a href>` whose value matches [`is_candidate_href`] is resolved
/// against `base_url`. The result holds each absolute URL once, at the
/// position of its first occurrence. References that cannot be resolved are
/// skipped.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidBaseUrl`] if `base_url` is not absolute.
pub fn candidate_links(base_url: &str, html: &str) -> Result<Vec<String>, ExtractError> {
    let base = Url::parse(base_url).map_err(|source| ExtractError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let Ok(selector) = Selector::parse("a[href]") else {
        return Ok(Vec::new());
    };
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut anchors = 0usize;

    for href in document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
    {
        anchors += 1;
        let href = href.trim();
        if !is_candidate_href(href) {
            continue;
        }
        match base.join(href) {
            Ok(resolved) => {
                let resolved = resolved.to_string();
                if seen.insert(resolved.clone()) {
                    links.push(resolved);
                }
            }
            Err(error) => debug!(href, %error, "skipping unresolvable link"),
        }
    }

    debug!(anchors, candidates = links.len(), "extracted candidate links");
    Ok(links)
}

//! The adapter capability and the shared driver for HTML news sites.

use std::collections::HashSet;

use async_trait::async_trait;
use ecoa_core::{canonicalize_url, ArticleCandidate};
use futures::stream::{self, StreamExt};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::Html;
use url::Url;

use crate::error::SourceError;
use crate::fetcher::Fetcher;
use crate::html;

/// Candidate URLs kept from one search page.
pub const MAX_DISCOVERED_PER_TERM: usize = 15;
/// Articles fetched and parsed per term, after dropping already-seen URLs.
pub const MAX_ARTICLES_PER_TERM: usize = 10;

/// A pluggable news source.
///
/// `scrape` never fails: every error is logged and contained inside the
/// adapter, and the worst case is an empty list.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier stored on every candidate (`g1`, `cnn`, ...).
    fn source(&self) -> &'static str;

    async fn scrape(&self, terms: &[String]) -> Vec<ArticleCandidate>;
}

/// One link-discovery rule. Rules are tried in order; the first one that
/// yields any URL wins.
#[derive(Debug)]
pub struct LinkRule {
    pub selector: &'static str,
    /// Substring the URL path must contain. `None` accepts any non-root path.
    pub path_marker: Option<&'static str>,
}

/// Site-specific extraction rules for an HTML news source.
///
/// Each field lists a primary selector followed by its fallbacks.
#[derive(Debug)]
pub struct SiteRules {
    pub source: &'static str,
    pub default_base_url: &'static str,
    /// Path and query of the search page, given the percent-encoded term.
    pub search_path: fn(&str) -> String,
    pub links: &'static [LinkRule],
    pub title: &'static [&'static str],
    pub summary: &'static [&'static str],
    /// Paragraph selectors for the article body.
    pub content: &'static [&'static str],
    pub author: &'static [&'static str],
    /// Byline prefix stripped from the author ("Por" on G1).
    pub author_prefix: Option<&'static str>,
    /// Elements carrying a `datetime` attribute.
    pub published: &'static [&'static str],
    /// Lead image elements carrying a `src` attribute.
    pub image: &'static [&'static str],
}

impl SiteRules {
    /// Candidate article URLs on a search page, canonical and de-duplicated,
    /// capped at [`MAX_DISCOVERED_PER_TERM`].
    #[must_use]
    pub fn discover(&self, base: &Url, page: &str) -> Vec<String> {
        let doc = Html::parse_document(page);

        for rule in self.links {
            let mut urls: Vec<String> = Vec::new();
            for href in html::hrefs(&doc, rule.selector) {
                let Some(url) = html::resolve(base, &href) else {
                    continue;
                };
                if url.host_str() != base.host_str() {
                    continue;
                }
                let path = url.path();
                let looks_like_article = match rule.path_marker {
                    Some(marker) => path.contains(marker),
                    None => path.len() > 1,
                };
                if !looks_like_article {
                    continue;
                }
                let Some(canonical) = canonicalize_url(url.as_str()) else {
                    continue;
                };
                if !urls.contains(&canonical) {
                    urls.push(canonical);
                }
                if urls.len() == MAX_DISCOVERED_PER_TERM {
                    break;
                }
            }
            if !urls.is_empty() {
                return urls;
            }
        }

        Vec::new()
    }

    /// Extract a candidate from an article page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] when no non-blank title is found.
    pub fn parse_article(
        &self,
        base: &Url,
        url: &str,
        page: &str,
    ) -> Result<ArticleCandidate, SourceError> {
        let doc = Html::parse_document(page);

        let title = html::first_text(&doc, self.title)
            .or_else(|| html::meta_content(&doc, "og:title"))
            .ok_or_else(|| SourceError::parse(url, "missing title"))?;

        let mut candidate = ArticleCandidate::new(self.source, url, &title)
            .with_content(html::paragraphs(&doc, self.content));
        if !candidate.has_required_fields() {
            return Err(SourceError::parse(url, "blank title"));
        }

        candidate.summary = html::first_text(&doc, self.summary)
            .or_else(|| html::meta_content(&doc, "og:description"));

        candidate.author = html::first_text(&doc, self.author)
            .map(|author| match self.author_prefix {
                Some(prefix) => author
                    .strip_prefix(prefix)
                    .map_or(author.as_str(), str::trim)
                    .to_owned(),
                None => author,
            })
            .filter(|a| !a.is_empty());

        candidate.published_at = html::first_attr(&doc, self.published, "datetime")
            .or_else(|| html::meta_content(&doc, "article:published_time"))
            .and_then(|raw| html::parse_published(&raw));

        let page_url = Url::parse(url).unwrap_or_else(|_| base.clone());
        candidate.image_url = html::first_attr(&doc, self.image, "src")
            .and_then(|src| html::resolve(&page_url, &src))
            .or_else(|| {
                html::meta_content(&doc, "og:image").and_then(|src| html::resolve(&page_url, &src))
            })
            .map(String::from);

        Ok(candidate)
    }
}

/// Drives search, discovery and bounded concurrent article fetches for one
/// [`SiteRules`] definition.
#[derive(Debug)]
pub struct HtmlAdapter {
    rules: &'static SiteRules,
    base: Url,
    fetcher: Fetcher,
    max_concurrency: usize,
}

impl HtmlAdapter {
    /// Adapter pointed at the site's production base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if the base URL does not parse.
    pub fn new(
        rules: &'static SiteRules,
        fetcher: Fetcher,
        max_concurrency: usize,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(rules, rules.default_base_url, fetcher, max_concurrency)
    }

    /// Adapter pointed at an arbitrary base URL (mirrors, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        rules: &'static SiteRules,
        base_url: &str,
        fetcher: Fetcher,
        max_concurrency: usize,
    ) -> Result<Self, SourceError> {
        let base = Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            rules,
            base,
            fetcher,
            max_concurrency: max_concurrency.max(1),
        })
    }

    /// Search page URL for `term`, newest first.
    #[must_use]
    pub fn search_url(&self, term: &str) -> String {
        let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC).to_string();
        format!(
            "{}{}",
            self.base.as_str().trim_end_matches('/'),
            (self.rules.search_path)(&encoded)
        )
    }

    async fn scrape_term(&self, term: &str, seen: &mut HashSet<String>) -> Vec<ArticleCandidate> {
        let source = self.rules.source;
        let search_url = self.search_url(term);
        let Some(page) = self.fetcher.fetch(&search_url).await else {
            tracing::warn!(source, term, "search page unavailable");
            return Vec::new();
        };

        let discovered = self.rules.discover(&self.base, &page);
        let urls: Vec<String> = discovered
            .iter()
            .filter(|url| seen.insert((*url).clone()))
            .take(MAX_ARTICLES_PER_TERM)
            .cloned()
            .collect();
        tracing::info!(
            source,
            term,
            discovered = discovered.len(),
            fetching = urls.len(),
            "discovered article URLs"
        );

        stream::iter(urls)
            .map(|url| self.fetch_article(url))
            .buffer_unordered(self.max_concurrency)
            .collect::<Vec<Option<ArticleCandidate>>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn fetch_article(&self, url: String) -> Option<ArticleCandidate> {
        let page = self.fetcher.fetch(&url).await?;
        match self.rules.parse_article(&self.base, &url, &page) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                tracing::warn!(
                    source = self.rules.source,
                    url = %url,
                    error = %e,
                    "skipping article"
                );
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for HtmlAdapter {
    fn source(&self) -> &'static str {
        self.rules.source
    }

    async fn scrape(&self, terms: &[String]) -> Vec<ArticleCandidate> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for term in terms {
            let term = term.trim();
            if term.is_empty() {
                continue;
            }
            candidates.extend(self.scrape_term(term, &mut seen).await);
        }

        tracing::info!(
            source = self.rules.source,
            terms = terms.len(),
            articles = candidates.len(),
            "scrape finished"
        );
        candidates
    }
}

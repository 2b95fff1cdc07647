//! Article records as they move through ingestion.
//!
//! An [`ArticleCandidate`] is what a source adapter hands back. Once it
//! survives deduplication and classification it becomes a [`NewArticle`],
//! and the store turns that into an immutable [`StoredArticle`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

/// Upper bound, in characters, for article body text.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Query parameters that only carry campaign tracking and never select content.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_cid", "mc_eid", "ref", "ref_src"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// A transient article produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleCandidate {
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Identifier of the adapter that produced the candidate (`g1`, `cnn`, ...).
    pub source: String,
}

impl ArticleCandidate {
    /// Create a candidate with only the required fields set.
    ///
    /// The URL is canonicalized when it parses; otherwise it is kept trimmed.
    #[must_use]
    pub fn new(source: &str, url: &str, title: &str) -> Self {
        let url = canonicalize_url(url).unwrap_or_else(|| url.trim().to_string());
        Self {
            title: title.trim().to_string(),
            summary: None,
            content: None,
            url,
            image_url: None,
            author: None,
            published_at: None,
            source: source.to_string(),
        }
    }

    /// Set the body text, truncating it to [`MAX_CONTENT_CHARS`] characters.
    /// Blank bodies are stored as `None`.
    #[must_use]
    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content
            .map(|c| truncate_chars(&c, MAX_CONTENT_CHARS))
            .filter(|c| !c.trim().is_empty());
        self
    }

    /// A candidate is ingestible only with a non-blank title and a URL.
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }

    #[must_use]
    pub fn url_hash(&self) -> String {
        url_hash(&self.url)
    }
}

/// A classified candidate ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub candidate: ArticleCandidate,
    pub url_hash: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub scraped_at: DateTime<Utc>,
}

/// A persisted, write-once article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: Uuid,
    pub source: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub url_hash: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
}

impl StoredArticle {
    /// Materialize a stored article from a new one and the id the store assigned.
    #[must_use]
    pub fn from_new(id: Uuid, article: &NewArticle) -> Self {
        let c = &article.candidate;
        Self {
            id,
            source: c.source.clone(),
            title: c.title.clone(),
            summary: c.summary.clone(),
            content: c.content.clone(),
            url: c.url.clone(),
            url_hash: article.url_hash.clone(),
            image_url: c.image_url.clone(),
            author: c.author.clone(),
            published_at: c.published_at,
            scraped_at: article.scraped_at,
            sentiment_label: article.sentiment_label,
            sentiment_score: article.sentiment_score,
        }
    }
}

/// Canonical form of an article URL, used as the dedup boundary.
///
/// Lowercases scheme and host, drops the fragment, `utm_*` and other tracking
/// parameters, and a trailing slash on non-root paths. Returns `None` when
/// the input is not an absolute http(s) URL.
#[must_use]
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| {
            let key = k.to_ascii_lowercase();
            !key.starts_with("utm_") && !TRACKING_PARAMS.contains(&key.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Some(url.to_string())
}

/// SHA-256 hex digest of the canonical form of `url`.
///
/// URLs that do not canonicalize are hashed as given (trimmed), so the hash
/// is always defined.
#[must_use]
pub fn url_hash(url: &str) -> String {
    let canonical = canonicalize_url(url).unwrap_or_else(|| url.trim().to_string());
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

/// Cut `text` to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

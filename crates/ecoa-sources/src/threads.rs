//! Meta Threads posts via the Graph API keyword search.
//!
//! Disabled (empty results plus a warning) when no access token is set.

use std::collections::HashSet;

use async_trait::async_trait;
use ecoa_core::ArticleCandidate;
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::error::SourceError;
use crate::fetcher::Fetcher;
use crate::html::parse_published;
use crate::social::{post_title, warn_missing_credentials};

pub const THREADS_SOURCE: &str = "threads";
pub const THREADS_API_BASE: &str = "https://graph.threads.net";
const SEARCH_PATH: &str = "/v1.0/keyword_search";
const FIELDS: &str = "id,text,permalink,username,timestamp";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    text: Option<String>,
    permalink: Option<String>,
    username: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug)]
pub struct ThreadsAdapter {
    fetcher: Fetcher,
    access_token: Option<String>,
    api_base: String,
}

impl ThreadsAdapter {
    #[must_use]
    pub fn new(fetcher: Fetcher, access_token: Option<String>) -> Self {
        Self {
            fetcher,
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            api_base: THREADS_API_BASE.to_owned(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_owned();
        self
    }

    async fn search(&self, token: &str, term: &str) -> Result<SearchResponse, SourceError> {
        let url = format!("{}{SEARCH_PATH}", self.api_base);
        self.fetcher
            .get_json(
                &url,
                &[("q", term), ("search_type", "RECENT"), ("fields", FIELDS)],
                token,
            )
            .await
    }
}

fn to_candidates(response: SearchResponse) -> Vec<ArticleCandidate> {
    response
        .data
        .into_iter()
        .filter_map(|post| {
            let text = post.text.filter(|t| !t.trim().is_empty())?;
            let permalink = post.permalink.filter(|p| !p.trim().is_empty())?;

            let mut candidate =
                ArticleCandidate::new(THREADS_SOURCE, &permalink, &post_title(&text))
                    .with_content(Some(text));
            candidate.author = post.username;
            candidate.published_at = post.timestamp.as_deref().and_then(parse_published);
            Some(candidate)
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for ThreadsAdapter {
    fn source(&self) -> &'static str {
        THREADS_SOURCE
    }

    async fn scrape(&self, terms: &[String]) -> Vec<ArticleCandidate> {
        let Some(token) = self.access_token.as_deref() else {
            warn_missing_credentials(THREADS_SOURCE, "THREADS_ACCESS_TOKEN");
            return Vec::new();
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();
        for term in terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            match self.search(token, term).await {
                Ok(response) => candidates.extend(
                    to_candidates(response)
                        .into_iter()
                        .filter(|c| seen.insert(c.url.clone())),
                ),
                Err(e) => {
                    tracing::warn!(source = THREADS_SOURCE, term, error = %e, "search failed");
                }
            }
        }

        tracing::info!(
            source = THREADS_SOURCE,
            posts = candidates.len(),
            "scrape finished"
        );
        candidates
    }
}

//! Twitter/X posts via the API v2 recent search endpoint.
//!
//! Disabled (empty results plus a warning) when no bearer token is set.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use ecoa_core::ArticleCandidate;
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::error::SourceError;
use crate::fetcher::Fetcher;
use crate::html::parse_published;
use crate::social::{post_title, warn_missing_credentials};

pub const TWITTER_SOURCE: &str = "twitter";
pub const TWITTER_API_BASE: &str = "https://api.twitter.com";
const SEARCH_PATH: &str = "/2/tweets/search/recent";
const MAX_RESULTS: &str = "50";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    includes: Includes,
    /// Query-level problems reported with a 200 status.
    #[serde(default)]
    errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    title: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: String,
    name: Option<String>,
}

#[derive(Debug)]
pub struct TwitterAdapter {
    fetcher: Fetcher,
    bearer_token: Option<String>,
    api_base: String,
}

impl TwitterAdapter {
    #[must_use]
    pub fn new(fetcher: Fetcher, bearer_token: Option<String>) -> Self {
        Self {
            fetcher,
            bearer_token: bearer_token.filter(|t| !t.trim().is_empty()),
            api_base: TWITTER_API_BASE.to_owned(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_owned();
        self
    }

    async fn search(&self, token: &str, term: &str) -> Result<SearchResponse, SourceError> {
        let url = format!("{}{SEARCH_PATH}", self.api_base);
        let query = format!("{term} lang:pt -is:retweet");
        let response: SearchResponse = self
            .fetcher
            .get_json(
                &url,
                &[
                    ("query", query.as_str()),
                    ("max_results", MAX_RESULTS),
                    ("tweet.fields", "created_at,author_id"),
                    ("expansions", "author_id"),
                    ("user.fields", "username,name"),
                ],
                token,
            )
            .await?;

        if response.data.is_empty() {
            if let Some(problem) = response.errors.first() {
                let reason = problem
                    .detail
                    .clone()
                    .or_else(|| problem.title.clone())
                    .unwrap_or_else(|| "unknown error".to_owned());
                return Err(SourceError::Api {
                    source_id: TWITTER_SOURCE,
                    reason,
                });
            }
        }
        Ok(response)
    }
}

fn to_candidates(response: SearchResponse) -> Vec<ArticleCandidate> {
    let users: HashMap<&str, &User> = response
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u))
        .collect();

    response
        .data
        .iter()
        .filter(|tweet| !tweet.text.trim().is_empty())
        .map(|tweet| {
            let user = tweet
                .author_id
                .as_deref()
                .and_then(|id| users.get(id).copied());
            let url = match user {
                Some(u) => format!("https://twitter.com/{}/status/{}", u.username, tweet.id),
                None => format!("https://twitter.com/i/web/status/{}", tweet.id),
            };

            let mut candidate =
                ArticleCandidate::new(TWITTER_SOURCE, &url, &post_title(&tweet.text))
                    .with_content(Some(tweet.text.clone()));
            candidate.author = user.map(|u| match &u.name {
                Some(name) => format!("@{} ({name})", u.username),
                None => format!("@{}", u.username),
            });
            candidate.published_at = tweet.created_at.as_deref().and_then(parse_published);
            candidate
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for TwitterAdapter {
    fn source(&self) -> &'static str {
        TWITTER_SOURCE
    }

    async fn scrape(&self, terms: &[String]) -> Vec<ArticleCandidate> {
        let Some(token) = self.bearer_token.as_deref() else {
            warn_missing_credentials(TWITTER_SOURCE, "TWITTER_BEARER_TOKEN");
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
                    tracing::warn!(source = TWITTER_SOURCE, term, error = %e, "search failed");
                }
            }
        }

        tracing::info!(
            source = TWITTER_SOURCE,
            posts = candidates.len(),
            "scrape finished"
        );
        candidates
    }
}

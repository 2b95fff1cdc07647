//! Single-shot HTTP GET with browser-like headers.

use std::time::Duration;

use ecoa_core::{AppConfig, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER};
use reqwest::{redirect, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::retry::retry_with_backoff;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const MAX_REDIRECTS: usize = 10;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// Extra attempts after the first for 429s and network failures.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_owned(),
            max_retries: 1,
            backoff_base_secs: 2,
        }
    }
}

impl FetcherConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            user_agent: config.fetch_user_agent.clone(),
            accept_language: config.fetch_accept_language.clone(),
            max_retries: config.fetch_max_retries,
            backoff_base_secs: config.fetch_retry_backoff_base_secs,
        }
    }
}

/// Shared HTTP client for every adapter. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl Fetcher {
    /// Builds the client: timeout, `User-Agent`, `Accept`, `Accept-Language`
    /// and a redirect limit of 10.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if a header value is invalid or the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn new(config: &FetcherConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| SourceError::Client(format!("Accept-Language: {e}")))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(
                CONNECT_TIMEOUT_SECS.min(config.timeout_secs),
            ))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff_base_secs: config.backoff_base_secs,
        })
    }

    /// Fetches `url` and returns its body, or `None` on any failure.
    ///
    /// Failures are logged here; callers treat `None` as "no page".
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url, error = %e, "fetch failed");
                None
            }
        }
    }

    /// Like [`Fetcher::fetch`], but surfaces the error.
    ///
    /// # Errors
    ///
    /// - [`SourceError::RateLimited`]: HTTP 429 after all retries.
    /// - [`SourceError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`SourceError::Http`]: network, timeout or body decoding failure.
    pub async fn try_fetch(&self, url: &str) -> Result<String, SourceError> {
        self.execute(url, |request| request).await
    }

    /// Authenticated JSON GET used by the social search APIs.
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::try_fetch`], plus [`SourceError::Parse`] when the
    /// body does not deserialize into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer_token: &str,
    ) -> Result<T, SourceError> {
        let body = self
            .execute(url, |request| {
                request
                    .query(query)
                    .bearer_auth(bearer_token)
                    .header(ACCEPT, "application/json")
            })
            .await?;
        serde_json::from_str(&body).map_err(|e| SourceError::parse(url, e.to_string()))
    }

    async fn execute<B>(&self, url: &str, build: B) -> Result<String, SourceError>
    where
        B: Fn(RequestBuilder) -> RequestBuilder,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let request = build(self.client.get(url));
            async move {
                let response = request.send().await.map_err(reqwest::Error::without_url)?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    return Err(SourceError::RateLimited {
                        url: url.to_owned(),
                        retry_after_secs,
                    });
                }
                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }
}

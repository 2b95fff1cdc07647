use std::time::Duration;

use crate::config::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    /// Only the commands that touch Postgres need it; see
    /// [`AppConfig::require_database_url`].
    pub database_url: Option<String>,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_user_agent: String,
    pub fetch_accept_language: String,
    pub fetch_max_retries: u32,
    pub fetch_retry_backoff_base_secs: u64,
    /// Upper bound on in-flight article fetches per source adapter.
    pub source_max_concurrency: usize,
    /// Source identifiers registered at startup, in configuration order.
    pub enabled_sources: Vec<String>,
    pub scrape_interval_minutes: u64,
    pub twitter_bearer_token: Option<String>,
    pub threads_access_token: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.scrape_interval_minutes.saturating_mul(60))
    }

    /// The Postgres URL, for callers that are about to connect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` is unset.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("fetch_accept_language", &self.fetch_accept_language)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field(
                "fetch_retry_backoff_base_secs",
                &self.fetch_retry_backoff_base_secs,
            )
            .field("source_max_concurrency", &self.source_max_concurrency)
            .field("enabled_sources", &self.enabled_sources)
            .field("scrape_interval_minutes", &self.scrape_interval_minutes)
            .field(
                "twitter_bearer_token",
                &self.twitter_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "threads_access_token",
                &self.threads_access_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

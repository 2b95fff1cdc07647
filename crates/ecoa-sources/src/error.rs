use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("{source_id} API error: {reason}")]
    Api {
        source_id: &'static str,
        reason: String,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl SourceError {
    pub(crate) fn parse(url: &str, reason: impl Into<String>) -> Self {
        SourceError::Parse {
            url: url.to_owned(),
            reason: reason.into(),
        }
    }
}

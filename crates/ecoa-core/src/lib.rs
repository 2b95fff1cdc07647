//! Domain types and configuration shared by the ECOA ingestion crates.

pub mod app_config;
pub mod articles;
pub mod config;
pub mod terms;

pub use app_config::AppConfig;
pub use articles::{
    canonicalize_url, url_hash, ArticleCandidate, NewArticle, SentimentLabel, StoredArticle,
    MAX_CONTENT_CHARS,
};
pub use config::{
    load_app_config, load_app_config_from_env, ConfigError, DEFAULT_ACCEPT_LANGUAGE,
    DEFAULT_USER_AGENT,
};
pub use terms::{distinct_term_texts, MonitoredTerm, TermMatch};

use thiserror::Error;

use crate::app_config::AppConfig;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";
pub(crate) const DEFAULT_SOURCES: &str = "g1,cnn,twitter,threads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = optional("DATABASE_URL");
    let log_level = or_default("ECOA_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("ECOA_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ECOA_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ECOA_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("ECOA_FETCH_TIMEOUT_SECS", "30")?;
    let fetch_user_agent = or_default("ECOA_FETCH_USER_AGENT", DEFAULT_USER_AGENT);
    let fetch_accept_language = or_default("ECOA_FETCH_ACCEPT_LANGUAGE", DEFAULT_ACCEPT_LANGUAGE);
    let fetch_max_retries = parse_u32("ECOA_FETCH_MAX_RETRIES", "1")?;
    let fetch_retry_backoff_base_secs = parse_u64("ECOA_FETCH_RETRY_BACKOFF_BASE_SECS", "2")?;

    let source_max_concurrency = parse_usize("ECOA_SOURCE_MAX_CONCURRENCY", "4")?;
    if source_max_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ECOA_SOURCE_MAX_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let enabled_sources = parse_source_list(&or_default("ECOA_ENABLED_SOURCES", DEFAULT_SOURCES));

    let scrape_interval_minutes = parse_u64("ECOA_SCRAPE_INTERVAL_MINUTES", "30")?;
    if scrape_interval_minutes == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ECOA_SCRAPE_INTERVAL_MINUTES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_user_agent,
        fetch_accept_language,
        fetch_max_retries,
        fetch_retry_backoff_base_secs,
        source_max_concurrency,
        enabled_sources,
        scrape_interval_minutes,
        twitter_bearer_token: optional("TWITTER_BEARER_TOKEN"),
        threads_access_token: optional("THREADS_ACCESS_TOKEN"),
    })
}

/// Split a comma-separated source list, lowercasing and dropping blanks and repeats.
fn parse_source_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in raw.split(',').map(|s| s.trim().to_lowercase()) {
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

//! Source identifier to adapter lookup, built from configuration.

use std::sync::Arc;

use ecoa_core::AppConfig;

use crate::adapter::{HtmlAdapter, SourceAdapter};
use crate::cnn::{CNN, CNN_SOURCE};
use crate::error::SourceError;
use crate::fetcher::{Fetcher, FetcherConfig};
use crate::g1::{G1, G1_SOURCE};
use crate::threads::{ThreadsAdapter, THREADS_SOURCE};
use crate::twitter::{TwitterAdapter, TWITTER_SOURCE};

/// Registered adapters in registration order, at most one per source id.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one adapter per entry of `config.enabled_sources`, sharing a
    /// single [`Fetcher`]. Unknown identifiers are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let fetcher = Fetcher::new(&FetcherConfig::from_app_config(config))?;
        let limit = config.source_max_concurrency;
        let mut registry = Self::new();

        for id in &config.enabled_sources {
            let adapter: Arc<dyn SourceAdapter> = match id.as_str() {
                G1_SOURCE => Arc::new(HtmlAdapter::new(&G1, fetcher.clone(), limit)?),
                CNN_SOURCE => Arc::new(HtmlAdapter::new(&CNN, fetcher.clone(), limit)?),
                TWITTER_SOURCE => Arc::new(TwitterAdapter::new(
                    fetcher.clone(),
                    config.twitter_bearer_token.clone(),
                )),
                THREADS_SOURCE => Arc::new(ThreadsAdapter::new(
                    fetcher.clone(),
                    config.threads_access_token.clone(),
                )),
                other => {
                    tracing::warn!(
                        source = other,
                        "unknown source in ECOA_ENABLED_SOURCES, skipping"
                    );
                    continue;
                }
            };
            registry.register(adapter);
        }

        tracing::info!(sources = ?registry.ids(), "source registry ready");
        Ok(registry)
    }

    /// Adds `adapter`, replacing any adapter already registered under the
    /// same source id.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        let id = adapter.source();
        match self.adapters.iter_mut().find(|a| a.source() == id) {
            Some(slot) => *slot = adapter,
            None => self.adapters.push(adapter),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.source() == id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn SourceAdapter>> {
        self.adapters.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.ids())
            .finish()
    }
}

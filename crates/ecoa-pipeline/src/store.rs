//! Persistence seam for the orchestrator.
//!
//! [`PgStore`] is the production backend. [`MemoryStore`] keeps the same
//! uniqueness rules in process and backs dry runs and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use ecoa_core::{MonitoredTerm, NewArticle, StoredArticle, TermMatch};
use ecoa_db::DbError;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An article with this URL hash already exists.
    #[error("article with url hash {url_hash} already exists")]
    Conflict { url_hash: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { url_hash } => StoreError::Conflict { url_hash },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find_by_url_hash(&self, url_hash: &str) -> Result<Option<StoredArticle>, StoreError>;

    /// Writes a new article.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] when the URL hash is already stored.
    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle, StoreError>;

    /// Active terms across all owners.
    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError>;

    /// Records a match. Returns `false` when the `(article, term)` pair
    /// already existed and nothing was written.
    async fn insert_term_match(&self, term_match: &TermMatch) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn find_by_url_hash(&self, url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        let row = ecoa_db::find_article_by_url_hash(&self.pool, url_hash).await?;
        Ok(row.map(StoredArticle::try_from).transpose()?)
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle, StoreError> {
        let row = ecoa_db::insert_article(&self.pool, article).await?;
        Ok(StoredArticle::try_from(row)?)
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        let rows = ecoa_db::list_active_terms(&self.pool).await?;
        Ok(rows.into_iter().map(MonitoredTerm::from).collect())
    }

    async fn insert_term_match(&self, term_match: &TermMatch) -> Result<bool, StoreError> {
        Ok(ecoa_db::insert_term_match(&self.pool, term_match).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryState {
    articles: Vec<StoredArticle>,
    terms: Vec<MonitoredTerm>,
    matches: HashMap<(Uuid, Uuid), u32>,
}

/// Process-local store with the same uniqueness rules as the database:
/// one article per URL hash, one match per `(article, term)` pair.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_terms(terms: Vec<MonitoredTerm>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                terms,
                ..MemoryState::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_owned()))
    }

    /// Stored articles in insertion order.
    #[must_use]
    pub fn articles(&self) -> Vec<StoredArticle> {
        self.lock().map(|s| s.articles.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn term_matches(&self) -> Vec<TermMatch> {
        self.lock()
            .map(|s| {
                s.matches
                    .iter()
                    .map(|(&(article_id, term_id), &occurrence_count)| TermMatch {
                        article_id,
                        term_id,
                        occurrence_count,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find_by_url_hash(&self, url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .articles
            .iter()
            .find(|a| a.url_hash == url_hash)
            .cloned())
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle, StoreError> {
        let mut state = self.lock()?;
        if state.articles.iter().any(|a| a.url_hash == article.url_hash) {
            return Err(StoreError::Conflict {
                url_hash: article.url_hash.clone(),
            });
        }
        let stored = StoredArticle::from_new(Uuid::new_v4(), article);
        state.articles.push(stored.clone());
        Ok(stored)
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        let state = self.lock()?;
        Ok(state.terms.iter().filter(|t| t.active).cloned().collect())
    }

    async fn insert_term_match(&self, term_match: &TermMatch) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let key = (term_match.article_id, term_match.term_id);
        if state.matches.contains_key(&key) {
            return Ok(false);
        }
        state.matches.insert(key, term_match.occurrence_count);
        Ok(true)
    }
}

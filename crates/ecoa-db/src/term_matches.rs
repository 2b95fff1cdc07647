//! Database operations for the `news_term_matches` table.

use chrono::{DateTime, Utc};
use ecoa_core::TermMatch;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `news_term_matches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TermMatchRow {
    pub id: i64,
    pub article_id: Uuid,
    pub term_id: Uuid,
    pub match_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Record a term match. An existing `(article_id, term_id)` pair is left
/// untouched.
///
/// Returns `true` if a row was inserted, `false` if the pair already existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_term_match(pool: &PgPool, term_match: &TermMatch) -> Result<bool, DbError> {
    let count = i32::try_from(term_match.occurrence_count).unwrap_or(i32::MAX);

    let inserted = sqlx::query(
        "INSERT INTO news_term_matches (article_id, term_id, match_count) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (article_id, term_id) DO NOTHING",
    )
    .bind(term_match.article_id)
    .bind(term_match.term_id)
    .bind(count)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(inserted > 0)
}

/// Returns the matches recorded for one article, ordered by insertion.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_term_matches_for_article(
    pool: &PgPool,
    article_id: Uuid,
) -> Result<Vec<TermMatchRow>, DbError> {
    let rows = sqlx::query_as::<_, TermMatchRow>(
        "SELECT id, article_id, term_id, match_count, created_at \
         FROM news_term_matches \
         WHERE article_id = $1 \
         ORDER BY id",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

//! Database operations for the `news_articles` table.

use chrono::{DateTime, Utc};
use ecoa_core::{NewArticle, SentimentLabel, StoredArticle};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const URL_HASH_CONSTRAINT: &str = "uq_news_articles_url_hash";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `news_articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub source: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub url_hash: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for StoredArticle {
    type Error = DbError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let sentiment_label =
            row.sentiment
                .parse::<SentimentLabel>()
                .map_err(|reason| DbError::InvalidRow {
                    table: "news_articles",
                    reason,
                })?;
        Ok(StoredArticle {
            id: row.id,
            source: row.source,
            title: row.title,
            summary: row.summary,
            content: row.content,
            url: row.url,
            url_hash: row.url_hash,
            image_url: row.image_url,
            author: row.author,
            published_at: row.published_at,
            scraped_at: row.scraped_at,
            sentiment_label,
            sentiment_score: row.sentiment_score,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the article whose `url_hash` matches, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_article_by_url_hash(
    pool: &PgPool,
    url_hash: &str,
) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, source, title, summary, content, url, url_hash, image_url, author, \
                published_at, scraped_at, sentiment, sentiment_score, created_at \
         FROM news_articles \
         WHERE url_hash = $1",
    )
    .bind(url_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a classified article and return the stored row.
///
/// The id is generated here. The `url_hash` unique constraint is the only
/// guard against duplicates, so a concurrent writer that got there first
/// surfaces as [`DbError::Conflict`].
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if an article with the same `url_hash`
/// exists, or [`DbError::Sqlx`] for any other failure.
pub async fn insert_article(pool: &PgPool, article: &NewArticle) -> Result<ArticleRow, DbError> {
    let id = Uuid::new_v4();
    let c = &article.candidate;

    let result = sqlx::query_as::<_, ArticleRow>(
        "INSERT INTO news_articles \
             (id, source, title, summary, content, url, url_hash, image_url, author, \
              published_at, scraped_at, sentiment, sentiment_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING id, source, title, summary, content, url, url_hash, image_url, author, \
                   published_at, scraped_at, sentiment, sentiment_score, created_at",
    )
    .bind(id)
    .bind(&c.source)
    .bind(&c.title)
    .bind(c.summary.as_deref())
    .bind(c.content.as_deref())
    .bind(&c.url)
    .bind(&article.url_hash)
    .bind(c.image_url.as_deref())
    .bind(c.author.as_deref())
    .bind(c.published_at)
    .bind(article.scraped_at)
    .bind(article.sentiment_label.as_str())
    .bind(article.sentiment_score)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db_err))
            if db_err.is_unique_violation()
                && db_err.constraint() == Some(URL_HASH_CONSTRAINT) =>
        {
            Err(DbError::Conflict {
                url_hash: article.url_hash.clone(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sentiment: &str) -> ArticleRow {
        ArticleRow {
            id: Uuid::new_v4(),
            source: "g1".to_string(),
            title: "Economia em alta".to_string(),
            summary: None,
            content: None,
            url: "https://g1.globo.com/economia/noticia/a.ghtml".to_string(),
            url_hash: "0".repeat(64),
            image_url: None,
            author: None,
            published_at: None,
            scraped_at: Utc::now(),
            sentiment: sentiment.to_string(),
            sentiment_score: 0.25,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_stored_article() {
        let stored = StoredArticle::try_from(row("positive")).expect("valid row");
        assert_eq!(stored.sentiment_label, SentimentLabel::Positive);
        assert_eq!(stored.source, "g1");
    }

    #[test]
    fn row_with_unknown_sentiment_is_invalid() {
        let err = StoredArticle::try_from(row("ecstatic")).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow { table: "news_articles", .. }));
    }
}

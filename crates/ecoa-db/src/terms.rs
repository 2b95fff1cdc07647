//! Read access to the `monitored_terms` table.

use ecoa_core::MonitoredTerm;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `monitored_terms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TermRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub term: String,
    pub is_active: bool,
}

impl From<TermRow> for MonitoredTerm {
    fn from(row: TermRow) -> Self {
        MonitoredTerm {
            id: row.id,
            owner_id: row.owner_id,
            text: row.term,
            active: row.is_active,
        }
    }
}

/// Returns every active term across all owners, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_terms(pool: &PgPool) -> Result<Vec<TermRow>, DbError> {
    let rows = sqlx::query_as::<_, TermRow>(
        "SELECT id, owner_id, term, is_active \
         FROM monitored_terms \
         WHERE is_active = true \
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

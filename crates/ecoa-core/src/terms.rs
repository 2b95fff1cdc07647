use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-owned watch term. Managed elsewhere; ingestion only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredTerm {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub text: String,
    pub active: bool,
}

/// Occurrence count of one term in one article. `occurrence_count` is always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatch {
    pub article_id: Uuid,
    pub term_id: Uuid,
    pub occurrence_count: u32,
}

/// Distinct search texts across `terms`, compared case-insensitively.
///
/// Inactive and blank terms are skipped. The first spelling seen wins and the
/// input order is preserved.
#[must_use]
pub fn distinct_term_texts(terms: &[MonitoredTerm]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    terms
        .iter()
        .filter(|t| t.active)
        .map(|t| t.text.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

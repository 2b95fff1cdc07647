//! Watch-term occurrence counting.

use ecoa_core::{MonitoredTerm, StoredArticle, TermMatch};

/// Counts every active term in the article's title and content.
///
/// Matching is case-insensitive, substring-based (no word boundaries) and
/// non-overlapping. Blank terms and terms with zero occurrences produce no
/// entry.
#[must_use]
pub fn match_terms(article: &StoredArticle, terms: &[MonitoredTerm]) -> Vec<TermMatch> {
    let title = article.title.to_lowercase();
    let content = article
        .content
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    terms
        .iter()
        .filter(|t| t.active)
        .filter_map(|term| {
            let needle = term.text.trim().to_lowercase();
            if needle.is_empty() {
                return None;
            }
            let count = occurrences(&title, &needle) + occurrences(&content, &needle);
            (count > 0).then(|| TermMatch {
                article_id: article.id,
                term_id: term.id,
                occurrence_count: count,
            })
        })
        .collect()
}

fn occurrences(haystack: &str, needle: &str) -> u32 {
    u32::try_from(haystack.matches(needle).count()).unwrap_or(u32::MAX)
}

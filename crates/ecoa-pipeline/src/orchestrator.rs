//! The ingestion job: collect terms, fetch, deduplicate, classify, persist
//! and match.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use ecoa_core::{distinct_term_texts, ArticleCandidate, MonitoredTerm, NewArticle};
use ecoa_sentiment::classify;
use ecoa_sources::SourceRegistry;

use crate::job::{JobStage, JobStatus, JobSummary};
use crate::matcher::match_terms;
use crate::store::{ArticleStore, StoreError};

/// Runs ingestion jobs against an injected store and set of adapters.
///
/// Holds no job state between runs; overlapping runs are safe because the
/// store rejects duplicate URL hashes.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn ArticleStore>,
    sources: SourceRegistry,
}

/// Per-run persistence tallies.
#[derive(Debug, Default)]
struct Tally {
    stored: usize,
    failed: usize,
    /// At least one article was written or recognised as already stored.
    store_reachable: bool,
}

impl Orchestrator {
    #[must_use]
    pub fn new(store: Arc<dyn ArticleStore>, sources: SourceRegistry) -> Self {
        Self { store, sources }
    }

    #[must_use]
    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Full job over every distinct active term.
    pub async fn run_scraping_job(&self) -> JobSummary {
        self.run(None).await
    }

    /// Job restricted to one caller-supplied term. The term is echoed in the
    /// summary; a blank term does nothing.
    pub async fn run_term_job(&self, term: &str) -> JobSummary {
        self.run(Some(term)).await
    }

    async fn run(&self, single_term: Option<&str>) -> JobSummary {
        let started = Instant::now();
        let echoed_term = single_term.map(str::to_owned);

        if single_term.is_some_and(|t| t.trim().is_empty()) {
            tracing::info!("blank term, nothing to do");
            return JobSummary::empty(Utc::now(), echoed_term);
        }

        enter(JobStage::CollectingTerms);
        let active_terms = match self.store.list_active_terms().await {
            Ok(terms) => terms,
            Err(e) => {
                tracing::error!(error = %e, "could not list active terms");
                enter(JobStage::Idle);
                return JobSummary {
                    status: JobStatus::Failed,
                    duration_seconds: started.elapsed().as_secs_f64(),
                    ..JobSummary::empty(Utc::now(), echoed_term)
                };
            }
        };
        let search_terms = match single_term {
            Some(term) => vec![term.trim().to_owned()],
            None => distinct_term_texts(&active_terms),
        };
        tracing::info!(
            active_terms = active_terms.len(),
            search_terms = search_terms.len(),
            "terms collected"
        );
        if search_terms.is_empty() {
            enter(JobStage::Idle);
            return JobSummary::empty(Utc::now(), echoed_term);
        }

        enter(JobStage::Fetching);
        let candidates = self.fetch_all(search_terms).await;
        let articles_found = candidates.len();

        let mut tally = Tally::default();

        enter(JobStage::Deduplicating);
        let fresh = self.deduplicate(candidates, &mut tally).await;

        enter(JobStage::Classifying);
        let scraped_at = Utc::now();
        let classified: Vec<NewArticle> = fresh
            .into_iter()
            .map(|(candidate, url_hash)| {
                let sentiment = classify(&candidate.title, candidate.content.as_deref());
                NewArticle {
                    candidate,
                    url_hash,
                    sentiment_label: sentiment.label,
                    sentiment_score: sentiment.score,
                    scraped_at,
                }
            })
            .collect();

        enter(JobStage::PersistingAndMatching);
        for article in &classified {
            self.persist(article, &active_terms, &mut tally).await;
        }

        let status = if tally.failed > 0 && !tally.store_reachable {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };
        let summary = JobSummary {
            status,
            articles_found,
            articles_stored: tally.stored,
            articles_failed: tally.failed,
            duration_seconds: started.elapsed().as_secs_f64(),
            timestamp: Utc::now(),
            term: echoed_term,
        };

        enter(JobStage::Idle);
        tracing::info!(
            status = ?summary.status,
            found = summary.articles_found,
            stored = summary.articles_stored,
            failed = summary.articles_failed,
            duration_seconds = summary.duration_seconds,
            "ingestion job finished"
        );
        summary
    }

    /// Runs every adapter as its own task. A panicking adapter contributes
    /// nothing.
    async fn fetch_all(&self, terms: Vec<String>) -> Vec<ArticleCandidate> {
        let terms: Arc<[String]> = terms.into();

        let handles: Vec<_> = self
            .sources
            .adapters()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let terms = Arc::clone(&terms);
                let source = adapter.source();
                (
                    source,
                    tokio::spawn(async move { adapter.scrape(&terms).await }),
                )
            })
            .collect();

        let mut candidates = Vec::new();
        for (source, handle) in handles {
            match handle.await {
                Ok(found) => {
                    tracing::info!(source, candidates = found.len(), "adapter finished");
                    candidates.extend(found);
                }
                Err(e) => {
                    tracing::error!(source, error = %e, "adapter task failed");
                }
            }
        }
        candidates
    }

    /// Drops candidates without a title and those whose URL hash is already
    /// stored or was already seen in this run. A URL whose lookup failed is
    /// counted as failed once.
    async fn deduplicate(
        &self,
        candidates: Vec<ArticleCandidate>,
        tally: &mut Tally,
    ) -> Vec<(ArticleCandidate, String)> {
        let mut accepted: HashSet<String> = HashSet::new();
        let mut fresh = Vec::new();

        for candidate in candidates {
            if !candidate.has_required_fields() {
                tracing::debug!(
                    source = %candidate.source,
                    url = %candidate.url,
                    "rejecting candidate without title"
                );
                continue;
            }
            let url_hash = candidate.url_hash();
            if accepted.contains(&url_hash) {
                continue;
            }
            match self.store.find_by_url_hash(&url_hash).await {
                Ok(Some(_)) => {
                    tally.store_reachable = true;
                    accepted.insert(url_hash);
                }
                Ok(None) => {
                    accepted.insert(url_hash.clone());
                    fresh.push((candidate, url_hash));
                }
                Err(e) => {
                    tracing::warn!(url = %candidate.url, error = %e, "duplicate lookup failed");
                    accepted.insert(url_hash);
                    tally.failed += 1;
                }
            }
        }

        tracing::info!(fresh = fresh.len(), "deduplicated candidates");
        fresh
    }

    async fn persist(
        &self,
        article: &NewArticle,
        active_terms: &[MonitoredTerm],
        tally: &mut Tally,
    ) {
        let url = article.candidate.url.as_str();
        let stored = match self.store.insert_article(article).await {
            Ok(stored) => stored,
            Err(StoreError::Conflict { .. }) => {
                tally.store_reachable = true;
                tracing::debug!(url, "already ingested");
                return;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to store article");
                tally.failed += 1;
                return;
            }
        };
        tally.store_reachable = true;
        tally.stored += 1;

        for term_match in match_terms(&stored, active_terms) {
            if let Err(e) = self.store.insert_term_match(&term_match).await {
                tracing::warn!(
                    article_id = %term_match.article_id,
                    term_id = %term_match.term_id,
                    error = %e,
                    "failed to record term match"
                );
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

fn enter(stage: JobStage) {
    tracing::info!(stage = %stage, "job stage");
}

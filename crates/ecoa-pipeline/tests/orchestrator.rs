//! Orchestrator behaviour against `MemoryStore` and scripted adapters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ecoa_core::{
    ArticleCandidate, MonitoredTerm, NewArticle, SentimentLabel, StoredArticle, TermMatch,
};
use ecoa_pipeline::{ArticleStore, JobStatus, MemoryStore, Orchestrator, StoreError};
use ecoa_sources::{SourceAdapter, SourceRegistry};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Returns the same candidates on every call and records the terms it saw.
struct Scripted {
    id: &'static str,
    candidates: Vec<ArticleCandidate>,
    calls: AtomicUsize,
    last_terms: std::sync::Mutex<Vec<String>>,
}

impl Scripted {
    fn new(id: &'static str, candidates: Vec<ArticleCandidate>) -> Arc<Self> {
        Arc::new(Self {
            id,
            candidates,
            calls: AtomicUsize::new(0),
            last_terms: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for Scripted {
    fn source(&self) -> &'static str {
        self.id
    }

    async fn scrape(&self, terms: &[String]) -> Vec<ArticleCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_terms.lock().unwrap() = terms.to_vec();
        self.candidates.clone()
    }
}

struct Panicking;

#[async_trait]
impl SourceAdapter for Panicking {
    fn source(&self) -> &'static str {
        "broken"
    }

    async fn scrape(&self, _terms: &[String]) -> Vec<ArticleCandidate> {
        panic!("adapter exploded");
    }
}

/// Lists terms fine but cannot write anything.
struct ReadOnlyStore {
    terms: Vec<MonitoredTerm>,
}

#[async_trait]
impl ArticleStore for ReadOnlyStore {
    async fn find_by_url_hash(&self, _url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        Ok(None)
    }

    async fn insert_article(&self, _article: &NewArticle) -> Result<StoredArticle, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        Ok(self.terms.clone())
    }

    async fn insert_term_match(&self, _term_match: &TermMatch) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_owned()))
    }
}

/// Yields before every lookup so overlapping runs interleave, and counts
/// inserts rejected as duplicates.
struct YieldingStore {
    inner: MemoryStore,
    conflicts: AtomicUsize,
}

#[async_trait]
impl ArticleStore for YieldingStore {
    async fn find_by_url_hash(&self, url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        tokio::task::yield_now().await;
        self.inner.find_by_url_hash(url_hash).await
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle, StoreError> {
        let result = self.inner.insert_article(article).await;
        if matches!(result, Err(StoreError::Conflict { .. })) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        self.inner.list_active_terms().await
    }

    async fn insert_term_match(&self, term_match: &TermMatch) -> Result<bool, StoreError> {
        self.inner.insert_term_match(term_match).await
    }
}

/// Another writer always wins between lookup and insert.
struct RacedStore {
    terms: Vec<MonitoredTerm>,
}

#[async_trait]
impl ArticleStore for RacedStore {
    async fn find_by_url_hash(&self, _url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        Ok(None)
    }

    async fn insert_article(&self, article: &NewArticle) -> Result<StoredArticle, StoreError> {
        Err(StoreError::Conflict {
            url_hash: article.url_hash.clone(),
        })
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        Ok(self.terms.clone())
    }

    async fn insert_term_match(&self, _term_match: &TermMatch) -> Result<bool, StoreError> {
        panic!("no article was stored, so nothing can match");
    }
}

/// Lists terms but every duplicate lookup fails.
struct LookupFailingStore {
    terms: Vec<MonitoredTerm>,
    lookups: AtomicUsize,
}

#[async_trait]
impl ArticleStore for LookupFailingStore {
    async fn find_by_url_hash(&self, _url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("timeout".to_owned()))
    }

    async fn insert_article(&self, _article: &NewArticle) -> Result<StoredArticle, StoreError> {
        Err(StoreError::Unavailable("timeout".to_owned()))
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        Ok(self.terms.clone())
    }

    async fn insert_term_match(&self, _term_match: &TermMatch) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("timeout".to_owned()))
    }
}

/// Takes a while before returning its candidates.
struct Slow {
    delay: std::time::Duration,
    candidates: Vec<ArticleCandidate>,
}

#[async_trait]
impl SourceAdapter for Slow {
    fn source(&self) -> &'static str {
        "slow"
    }

    async fn scrape(&self, _terms: &[String]) -> Vec<ArticleCandidate> {
        tokio::time::sleep(self.delay).await;
        self.candidates.clone()
    }
}

/// Cannot even list terms.
struct DownStore;

#[async_trait]
impl ArticleStore for DownStore {
    async fn find_by_url_hash(&self, _url_hash: &str) -> Result<Option<StoredArticle>, StoreError> {
        Err(StoreError::Unavailable("down".to_owned()))
    }

    async fn insert_article(&self, _article: &NewArticle) -> Result<StoredArticle, StoreError> {
        Err(StoreError::Unavailable("down".to_owned()))
    }

    async fn list_active_terms(&self) -> Result<Vec<MonitoredTerm>, StoreError> {
        Err(StoreError::Unavailable("down".to_owned()))
    }

    async fn insert_term_match(&self, _term_match: &TermMatch) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("down".to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn term(text: &str) -> MonitoredTerm {
    MonitoredTerm {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        text: text.to_owned(),
        active: true,
    }
}

fn candidate(source: &str, url: &str, title: &str, content: Option<&str>) -> ArticleCandidate {
    ArticleCandidate::new(source, url, title).with_content(content.map(str::to_owned))
}

fn registry(adapters: Vec<Arc<dyn SourceAdapter>>) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    registry
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stores_classifies_and_matches_new_articles() {
    let economia = term("economia");
    let store = Arc::new(MemoryStore::with_terms(vec![economia.clone(), term("copa")]));
    let g1 = Scripted::new(
        "g1",
        vec![candidate(
            "g1",
            "https://g1.globo.com/economia/noticia/alta.ghtml",
            "Economia em alta",
            Some("A economia cresce, diz economia"),
        )],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1.clone()]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.status, JobStatus::Completed);
    assert_eq!(summary.articles_found, 1);
    assert_eq!(summary.articles_stored, 1);
    assert_eq!(summary.articles_failed, 0);
    assert!(summary.term.is_none());

    let articles = store.articles();
    assert_eq!(articles.len(), 1);
    assert!((-1.0..=1.0).contains(&articles[0].sentiment_score));
    assert_eq!(
        articles[0].url_hash,
        ecoa_core::url_hash("https://g1.globo.com/economia/noticia/alta.ghtml")
    );

    let matches = store.term_matches();
    assert_eq!(matches.len(), 1, "copa has no occurrence and gets no match");
    assert_eq!(matches[0].term_id, economia.id);
    assert_eq!(matches[0].occurrence_count, 3);
}

#[tokio::test]
async fn second_run_over_same_candidates_stores_nothing() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("selic")]));
    let g1 = Scripted::new(
        "g1",
        vec![
            candidate("g1", "https://g1.globo.com/a", "Selic cai", None),
            candidate("g1", "https://g1.globo.com/b", "Selic sobe", None),
        ],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1]));

    let first = orchestrator.run_scraping_job().await;
    let second = orchestrator.run_scraping_job().await;

    assert_eq!(first.articles_stored, 2);
    assert_eq!(second.articles_found, 2);
    assert_eq!(second.articles_stored, 0);
    assert_eq!(store.articles().len(), 2);
}

#[tokio::test]
async fn same_url_from_two_sources_is_stored_once() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("dólar")]));
    let url = "https://www.cnnbrasil.com.br/economia/dolar";
    let a = Scripted::new("cnn", vec![candidate("cnn", url, "Dólar cai", None)]);
    let b = Scripted::new(
        "mirror",
        vec![candidate("mirror", &format!("{url}/?utm_source=x"), "Dólar cai", None)],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![a, b]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.articles_found, 2);
    assert_eq!(summary.articles_stored, 1);
    assert_eq!(store.articles().len(), 1);
}

#[tokio::test]
async fn no_active_terms_short_circuits_without_calling_adapters() {
    let mut inactive = term("economia");
    inactive.active = false;
    let store = Arc::new(MemoryStore::with_terms(vec![inactive, term("   ")]));
    let g1 = Scripted::new(
        "g1",
        vec![candidate("g1", "https://g1.globo.com/a", "Título", None)],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1.clone()]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.status, JobStatus::Completed);
    assert_eq!(summary.articles_found, 0);
    assert_eq!(summary.articles_stored, 0);
    assert_eq!(g1.calls(), 0);
    assert!(store.articles().is_empty());
}

#[tokio::test]
async fn adapters_receive_distinct_trimmed_terms() {
    let store = Arc::new(MemoryStore::with_terms(vec![
        term(" Petrobras "),
        term("petrobras"),
        term("Selic"),
    ]));
    let g1 = Scripted::new("g1", Vec::new());
    let orchestrator = Orchestrator::new(store, registry(vec![g1.clone()]));

    orchestrator.run_scraping_job().await;

    assert_eq!(
        *g1.last_terms.lock().unwrap(),
        vec!["Petrobras".to_owned(), "Selic".to_owned()]
    );
}

#[tokio::test]
async fn panicking_adapter_does_not_stop_the_others() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("economia")]));
    let cnn = Scripted::new(
        "cnn",
        vec![candidate("cnn", "https://www.cnnbrasil.com.br/a", "Economia", None)],
    );
    let orchestrator = Orchestrator::new(
        store.clone(),
        registry(vec![Arc::new(Panicking), cnn.clone()]),
    );

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.status, JobStatus::Completed);
    assert_eq!(summary.articles_found, 1);
    assert_eq!(summary.articles_stored, 1);
    assert_eq!(cnn.calls(), 1);
}

#[tokio::test]
async fn candidates_without_title_are_never_stored() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("economia")]));
    let g1 = Scripted::new(
        "g1",
        vec![
            candidate("g1", "https://g1.globo.com/blank", "   ", Some("economia")),
            candidate("g1", "https://g1.globo.com/ok", "Economia", None),
        ],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.articles_found, 2);
    assert_eq!(summary.articles_stored, 1);
    let urls: Vec<String> = store.articles().into_iter().map(|a| a.url).collect();
    assert_eq!(urls, vec!["https://g1.globo.com/ok".to_owned()]);
}

#[tokio::test]
async fn stored_sentiment_follows_title_and_content() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("petrobras")]));
    let g1 = Scripted::new(
        "g1",
        vec![
            candidate(
                "g1",
                "https://g1.globo.com/bom",
                "Petrobras tem lucro recorde",
                None,
            ),
            candidate(
                "g1",
                "https://g1.globo.com/ruim",
                "Escândalo na Petrobras",
                Some("fraude e corrupção"),
            ),
        ],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1]));

    orchestrator.run_scraping_job().await;

    let articles = store.articles();
    let label_of = |url: &str| {
        articles
            .iter()
            .find(|a| a.url == url)
            .map(|a| a.sentiment_label)
    };
    assert_eq!(label_of("https://g1.globo.com/bom"), Some(SentimentLabel::Positive));
    assert_eq!(label_of("https://g1.globo.com/ruim"), Some(SentimentLabel::Negative));
}

#[tokio::test]
async fn overlapping_runs_store_each_url_once() {
    let store = Arc::new(YieldingStore {
        inner: MemoryStore::with_terms(vec![term("economia")]),
        conflicts: AtomicUsize::new(0),
    });
    let candidates: Vec<ArticleCandidate> = (0..20)
        .map(|i| candidate("g1", &format!("https://g1.globo.com/n/{i}"), "Economia", None))
        .collect();
    let first = Orchestrator::new(
        store.clone(),
        registry(vec![Scripted::new("g1", candidates.clone())]),
    );
    let second = Orchestrator::new(store.clone(), registry(vec![Scripted::new("g1", candidates)]));

    let (a, b) = tokio::join!(first.run_scraping_job(), second.run_scraping_job());

    assert_eq!(a.articles_stored + b.articles_stored, 20);
    assert_eq!(a.articles_failed + b.articles_failed, 0);
    assert_eq!(a.status, JobStatus::Completed);
    assert_eq!(b.status, JobStatus::Completed);
    assert_eq!(store.inner.articles().len(), 20);
    assert!(
        store.conflicts.load(Ordering::SeqCst) > 0,
        "both runs should have reached the insert for some URL"
    );
}

#[tokio::test]
async fn insert_conflict_after_lookup_counts_as_already_ingested() {
    let store = Arc::new(RacedStore {
        terms: vec![term("economia")],
    });
    let g1 = Scripted::new(
        "g1",
        vec![candidate("g1", "https://g1.globo.com/raced", "Economia", None)],
    );
    let orchestrator = Orchestrator::new(store, registry(vec![g1]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.status, JobStatus::Completed);
    assert_eq!(summary.articles_found, 1);
    assert_eq!(summary.articles_stored, 0);
    assert_eq!(summary.articles_failed, 0);
}

#[tokio::test]
async fn term_job_uses_only_the_given_term_and_echoes_it() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("economia"), term("selic")]));
    let g1 = Scripted::new(
        "g1",
        vec![candidate("g1", "https://g1.globo.com/s", "Selic e economia", None)],
    );
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1.clone()]));

    let summary = orchestrator.run_term_job("  Selic ").await;

    assert_eq!(summary.term.as_deref(), Some("  Selic "));
    assert_eq!(summary.articles_stored, 1);
    assert_eq!(*g1.last_terms.lock().unwrap(), vec!["Selic".to_owned()]);
    // matching still runs against every active term
    assert_eq!(store.term_matches().len(), 2);
}

#[tokio::test]
async fn blank_term_job_does_nothing() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("economia")]));
    let g1 = Scripted::new("g1", Vec::new());
    let orchestrator = Orchestrator::new(store, registry(vec![g1.clone()]));

    let summary = orchestrator.run_term_job("   ").await;

    assert_eq!(summary.status, JobStatus::Completed);
    assert_eq!(summary.articles_found, 0);
    assert_eq!(summary.term.as_deref(), Some("   "));
    assert_eq!(g1.calls(), 0);
}

#[tokio::test]
async fn unreachable_store_fails_the_job() {
    let g1 = Scripted::new("g1", Vec::new());
    let orchestrator = Orchestrator::new(Arc::new(DownStore), registry(vec![g1.clone()]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.status, JobStatus::Failed);
    assert_eq!(g1.calls(), 0);
}

#[tokio::test]
async fn every_write_failing_fails_the_job() {
    let store = Arc::new(ReadOnlyStore {
        terms: vec![term("economia")],
    });
    let g1 = Scripted::new(
        "g1",
        vec![
            candidate("g1", "https://g1.globo.com/1", "Economia", None),
            candidate("g1", "https://g1.globo.com/2", "Economia", None),
        ],
    );
    let orchestrator = Orchestrator::new(store, registry(vec![g1]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.articles_found, 2);
    assert_eq!(summary.articles_stored, 0);
    assert_eq!(summary.articles_failed, 2);
    assert_eq!(summary.status, JobStatus::Failed);
}

#[tokio::test]
async fn failed_lookup_for_a_url_seen_twice_counts_once() {
    let store = Arc::new(LookupFailingStore {
        terms: vec![term("economia")],
        lookups: AtomicUsize::new(0),
    });
    let url = "https://g1.globo.com/economia/a";
    let g1 = Scripted::new("g1", vec![candidate("g1", url, "Economia", None)]);
    let mirror = Scripted::new("mirror", vec![candidate("mirror", url, "Economia", None)]);
    let orchestrator = Orchestrator::new(store.clone(), registry(vec![g1, mirror]));

    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.articles_found, 2);
    assert_eq!(summary.articles_failed, 1);
    assert_eq!(summary.status, JobStatus::Failed);
    assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn summary_timestamp_is_taken_when_the_run_ends() {
    let store = Arc::new(MemoryStore::with_terms(vec![term("economia")]));
    let slow = Arc::new(Slow {
        delay: std::time::Duration::from_millis(50),
        candidates: vec![candidate("slow", "https://g1.globo.com/lenta", "Economia", None)],
    });
    let orchestrator = Orchestrator::new(store, registry(vec![slow]));

    let before = chrono::Utc::now();
    let summary = orchestrator.run_scraping_job().await;

    assert_eq!(summary.articles_stored, 1);
    assert!(summary.timestamp - before >= chrono::Duration::milliseconds(50));
}

//! Job stages and the summary a run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stages, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Idle,
    CollectingTerms,
    Fetching,
    Deduplicating,
    Classifying,
    PersistingAndMatching,
}

impl JobStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStage::Idle => "idle",
            JobStage::CollectingTerms => "collecting_terms",
            JobStage::Fetching => "fetching",
            JobStage::Deduplicating => "deduplicating",
            JobStage::Classifying => "classifying",
            JobStage::PersistingAndMatching => "persisting_and_matching",
        }
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub status: JobStatus,
    /// Candidates returned by all adapters, before any filtering.
    pub articles_found: usize,
    /// New articles written in this run.
    pub articles_stored: usize,
    /// Articles dropped because the store could not be reached.
    pub articles_failed: usize,
    pub duration_seconds: f64,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// The caller-supplied term of a single-term run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

impl JobSummary {
    /// A run that did nothing: no terms, or a blank single term.
    #[must_use]
    pub fn empty(timestamp: DateTime<Utc>, term: Option<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            articles_found: 0,
            articles_stored: 0,
            articles_failed: 0,
            duration_seconds: 0.0,
            timestamp,
            term,
        }
    }
}

//! Ingestion pipeline: the persistence seam, the term matcher and the
//! orchestrator that drives a job end to end.

pub mod job;
pub mod matcher;
pub mod orchestrator;
pub mod store;

pub use job::{JobStage, JobStatus, JobSummary};
pub use matcher::match_terms;
pub use orchestrator::Orchestrator;
pub use store::{ArticleStore, MemoryStore, PgStore, StoreError};

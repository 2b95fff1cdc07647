//! News source adapters: the HTTP fetcher, the G1 and CNN Brasil HTML
//! adapters, the credential-gated Twitter and Threads adapters, and the
//! registry the orchestrator iterates over.

pub mod adapter;
pub mod cnn;
pub mod error;
pub mod fetcher;
pub mod g1;
pub(crate) mod html;
pub mod registry;
pub(crate) mod retry;
pub(crate) mod social;
pub mod threads;
pub mod twitter;

pub use adapter::{
    HtmlAdapter, LinkRule, SiteRules, SourceAdapter, MAX_ARTICLES_PER_TERM,
    MAX_DISCOVERED_PER_TERM,
};
pub use cnn::{CNN, CNN_SOURCE};
pub use error::SourceError;
pub use fetcher::{Fetcher, FetcherConfig};
pub use g1::{G1, G1_SOURCE};
pub use registry::SourceRegistry;
pub use threads::{ThreadsAdapter, THREADS_SOURCE};
pub use twitter::{TwitterAdapter, TWITTER_SOURCE};

//! Lexical sentiment scoring for ingested news.
//!
//! [`polarity`] scores free text against a Portuguese/English lexicon;
//! [`classify`] blends title and body polarity into a labeled score.

pub mod classifier;
pub mod lexicon;

pub use classifier::{blend, classify, label_for, Sentiment};
pub use lexicon::polarity;

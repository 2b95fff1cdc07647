//! Title/body sentiment blending.

use ecoa_core::SentimentLabel;

use crate::lexicon::polarity;

/// Share of the combined score carried by the title when a body is present.
const TITLE_WEIGHT: f64 = 0.6;
/// Share of the combined score carried by the body.
const CONTENT_WEIGHT: f64 = 0.4;
/// Scores strictly above this are positive; strictly below its negation, negative.
const LABEL_THRESHOLD: f64 = 0.1;

/// A labeled polarity score in `[-1.0, 1.0]`, rounded to three decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        label: SentimentLabel::Neutral,
        score: 0.0,
    };
}

/// Classify an article from its title and optional body.
///
/// A blank title short-circuits to neutral `0.0` without scoring the body.
/// A blank body counts as absent.
#[must_use]
pub fn classify(title: &str, content: Option<&str>) -> Sentiment {
    if title.trim().is_empty() {
        return Sentiment::NEUTRAL;
    }

    let title_polarity = round3(polarity(title));
    let content_polarity = content
        .filter(|c| !c.trim().is_empty())
        .map(|c| round3(polarity(c)));

    blend(title_polarity, content_polarity)
}

/// Combine title and body polarity (60/40 when a body is present) and label it.
#[must_use]
pub fn blend(title_polarity: f64, content_polarity: Option<f64>) -> Sentiment {
    let combined = match content_polarity {
        Some(content) => TITLE_WEIGHT * title_polarity + CONTENT_WEIGHT * content,
        None => title_polarity,
    };
    let score = round3(combined.clamp(-1.0, 1.0));
    Sentiment {
        label: label_for(score),
        score,
    }
}

/// Threshold a score into a label.
#[must_use]
pub fn label_for(score: f64) -> SentimentLabel {
    if score > LABEL_THRESHOLD {
        SentimentLabel::Positive
    } else if score < -LABEL_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

//! Shared mapping rules for social post adapters.

/// Characters of post text kept in the title.
const TITLE_CHARS: usize = 100;

/// Post text cut to 100 characters, with `...` appended when cut.
pub(crate) fn post_title(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(TITLE_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

pub(crate) fn warn_missing_credentials(source: &'static str, env_var: &'static str) {
    tracing::warn!(
        source,
        env_var,
        "credentials not configured, source disabled for this run"
    );
}

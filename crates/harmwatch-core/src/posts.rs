use serde::{Deserialize, Serialize};

/// A piece of page content, normalized into the canonical shape shipped to
/// the collector. Every field has a defined value; optional fields stay
/// `None` rather than empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPost {
    /// Strategy tag, e.g. `"twitter"` or `"generic"`. Never empty.
    pub platform: String,
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    /// ISO-8601 when parseable; otherwise the best-effort raw page value.
    pub timestamp: String,
    pub post_text: String,
    /// Deduplicated `#tags` in first-seen order.
    pub hashtags: Vec<String>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub source_url: String,
    pub category: Option<String>,
    pub sentiment: Option<String>,
}

impl NormalizedPost {
    /// Returns `true` when the post carries any non-whitespace text.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.post_text.trim().is_empty()
    }
}

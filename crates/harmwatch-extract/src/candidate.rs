use harmwatch_core::NormalizedPost;

/// An unvalidated extraction result from one strategy. Every field is
/// optional except the text, which may be empty. Counters hold the raw page
/// text (`"1,204"`, `"3.5K"`) and are coerced during normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionCandidate {
    pub platform: Option<String>,
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    pub timestamp: Option<String>,
    pub post_text: String,
    /// When set, overrides hashtags derived from `post_text`.
    pub hashtags: Option<Vec<String>>,
    pub likes: Option<String>,
    pub comments: Option<String>,
    pub shares: Option<String>,
    pub source_url: Option<String>,
    pub category: Option<String>,
    pub sentiment: Option<String>,
}

impl ExtractionCandidate {
    /// Returns `true` when the text is non-empty after trimming whitespace.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.post_text.trim().is_empty()
    }
}

impl From<NormalizedPost> for ExtractionCandidate {
    fn from(post: NormalizedPost) -> Self {
        Self {
            platform: Some(post.platform),
            post_id: post.post_id,
            user_id: post.user_id,
            timestamp: Some(post.timestamp),
            post_text: post.post_text,
            hashtags: Some(post.hashtags),
            likes: Some(post.likes.to_string()),
            comments: Some(post.comments.to_string()),
            shares: Some(post.shares.to_string()),
            source_url: Some(post.source_url),
            category: post.category,
            sentiment: post.sentiment,
        }
    }
}

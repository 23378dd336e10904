//! User feedback records and the helpers used to build them from raw page
//! snippets.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from the post a user reacted to.
pub const MAX_SNIPPET_CHARS: usize = 300;

/// Number of snippet characters used when deriving a fallback post id.
const POST_ID_SNIPPET_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLabel {
    Agree,
    Disagree,
    Spam,
    Hate,
    Other,
}

impl FeedbackLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackLabel::Agree => "agree",
            FeedbackLabel::Disagree => "disagree",
            FeedbackLabel::Spam => "spam",
            FeedbackLabel::Hate => "hate",
            FeedbackLabel::Other => "other",
        }
    }
}

impl fmt::Display for FeedbackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agree" => Ok(FeedbackLabel::Agree),
            "disagree" => Ok(FeedbackLabel::Disagree),
            "spam" => Ok(FeedbackLabel::Spam),
            "hate" => Ok(FeedbackLabel::Hate),
            "other" => Ok(FeedbackLabel::Other),
            other => Err(format!("unknown feedback label \"{other}\"")),
        }
    }
}

/// One user reaction to a post. Field names on the wire follow the
/// collector's schema (`anon_id`, `url`, `ts`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "anon_id")]
    pub anonymous_id: String,
    pub post_id: String,
    pub snippet: String,
    pub label: FeedbackLabel,
    /// Only present when `label` is [`FeedbackLabel::Other`].
    pub reason: Option<String>,
    #[serde(rename = "url")]
    pub origin_url: Option<String>,
    #[serde(rename = "ts")]
    pub timestamp: String,
}

impl FeedbackRecord {
    /// Builds a record, truncating the snippet and dropping `reason` unless
    /// the label is `other`. Blank reasons are treated as absent.
    #[must_use]
    pub fn new(
        anonymous_id: String,
        post_id: String,
        snippet: &str,
        label: FeedbackLabel,
        reason: Option<String>,
        origin_url: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let reason = match label {
            FeedbackLabel::Other => reason.filter(|r| !r.trim().is_empty()),
            _ => None,
        };

        Self {
            anonymous_id,
            post_id,
            snippet: truncate_snippet(snippet),
            label,
            reason,
            origin_url: origin_url.filter(|u| !u.is_empty()),
            timestamp: crate::iso_timestamp(at),
        }
    }
}

/// Keeps at most [`MAX_SNIPPET_CHARS`] characters, never splitting a
/// multi-byte character.
#[must_use]
pub fn truncate_snippet(text: &str) -> String {
    text.chars().take(MAX_SNIPPET_CHARS).collect()
}

/// Derives a post id from a snippet when the page exposes no stable id:
/// the first 60 characters, trimmed, with whitespace runs collapsed to `_`.
#[must_use]
pub fn derive_post_id(snippet: &str) -> String {
    let head: String = snippet.chars().take(POST_ID_SNIPPET_CHARS).collect();
    head.split_whitespace().collect::<Vec<_>>().join("_")
}

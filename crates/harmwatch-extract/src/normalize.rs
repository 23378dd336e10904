//! Normalization from an [`ExtractionCandidate`] to a
//! [`harmwatch_core::NormalizedPost`].
//!
//! Total over its input: every field receives a defined value, even for a
//! wholly empty candidate. Empty strings count as absent.

use chrono::{DateTime, Utc};
use harmwatch_core::NormalizedPost;

use crate::candidate::ExtractionCandidate;
use crate::hashtags::extract_hashtags;
use crate::parse::coerce_count;

/// Platform tag used when the candidate does not name one.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Normalizes a candidate into a canonical [`NormalizedPost`].
///
/// `document_url` fills `source_url` when the candidate has none, and `now`
/// fills `timestamp`. Hashtags are derived from `post_text` unless the
/// candidate supplies them. Normalizing an already-normalized record
/// (via `ExtractionCandidate::from`) returns it unchanged.
#[must_use]
pub fn normalize(
    candidate: ExtractionCandidate,
    document_url: &str,
    now: DateTime<Utc>,
) -> NormalizedPost {
    let hashtags = candidate
        .hashtags
        .unwrap_or_else(|| extract_hashtags(&candidate.post_text));

    NormalizedPost {
        platform: non_empty(candidate.platform).unwrap_or_else(|| UNKNOWN_PLATFORM.to_string()),
        post_id: non_empty(candidate.post_id),
        user_id: non_empty(candidate.user_id),
        timestamp: non_empty(candidate.timestamp)
            .unwrap_or_else(|| harmwatch_core::iso_timestamp(now)),
        hashtags,
        post_text: candidate.post_text,
        likes: coerce_count(candidate.likes.as_deref()),
        comments: coerce_count(candidate.comments.as_deref()),
        shares: coerce_count(candidate.shares.as_deref()),
        source_url: non_empty(candidate.source_url).unwrap_or_else(|| document_url.to_string()),
        category: non_empty(candidate.category),
        sentiment: non_empty(candidate.sentiment),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

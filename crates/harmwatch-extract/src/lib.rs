//! Content extraction for harmwatch.
//!
//! An [`ExtractorChain`] runs ordered [`ExtractionStrategy`] implementations
//! against a parsed [`Page`], accepts the first candidate with text, and
//! [`normalize`]s it into a [`harmwatch_core::NormalizedPost`]. The chain never
//! fails: when no strategy matches, the generic fallback runs again and its
//! result is accepted as-is.

pub mod candidate;
pub mod chain;
pub mod error;
pub mod hashtags;
pub mod normalize;
pub mod page;
pub mod parse;
pub mod strategies;

pub use candidate::ExtractionCandidate;
pub use chain::{extract_from_html, ExtractorChain};
pub use error::ExtractError;
pub use hashtags::extract_hashtags;
pub use normalize::normalize;
pub use page::Page;
pub use parse::{coerce_count, is_iso_datetime, rewrite_timestamp};
pub use strategies::{ExtractionStrategy, GenericStrategy, JsonLdStrategy, TwitterStrategy};

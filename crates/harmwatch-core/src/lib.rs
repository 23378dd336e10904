//! Shared records and configuration for the harmwatch collector.

pub mod app_config;
pub mod config;
pub mod entries;
pub mod feedback;
pub mod posts;
pub mod preferences;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entries::QueueEntry;
pub use feedback::{derive_post_id, truncate_snippet, FeedbackLabel, FeedbackRecord};
pub use posts::NormalizedPost;
pub use preferences::Preferences;

use thiserror::Error;

/// Errors raised while loading [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Current wall-clock time formatted the way every record timestamp is stored:
/// UTC with millisecond precision, e.g. `2024-05-01T12:30:00.000Z`.
#[must_use]
pub fn iso_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

use thiserror::Error;

/// Failures raised inside a single extraction strategy. The chain logs and
/// swallows these; they never reach callers of [`crate::ExtractorChain`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector \"{selector}\": {reason}")]
    Selector { selector: String, reason: String },

    #[error("malformed structured data: {0}")]
    StructuredData(#[from] serde_json::Error),

    #[error("strategy {strategy} failed: {reason}")]
    Strategy {
        strategy: &'static str,
        reason: String,
    },
}

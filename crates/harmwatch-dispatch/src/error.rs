use harmwatch_buffer::BufferError;
use thiserror::Error;

/// Errors raised while delivering a batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("collector returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid collector URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The queue could not be read or written.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not a JSON object")]
    CorruptStore { path: PathBuf },

    #[error("value under {key} has the wrong shape: {reason}")]
    CorruptValue { key: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

use thiserror::Error;

/// Errors originating from the reader core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid location: {reason}")]
    InvalidLocation { reason: String },

    #[error("unknown reading mode: {0}")]
    UnknownMode(String),

    #[error("unknown flip direction: {0}")]
    UnknownDirection(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

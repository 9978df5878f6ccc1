use thiserror::Error;

/// Errors originating from metadata and image fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid API response: {0}")]
    Api(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable image: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to build loader pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

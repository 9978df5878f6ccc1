//! HTTP client abstraction so the loader can be driven by a mock in tests.

use std::time::Duration;

use tracing::debug;

use crate::error::FetchError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("mangaview/", env!("CARGO_PKG_VERSION"));

pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body. Non-success statuses are errors.
    fn get(&self, url: &str) -> crate::Result<Vec<u8>>;
}

/// Blocking reqwest client; callers run it on loader threads.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> crate::Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> crate::Result<Vec<u8>> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Http(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http(format!("failed to read response: {e}")))
    }
}

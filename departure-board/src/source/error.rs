//! Source error types.

use std::path::PathBuf;

/// Errors fetching a departures body.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection, timeout, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("API returned status {status}")]
    Status { status: u16 },

    /// The response body is bigger than the board will read
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The client could not be built from the configuration
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Mock data could not be read
    #[error("mock data unavailable at {path}: {source}")]
    Mock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Http(_) | SourceError::Status { .. })
    }
}

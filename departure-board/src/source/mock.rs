//! File-backed departure source for testing without API access.
//!
//! Serves `{dir}/{station_id}.json` as if it were a live response, so a
//! saved API response can drive the whole board offline.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::DepartureSource;
use super::error::SourceError;

/// Departure source that reads a saved response from disk.
#[derive(Debug, Clone)]
pub struct MockSource {
    path: PathBuf,
}

impl MockSource {
    /// Serve the response for `station_id` from `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>, station_id: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{station_id}.json")),
        }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DepartureSource for MockSource {
    async fn fetch_body(&self) -> Result<String, SourceError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Mock {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), bytes = body.len(), "loaded mock departures");
        Ok(body)
    }
}

//! File-based sensor source.
//!
//! Replays a captured sensor-data response from a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{SensorResponse, SensorSource};
use crate::error::FetchError;

/// A sensor source that reads a captured response body from disk.
///
/// The file is re-read on every fetch, so edits show up on the next cycle.
/// The bearer token is ignored.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SensorSource for FileSource {
    async fn fetch(&self, _token: &str) -> Result<SensorResponse, FetchError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Connection(format!("Read error: {}", e)))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

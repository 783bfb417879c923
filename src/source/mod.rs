//! Sensor source abstraction for receiving sample history.
//!
//! This module provides a trait-based abstraction over where sensor history
//! comes from: the authenticated HTTP endpoint in production, or a captured
//! response on disk for offline replay.

mod file;
mod http;
mod sample;

pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder, SENSOR_DATA_PATH};
pub use sample::{RawSample, SensorResponse};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait for fetching sensor history from various backends.
///
/// # Example
///
/// ```
/// use device_monitor::{FileSource, SensorSource};
///
/// # tokio_test::block_on(async {
/// let source = FileSource::new("sensor-data.json");
/// if let Ok(response) = source.fetch("token").await {
///     println!("Got {} samples", response.data.len());
/// }
/// # });
/// ```
#[async_trait]
pub trait SensorSource: Send + Sync + Debug {
    /// Fetch the full sample history visible to `token`.
    ///
    /// Implementations must map an authentication rejection to
    /// [`FetchError::Unauthorized`] and never retry on their own.
    async fn fetch(&self, token: &str) -> Result<SensorResponse, FetchError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used in log lines.
    fn description(&self) -> &str;
}

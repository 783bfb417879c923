//! HTTP sensor source.
//!
//! Fetches sample history from the sensor-data endpoint using a bearer token.
//!
//! ## Example
//!
//! ```rust,no_run
//! use device_monitor::{HttpSource, SensorSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::builder()
//!         .base_url("http://localhost:3000")
//!         .build()?;
//!
//!     let response = source.fetch("my-token").await?;
//!     println!("Fetched {} samples", response.data.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{SensorResponse, SensorSource};
use crate::error::FetchError;

/// Path of the sensor-data endpoint, relative to the base URL.
pub const SENSOR_DATA_PATH: &str = "/api/user/sensor-data";

/// A sensor source backed by the authenticated HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// Returns the full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SensorSource for HttpSource {
    async fn fetch(&self, token: &str) -> Result<SensorResponse, FetchError> {
        let response = self.client.get(&self.url).bearer_auth(token).send().await?;
        let status = response.status();
        debug!(url = %self.url, %status, "sensor-data response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }

        if !status.is_success() {
            return Err(FetchError::Http(format!("API returned status {}", status)));
        }

        let body: SensorResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(body)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the server base URL (e.g., "http://localhost:3000").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a request timeout. Without one the transport's defaults apply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| FetchError::Http(e.to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        let url = format!("{}{}", base_url.trim_end_matches('/'), SENSOR_DATA_PATH);
        let description = format!("http: {}", url);

        Ok(HttpSource {
            client,
            url,
            description,
        })
    }
}

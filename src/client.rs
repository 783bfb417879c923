//! The sensor feed client: one fetch, normalized into an outcome.

use tracing::{debug, error, info, warn};

use crate::data::{normalize, LatestReading, NormalizeOptions, SensorViewModel};
use crate::error::FetchError;
use crate::locale::Locale;
use crate::source::{SensorResponse, SensorSource};

/// Result of one fetch cycle.
///
/// Non-auth failures are carried as data so the screen can degrade to an
/// empty view with a message instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// At least one usable sample.
    Ok {
        model: SensorViewModel,
        latest: LatestReading,
    },
    /// No credential available.
    NoToken,
    /// The server rejected the token (HTTP 401).
    Unauthorized,
    /// Well-formed response without usable samples.
    Empty {
        model: SensorViewModel,
        message: String,
    },
    /// Network, server or parse error.
    FetchFailed { message: String },
}

impl FetchOutcome {
    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Ok { .. } => "ok",
            FetchOutcome::NoToken => "no-token",
            FetchOutcome::Unauthorized => "unauthorized",
            FetchOutcome::Empty { .. } => "empty",
            FetchOutcome::FetchFailed { .. } => "fetch-failed",
        }
    }

    /// True for the outcomes that hand control to the sign-in flow.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, FetchOutcome::NoToken | FetchOutcome::Unauthorized)
    }
}

/// Fetches sensor history from a [`SensorSource`] and normalizes it.
///
/// # Example
///
/// ```
/// use device_monitor::{FetchOutcome, FileSource, SensorFeedClient};
///
/// # tokio_test::block_on(async {
/// let client = SensorFeedClient::new(Box::new(FileSource::new("sensor-data.json")));
/// match client.fetch("token").await {
///     FetchOutcome::Ok { latest, .. } => println!("Updated {}", latest.updated_at),
///     other => println!("No data: {}", other.kind()),
/// }
/// # });
/// ```
#[derive(Debug)]
pub struct SensorFeedClient {
    source: Box<dyn SensorSource>,
    options: NormalizeOptions,
    locale: Locale,
}

impl SensorFeedClient {
    /// Create a client with default normalization options and locale.
    pub fn new(source: Box<dyn SensorSource>) -> Self {
        Self {
            source,
            options: NormalizeOptions::default(),
            locale: Locale::default(),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Returns a description of the underlying source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Fetch and normalize the latest sensor history for `token`.
    ///
    /// An empty token yields [`FetchOutcome::NoToken`] without touching the
    /// source. A 401 yields [`FetchOutcome::Unauthorized`] and is not retried.
    pub async fn fetch(&self, token: &str) -> FetchOutcome {
        if token.trim().is_empty() {
            return FetchOutcome::NoToken;
        }

        match self.source.fetch(token).await {
            Ok(response) => self.outcome_from(response),
            Err(FetchError::Unauthorized) => {
                warn!(source = self.source.description(), "Sensor endpoint rejected the token");
                FetchOutcome::Unauthorized
            }
            Err(e) => {
                error!(source = self.source.description(), error = %e, "Error fetching sensor data");
                FetchOutcome::FetchFailed {
                    message: format!("{} ({})", self.locale.fetch_failed(), e),
                }
            }
        }
    }

    /// Normalize an already-fetched response.
    pub fn outcome_from(&self, response: SensorResponse) -> FetchOutcome {
        if response.data.is_empty() {
            info!("Sensor endpoint returned no samples");
            return FetchOutcome::Empty {
                model: SensorViewModel::default(),
                message: self.locale.no_sensor_data().to_string(),
            };
        }

        match normalize(&response.data, &self.options) {
            Some((latest, model)) => {
                debug!(
                    samples = response.data.len(),
                    charted = model.temperature.len(),
                    updated_at = %latest.updated_at,
                    "Normalized sensor data"
                );
                FetchOutcome::Ok { model, latest }
            }
            None => FetchOutcome::Empty {
                model: SensorViewModel::default(),
                message: self.locale.no_usable_data().to_string(),
            },
        }
    }
}

//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `DEVICE_MONITOR_*` environment variables. Command-line flags are applied
//! on top by the binary.
//!
//! ```toml
//! base_url = "http://172.16.22.142:3000"
//! poll_interval_ms = 3600000
//! label_timezone = "local"
//! locale = "th"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::auth::FileTokenStore;
use crate::data::{LabelTimezone, NormalizeOptions};
use crate::locale::Locale;

/// Config file read from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "device-monitor.toml";

const ENV_PREFIX: &str = "DEVICE_MONITOR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Server base URL; the sensor-data path is appended.
    pub base_url: String,
    /// Refresh interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Request timeout; transport defaults apply when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Token file; the platform data directory is used when unset.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    pub label_timezone: LabelTimezone,
    pub locale: Locale,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            poll_interval_ms: 3_600_000,
            request_timeout_secs: None,
            token_path: None,
            label_timezone: LabelTimezone::Local,
            locale: Locale::Thai,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise
    /// [`DEFAULT_CONFIG_FILE`] is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("poll_interval_ms", defaults.poll_interval_ms as i64)?
            .set_default("label_timezone", "local")?
            .set_default("locale", "th")?
            .set_default("log_level", defaults.log_level)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to load configuration")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the poller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("base_url must start with http:// or https://: {}", self.base_url);
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be greater than zero when set");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            label_timezone: self.label_timezone,
            ..NormalizeOptions::default()
        }
    }

    /// The token store at `token_path`, or in the platform data directory.
    pub fn token_store(&self) -> Result<FileTokenStore> {
        match &self.token_path {
            Some(path) => Ok(FileTokenStore::new(path)),
            None => FileTokenStore::in_data_dir()
                .context("No home directory found; set token_path in the configuration"),
        }
    }
}

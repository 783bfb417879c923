// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # device-monitor
//!
//! A headless monitor for environmental sensor history.
//!
//! The crate polls an authenticated sensor-data endpoint, normalizes the raw
//! sample history into the latest reading plus four short chart series
//! (temperature, humidity, dew point, VPO), and publishes a fresh screen
//! state after every cycle. Missing or rejected credentials clear the stored
//! token and hand off to a sign-in collaborator.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DeviceMonitor                         │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │ source  │───▶│  client  │───▶│  data   │───▶│  screen  │  │
//! │  │ (fetch) │    │ (outcome)│    │(normalize)   │ (state)  │  │
//! │  └────┬────┘    └────┬─────┘    └─────────┘    └────┬─────┘  │
//! │       │              │                              │        │
//! │       ▼              ▼                              ▼        │
//! │  HttpSource     auth (token,                   presenter     │
//! │  FileSource      sign-in)                  (log, JSON file)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Where sample history comes from ([`SensorSource`] trait),
//!   the HTTP endpoint or a captured response file
//! - **[`client`]**: One fetch turned into a [`FetchOutcome`]
//! - **[`data`]**: Sorting, windowing and charting of raw samples
//! - **[`screen`]**: [`ScreenState`], the cycle and the polling lifecycle
//! - **[`auth`]**: Token storage and the sign-in redirect
//! - **[`presenter`]**: Hand-off of screen states to the outside world
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Store a token, then poll the server hourly
//! device-monitor --save-token "$TOKEN"
//! device-monitor --base-url http://172.16.22.142:3000
//!
//! # One cycle against a captured response, printed as JSON
//! device-monitor --replay sensor-data.json --once
//! ```
//!
//! ### Normalizing a response
//!
//! ```
//! use device_monitor::{normalize, NormalizeOptions, SensorResponse};
//!
//! let response: SensorResponse = serde_json::from_str(
//!     r#"{"data":[{"timestamp":"2024-05-01T10:00:00Z","temperature":25.3}]}"#,
//! ).unwrap();
//!
//! let (latest, model) = normalize(&response.data, &NormalizeOptions::default()).unwrap();
//! assert_eq!(latest.temperature, Some(25.3));
//! assert_eq!(model.temperature.values, vec![25.3]);
//! ```
//!
//! ### Running the screen
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use device_monitor::{
//!     DeviceMonitor, HttpSource, MemoryTokenStore, Navigator, SensorFeedClient,
//! };
//!
//! #[derive(Debug)]
//! struct SignIn;
//!
//! impl Navigator for SignIn {
//!     fn redirect_to_sign_in(&self) {
//!         println!("sign in required");
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder()
//!     .base_url("http://localhost:3000")
//!     .build()
//!     .unwrap();
//! let client = SensorFeedClient::new(Box::new(source));
//! let monitor = DeviceMonitor::new(
//!     client,
//!     Arc::new(MemoryTokenStore::new("token")),
//!     Arc::new(SignIn),
//! )
//! .with_interval(Duration::from_secs(60));
//!
//! let mut handle = monitor.activate();
//! while let Some(state) = handle.changed().await {
//!     println!("{:?}", state.latest);
//! }
//! handle.teardown().await;
//! # });
//! ```

pub mod auth;
pub mod battery;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod locale;
pub mod presenter;
pub mod screen;
pub mod source;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use auth::{FileTokenStore, MemoryTokenStore, Navigator, TokenProvider};
pub use battery::{BatteryMonitor, NoBattery, SysfsBattery};
pub use client::{FetchOutcome, SensorFeedClient};
pub use config::Settings;
pub use data::{
    normalize, ChartSeries, LabelTimezone, LatestReading, Metric, NormalizeOptions,
    SensorViewModel,
};
pub use error::FetchError;
pub use locale::Locale;
pub use presenter::{ChartPayload, DetailPayload, JsonFilePresenter, LogPresenter, Presenter};
pub use screen::{DeviceMonitor, ScreenHandle, ScreenState, DEFAULT_POLL_INTERVAL};
pub use source::{FileSource, HttpSource, HttpSourceBuilder, RawSample, SensorResponse, SensorSource};

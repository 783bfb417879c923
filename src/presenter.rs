//! Presentation hand-off for screen states.
//!
//! Presenters receive every published [`ScreenState`]. The binary ships two:
//! [`LogPresenter`] writes one log line per metric card, and
//! [`JsonFilePresenter`] keeps the latest state on disk for other tools.
//! [`DetailPayload`] and [`ChartPayload`] are the serialized copies handed
//! to the detail and full-chart views.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data::timestamp::{format_updated, LabelTimezone};
use crate::data::{ChartSeries, Metric};
use crate::locale::Locale;
use crate::screen::ScreenState;

/// Consumer of screen states.
pub trait Presenter: Send {
    fn present(&mut self, state: &ScreenState) -> Result<()>;
}

/// Presents each state as structured log lines.
#[derive(Debug, Clone, Default)]
pub struct LogPresenter {
    locale: Locale,
    label_timezone: LabelTimezone,
}

impl LogPresenter {
    pub fn new(locale: Locale, label_timezone: LabelTimezone) -> Self {
        Self {
            locale,
            label_timezone,
        }
    }

    /// One line per metric card, e.g. `Temperature: 25.3°C (updated ...) [10.00=25.3 9.00=24.8]`.
    ///
    /// Empty when there is no latest reading.
    pub fn card_lines(&self, state: &ScreenState) -> Vec<String> {
        let Some(latest) = &state.latest else {
            return Vec::new();
        };
        let updated = latest
            .updated_instant()
            .map(|at| format_updated(at, self.label_timezone))
            .unwrap_or_else(|| latest.updated_at.clone());

        Metric::ALL
            .iter()
            .map(|metric| {
                format!(
                    "{}: {} (updated {}) [{}]",
                    metric.title(),
                    metric.format_value(latest.value(*metric)),
                    updated,
                    self.chart_summary(state.view_model.series(*metric))
                )
            })
            .collect()
    }

    fn chart_summary(&self, series: &ChartSeries) -> String {
        if series.is_empty() {
            return self.locale.no_chart_data().to_string();
        }
        series
            .labels
            .iter()
            .zip(&series.values)
            .map(|(label, value)| format!("{}={}", label, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, state: &ScreenState) -> Result<()> {
        if let Some(message) = &state.error_message {
            warn!("{}", message);
        }

        if state.latest.is_none() {
            if state.loading {
                info!("{}", self.locale.loading());
            }
            return Ok(());
        }

        for line in self.card_lines(state) {
            info!("{}", line);
        }
        Ok(())
    }
}

/// Writes every state as pretty JSON to a file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct JsonFilePresenter {
    path: PathBuf,
}

impl JsonFilePresenter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Presenter for JsonFilePresenter {
    fn present(&mut self, state: &ScreenState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to export state to {}", self.path.display()))?;
        Ok(())
    }
}

/// Serialized copy of the current view handed to the sensor detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPayload {
    /// JSON of the [`SensorViewModel`](crate::SensorViewModel).
    pub sensor_data: String,
    /// JSON of the latest reading, `"null"` when absent.
    pub latest_data: String,
}

impl DetailPayload {
    pub fn from_state(state: &ScreenState) -> Result<Self> {
        Ok(Self {
            sensor_data: serde_json::to_string(&state.view_model)?,
            latest_data: serde_json::to_string(&state.latest)?,
        })
    }
}

/// Serialized copy of one metric's series handed to the full-chart view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    /// JSON of the [`ChartSeries`].
    pub data: String,
    pub color: String,
    #[serde(rename = "type")]
    pub metric: Metric,
}

impl ChartPayload {
    pub fn from_state(state: &ScreenState, metric: Metric) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_string(state.view_model.series(metric))?,
            color: metric.color().to_string(),
            metric,
        })
    }
}

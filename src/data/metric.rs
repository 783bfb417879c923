//! The four environmental metrics reported by the sensor.

use serde::{Deserialize, Serialize};

use crate::source::RawSample;

/// One of the four metrics charted per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Temperature,
    Humidity,
    DewPoint,
    Vpo,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::DewPoint,
        Metric::Vpo,
    ];

    /// Key used for this metric in view-model JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::DewPoint => "dewPoint",
            Metric::Vpo => "vpo",
        }
    }

    /// Returns the display title for this metric.
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::DewPoint => "Dew Point",
            Metric::Vpo => "Vapor Pressure Deficit (VPO)",
        }
    }

    /// Unit suffix appended to a displayed value.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature | Metric::DewPoint => "°C",
            Metric::Humidity => "%",
            Metric::Vpo => " kPa",
        }
    }

    /// Chart color handed to the full-chart view.
    pub fn color(&self) -> &'static str {
        match self {
            Metric::Temperature => "#3b82f6",
            Metric::Humidity => "#f59e0b",
            Metric::DewPoint => "#06b6d4",
            Metric::Vpo => "#22c55e",
        }
    }

    /// Read this metric from a raw sample.
    pub fn value_of(&self, sample: &RawSample) -> Option<f64> {
        match self {
            Metric::Temperature => sample.temperature,
            Metric::Humidity => sample.humidity,
            Metric::DewPoint => sample.dew_point,
            Metric::Vpo => sample.vpo,
        }
    }

    /// Format a reading for display, e.g. "25.3°C", or "N/A" when absent.
    pub fn format_value(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{}{}", v, self.unit()),
            None => "N/A".to_string(),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "dewpoint" => Ok(Metric::DewPoint),
            "vpo" | "vpd" => Ok(Metric::Vpo),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}

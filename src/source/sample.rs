//! Wire types for the sensor-data endpoint.
//!
//! These types match the JSON body served by `GET /api/user/sensor-data`.
//! They are the common data format between every [`SensorSource`](super::SensorSource)
//! and the normalization pipeline in [`crate::data`].

use serde::{Deserialize, Serialize};

/// The body returned by the sensor-data endpoint.
///
/// A missing `data` field and `"data": null` are both treated as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<RawSample>,
}

/// One timestamped sensor reading as produced by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// ISO-8601 timestamp, with or without a UTC offset.
    ///
    /// `None` when the server sent null, omitted it, or sent a non-string.
    /// Such samples are dropped during normalization.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<String>,

    /// Air temperature in °C.
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Relative humidity in %.
    #[serde(default)]
    pub humidity: Option<f64>,

    /// Dew point in °C.
    #[serde(default)]
    pub dew_point: Option<f64>,

    /// Vapor-pressure deficit in kPa.
    #[serde(default)]
    pub vpo: Option<f64>,
}

impl RawSample {
    /// A sample with only a timestamp; every metric is null.
    pub fn at(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            temperature: None,
            humidity: None,
            dew_point: None,
            vpo: None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawSample>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RawSample>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_response() {
        let json = r#"{
            "data": [
                {
                    "timestamp": "2024-05-01T10:00:00Z",
                    "temperature": 25.3,
                    "humidity": 61.0,
                    "dew_point": 17.2,
                    "vpo": 1.24
                },
                {
                    "timestamp": "2024-05-01T09:00:00Z",
                    "temperature": null,
                    "humidity": 58.5
                }
            ]
        }"#;

        let response: SensorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 2);

        let first = &response.data[0];
        assert_eq!(first.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(first.temperature, Some(25.3));
        assert_eq!(first.dew_point, Some(17.2));
        assert_eq!(first.vpo, Some(1.24));

        let second = &response.data[1];
        assert!(second.temperature.is_none());
        assert_eq!(second.humidity, Some(58.5));
        assert!(second.dew_point.is_none());
        assert!(second.vpo.is_none());
    }

    #[test]
    fn test_missing_or_null_data_is_empty() {
        let missing: SensorResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.data.is_empty());

        let null: SensorResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(null.data.is_empty());
    }

    #[test]
    fn test_malformed_timestamp_does_not_fail_body() {
        let json = r#"{
            "data": [
                { "timestamp": "2024-05-01T10:00:00Z", "temperature": 25.3 },
                { "timestamp": null, "temperature": 24.0 },
                { "temperature": 23.0 },
                { "timestamp": 1714557600000, "temperature": 22.0 }
            ]
        }"#;

        let response: SensorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.len(), 4);
        assert_eq!(
            response.data[0].timestamp.as_deref(),
            Some("2024-05-01T10:00:00Z")
        );
        assert!(response.data[1].timestamp.is_none());
        assert!(response.data[2].timestamp.is_none());
        assert!(response.data[3].timestamp.is_none());
        assert_eq!(response.data[1].temperature, Some(24.0));
    }
}

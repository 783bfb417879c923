//! Sample normalization into the view model.
//!
//! This module turns the raw sample history from a sensor source into the
//! fixed-shape bundle consumed by presenters: one latest reading plus a
//! chart series per metric, all drawn from the same working set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::metric::Metric;
use super::timestamp::{hour_label, parse_timestamp, LabelTimezone};
use crate::source::RawSample;

/// Default number of samples kept in the working set.
pub const DEFAULT_MAX_SAMPLES: usize = 5;

/// Options controlling normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Upper bound on the working-set size.
    pub max_samples: usize,
    /// Zone used to derive hour-of-day labels.
    pub label_timezone: LabelTimezone,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            label_timezone: LabelTimezone::default(),
        }
    }
}

/// Labels and values for one metric's bar chart.
///
/// `labels[i]` and `values[i]` describe the same sample, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One chart series per metric. Always four series, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorViewModel {
    pub temperature: ChartSeries,
    pub humidity: ChartSeries,
    pub dew_point: ChartSeries,
    pub vpo: ChartSeries,
}

impl SensorViewModel {
    /// Returns the series for `metric`.
    pub fn series(&self, metric: Metric) -> &ChartSeries {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::DewPoint => &self.dew_point,
            Metric::Vpo => &self.vpo,
        }
    }

    fn series_mut(&mut self, metric: Metric) -> &mut ChartSeries {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::DewPoint => &mut self.dew_point,
            Metric::Vpo => &mut self.vpo,
        }
    }

    /// True when every series is empty.
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.series(*m).is_empty())
    }
}

/// The most recent sample of the working set, field-renamed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub dew_point: Option<f64>,
    pub vpo: Option<f64>,
    /// The sample's timestamp exactly as the server sent it.
    pub updated_at: String,
}

impl LatestReading {
    /// Returns the reading for `metric`, if the sample carried one.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::DewPoint => self.dew_point,
            Metric::Vpo => self.vpo,
        }
    }

    /// The update time as an instant, parsed the same way as during normalization.
    pub fn updated_instant(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }
}

/// A sample paired with its parsed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct TimedSample<'a> {
    pub at: DateTime<Utc>,
    /// The raw timestamp `at` was parsed from.
    pub timestamp: &'a str,
    pub sample: &'a RawSample,
}

/// Select the working set: samples sorted most recent first, truncated to
/// `max_samples`.
///
/// The sort is stable, so samples with equal timestamps keep server order.
/// Samples whose timestamp is missing or cannot be parsed are dropped.
pub fn working_set(samples: &[RawSample], max_samples: usize) -> Vec<TimedSample<'_>> {
    let mut timed: Vec<TimedSample<'_>> = samples
        .iter()
        .filter_map(|sample| {
            let parsed = sample
                .timestamp
                .as_deref()
                .and_then(|raw| parse_timestamp(raw).map(|at| (raw, at)));
            match parsed {
                Some((timestamp, at)) => Some(TimedSample {
                    at,
                    timestamp,
                    sample,
                }),
                None => {
                    warn!(timestamp = ?sample.timestamp, "Dropping sample with unparseable timestamp");
                    None
                }
            }
        })
        .collect();

    timed.sort_by(|a, b| b.at.cmp(&a.at));
    timed.truncate(max_samples);
    timed
}

/// Normalize raw samples into the latest reading and the chart view model.
///
/// Returns `None` when no sample is usable; the caller then shows an empty
/// [`SensorViewModel`] and no latest reading.
pub fn normalize(
    samples: &[RawSample],
    options: &NormalizeOptions,
) -> Option<(LatestReading, SensorViewModel)> {
    let working = working_set(samples, options.max_samples);
    let first = working.first()?;

    let latest = LatestReading {
        temperature: first.sample.temperature,
        humidity: first.sample.humidity,
        dew_point: first.sample.dew_point,
        vpo: first.sample.vpo,
        updated_at: first.timestamp.to_string(),
    };

    let labels: Vec<String> = working
        .iter()
        .map(|t| hour_label(t.at, options.label_timezone))
        .collect();

    let mut model = SensorViewModel::default();
    for metric in Metric::ALL {
        let series = model.series_mut(metric);
        series.labels = labels.clone();
        series.values = working
            .iter()
            .map(|t| chart_value(metric.value_of(t.sample)))
            .collect();
    }

    Some((latest, model))
}

/// Chart bars have no "missing" state: absent and non-finite readings plot as 0.
fn chart_value(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_options() -> NormalizeOptions {
        NormalizeOptions {
            label_timezone: LabelTimezone::Utc,
            ..Default::default()
        }
    }

    fn sample(hour: u32, temperature: Option<f64>) -> RawSample {
        RawSample {
            timestamp: Some(format!("2024-05-01T{:02}:00:00Z", hour)),
            temperature,
            humidity: Some(50.0 + hour as f64),
            dew_point: None,
            vpo: Some(1.0),
        }
    }

    #[test]
    fn test_keeps_five_most_recent_hours() {
        // Unsorted hours [10,9,8,7,6,5]
        let samples: Vec<RawSample> = [7, 10, 5, 9, 6, 8]
            .into_iter()
            .map(|h| sample(h, Some(h as f64)))
            .collect();

        let (latest, model) = normalize(&samples, &utc_options()).unwrap();

        let expected = vec!["10.00", "9.00", "8.00", "7.00", "6.00"];
        assert_eq!(model.temperature.labels, expected);
        assert_eq!(model.temperature.values, vec![10.0, 9.0, 8.0, 7.0, 6.0]);
        assert_eq!(latest.updated_at, "2024-05-01T10:00:00Z");
        assert_eq!(
            latest.updated_instant(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_working_set_size_is_min_of_five_and_count() {
        for n in 0..9u32 {
            let samples: Vec<RawSample> = (0..n).map(|h| sample(h, None)).collect();
            let set = working_set(&samples, DEFAULT_MAX_SAMPLES);
            assert_eq!(set.len(), (n as usize).min(5));
            assert!(set.windows(2).all(|w| w[0].at >= w[1].at));
        }
    }

    #[test]
    fn test_series_are_aligned() {
        let samples: Vec<RawSample> = (0..4).map(|h| sample(h, Some(20.0))).collect();
        let (_, model) = normalize(&samples, &utc_options()).unwrap();

        let reference = &model.temperature.labels;
        for metric in Metric::ALL {
            let series = model.series(metric);
            assert_eq!(series.len(), 4);
            assert_eq!(&series.labels, reference);
            assert_eq!(series.labels.len(), series.values.len());
        }
    }

    #[test]
    fn test_null_metrics_plot_as_zero() {
        let samples = vec![sample(3, None), sample(2, Some(21.5))];
        let (latest, model) = normalize(&samples, &utc_options()).unwrap();

        assert_eq!(model.temperature.values, vec![0.0, 21.5]);
        assert_eq!(model.dew_point.values, vec![0.0, 0.0]);
        // Latest reading keeps the null for display as N/A
        assert!(latest.temperature.is_none());
        assert!(latest.dew_point.is_none());
    }

    #[test]
    fn test_non_finite_plots_as_zero() {
        assert_eq!(chart_value(Some(f64::NAN)), 0.0);
        assert_eq!(chart_value(Some(f64::INFINITY)), 0.0);
        assert_eq!(chart_value(Some(-3.5)), -3.5);
        assert_eq!(chart_value(None), 0.0);
    }

    #[test]
    fn test_latest_is_field_renamed_first_sample() {
        let mut newest = sample(12, Some(26.1));
        newest.dew_point = Some(18.4);
        newest.vpo = Some(1.35);
        let samples = vec![sample(11, Some(25.0)), newest];

        let (latest, _) = normalize(&samples, &utc_options()).unwrap();
        assert_eq!(latest.temperature, Some(26.1));
        assert_eq!(latest.humidity, Some(62.0));
        assert_eq!(latest.dew_point, Some(18.4));
        assert_eq!(latest.vpo, Some(1.35));
        assert_eq!(latest.value(Metric::DewPoint), Some(18.4));

        let json = serde_json::to_value(&latest).unwrap();
        assert_eq!(json["dewPoint"], serde_json::json!(18.4));
        assert_eq!(json["updatedAt"], serde_json::json!("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_equal_timestamps_keep_server_order() {
        let mut a = sample(8, Some(1.0));
        let mut b = sample(8, Some(2.0));
        a.humidity = Some(10.0);
        b.humidity = Some(20.0);
        let samples = vec![a, b];

        let (latest, model) = normalize(&samples, &utc_options()).unwrap();
        assert_eq!(latest.temperature, Some(1.0));
        assert_eq!(model.temperature.values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_no_time_window_filter() {
        // Samples days apart are all kept
        let samples = vec![
            RawSample::at("2024-01-01T00:00:00Z"),
            RawSample::at("2023-06-15T13:00:00Z"),
            RawSample::at("2020-02-29T23:00:00Z"),
        ];
        let (_, model) = normalize(&samples, &utc_options()).unwrap();
        assert_eq!(model.vpo.labels, vec!["0.00", "13.00", "23.00"]);
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(normalize(&[], &utc_options()).is_none());
        assert!(SensorViewModel::default().is_empty());
    }

    #[test]
    fn test_unparseable_timestamps_are_dropped() {
        let samples = vec![RawSample::at("not a time"), sample(4, Some(19.0))];
        let (latest, model) = normalize(&samples, &utc_options()).unwrap();
        assert_eq!(model.temperature.len(), 1);
        assert_eq!(latest.temperature, Some(19.0));

        let only_bad = vec![RawSample::at("??")];
        assert!(normalize(&only_bad, &utc_options()).is_none());
    }

    #[test]
    fn test_missing_timestamps_are_dropped() {
        let mut missing = sample(9, Some(30.0));
        missing.timestamp = None;
        let samples = vec![missing, sample(4, Some(19.0))];

        let (latest, model) = normalize(&samples, &utc_options()).unwrap();
        assert_eq!(model.temperature.values, vec![19.0]);
        assert_eq!(latest.temperature, Some(19.0));
    }

    #[test]
    fn test_updated_at_keeps_server_text() {
        let samples = vec![
            RawSample::at("2024-05-01T17:00:00+07:00"),
            RawSample::at("2024-05-01T08:00:00Z"),
        ];
        let (latest, _) = normalize(&samples, &utc_options()).unwrap();

        assert_eq!(latest.updated_at, "2024-05-01T17:00:00+07:00");
        assert_eq!(
            latest.updated_instant(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );

        let json = serde_json::to_value(&latest).unwrap();
        assert_eq!(json["updatedAt"], "2024-05-01T17:00:00+07:00");
    }

    #[test]
    fn test_view_model_serializes_camel_case() {
        let json = serde_json::to_value(SensorViewModel::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "temperature": { "labels": [], "values": [] },
                "humidity": { "labels": [], "values": [] },
                "dewPoint": { "labels": [], "values": [] },
                "vpo": { "labels": [], "values": [] },
            })
        );
    }
}

//! Data models and normalization for sensor history.
//!
//! This module handles the transformation of raw sensor-data responses into
//! the display-ready view model.
//!
//! ## Submodules
//!
//! - [`feed`]: Working-set selection and [`normalize`] into [`SensorViewModel`] + [`LatestReading`]
//! - [`metric`]: The four charted metrics and their display formatting
//! - [`timestamp`]: Timestamp parsing and hour-of-day labels
//!
//! ## Data Flow
//!
//! ```text
//! SensorResponse (raw JSON)
//!        │
//!        ▼
//! working_set()  ── parse, sort newest first, keep ≤ 5
//!        │
//!        ├──▶ LatestReading (first sample, field-renamed)
//!        │
//!        └──▶ SensorViewModel (ChartSeries × 4, "<hour>.00" labels)
//! ```

pub mod feed;
pub mod metric;
pub mod timestamp;

pub use feed::{
    normalize, working_set, ChartSeries, LatestReading, NormalizeOptions, SensorViewModel,
    TimedSample, DEFAULT_MAX_SAMPLES,
};
pub use metric::Metric;
pub use timestamp::LabelTimezone;

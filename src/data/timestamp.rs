use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Naive layouts accepted after RFC 3339; read as device-local time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Time zone used to derive the hour-of-day chart labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelTimezone {
    /// The device's local time zone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

impl std::str::FromStr for LabelTimezone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            other => Err(format!("Unknown label timezone: {}", other)),
        }
    }
}

/// Parse a sample timestamp like "2024-05-01T10:00:00Z", "2024-05-01T17:00:00+07:00",
/// "2024-05-01 10:00:00" or "2024-05-01".
///
/// Timestamps without an offset are read as local time; a bare date is UTC midnight.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Hour of day (0-23) of `at` in the given zone.
pub fn hour_of_day(at: DateTime<Utc>, tz: LabelTimezone) -> u32 {
    match tz {
        LabelTimezone::Local => at.with_timezone(&Local).hour(),
        LabelTimezone::Utc => at.hour(),
    }
}

/// Chart label for a sample: the hour of day rendered as "<hour>.00".
pub fn hour_label(at: DateTime<Utc>, tz: LabelTimezone) -> String {
    format!("{}.00", hour_of_day(at, tz))
}

/// Format an update time for display
pub fn format_updated(at: DateTime<Utc>, tz: LabelTimezone) -> String {
    const PATTERN: &str = "%Y-%m-%d %H:%M:%S";
    match tz {
        LabelTimezone::Local => at.with_timezone(&Local).format(PATTERN).to_string(),
        LabelTimezone::Utc => at.format(PATTERN).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_utc() {
        let at = parse_timestamp("2024-05-01T10:15:00Z").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_offset() {
        let at = parse_timestamp("2024-05-01T17:00:00.250+07:00").unwrap();
        assert_eq!(at.hour(), 10);
        assert_eq!(at.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_naive_is_local() {
        let at = parse_timestamp("2024-05-01T08:30:00").unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(at, expected);

        let spaced = parse_timestamp("2024-05-01 08:30:00").unwrap();
        assert_eq!(spaced, expected);
    }

    #[test]
    fn test_parse_date_only_is_utc_midnight() {
        let at = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-01T00:00:00Z").is_none());
    }

    #[test]
    fn test_hour_label_utc_has_no_padding() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 59, 59).unwrap();
        assert_eq!(hour_label(at, LabelTimezone::Utc), "9.00");

        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(hour_label(midnight, LabelTimezone::Utc), "0.00");
    }

    #[test]
    fn test_hour_label_local_matches_chrono_local() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let expected = format!("{}.00", at.with_timezone(&Local).hour());
        assert_eq!(hour_label(at, LabelTimezone::Local), expected);
    }

    #[test]
    fn test_label_timezone_from_str() {
        assert_eq!("UTC".parse::<LabelTimezone>(), Ok(LabelTimezone::Utc));
        assert_eq!("local".parse::<LabelTimezone>(), Ok(LabelTimezone::Local));
        assert!("mars".parse::<LabelTimezone>().is_err());
    }

    #[test]
    fn test_format_updated_utc() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 7, 5, 9).unwrap();
        assert_eq!(format_updated(at, LabelTimezone::Utc), "2024-05-01 07:05:09");
    }
}

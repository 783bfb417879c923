//! User-facing messages.

use serde::{Deserialize, Serialize};

/// Language of the messages shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    /// The endpoint answered successfully but holds no samples.
    pub fn no_sensor_data(&self) -> &'static str {
        match self {
            Locale::Thai => "ไม่มีข้อมูลเซ็นเซอร์ในฐานข้อมูล",
            Locale::English => "No sensor data in the database",
        }
    }

    /// Samples were returned but none could be used.
    pub fn no_usable_data(&self) -> &'static str {
        match self {
            Locale::Thai => "ไม่มีข้อมูลเซ็นเซอร์ที่ใช้งานได้",
            Locale::English => "No usable sensor data",
        }
    }

    /// Network, server or parse failure.
    pub fn fetch_failed(&self) -> &'static str {
        match self {
            Locale::Thai => "ไม่สามารถดึงข้อมูลเซ็นเซอร์ได้",
            Locale::English => "Unable to fetch sensor data",
        }
    }

    pub fn session_expired(&self) -> &'static str {
        match self {
            Locale::Thai => "เซสชันหมดอายุ กรุณาเข้าสู่ระบบอีกครั้ง",
            Locale::English => "Session expired. Please log in again.",
        }
    }

    /// Placeholder for a chart with no bars.
    pub fn no_chart_data(&self) -> &'static str {
        match self {
            Locale::Thai => "ไม่มีข้อมูล",
            Locale::English => "No data",
        }
    }

    pub fn loading(&self) -> &'static str {
        match self {
            Locale::Thai => "กำลังโหลดข้อมูลเซ็นเซอร์...",
            Locale::English => "Loading sensor data...",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "th" | "thai" => Ok(Locale::Thai),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("Unknown locale: {}", other)),
        }
    }
}

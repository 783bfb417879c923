//! Battery level collaborator.
//!
//! Read once when the screen activates; purely informational.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Something that can report the device battery charge.
pub trait BatteryMonitor: Send + Sync + Debug {
    /// Charge in `0.0..=1.0`, or `None` when the device has no battery.
    fn level(&self) -> Option<f32>;
}

/// Reads `capacity` files under `/sys/class/power_supply`.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new("/sys/class/power_supply")
    }
}

impl SysfsBattery {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl BatteryMonitor for SysfsBattery {
    fn level(&self) -> Option<f32> {
        let mut supplies: Vec<PathBuf> = fs::read_dir(&self.root)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        // Stable choice when several batteries are present
        supplies.sort();

        supplies.iter().find_map(|supply| {
            let percent: f32 = fs::read_to_string(supply.join("capacity"))
                .ok()?
                .trim()
                .parse()
                .ok()?;
            Some((percent / 100.0).clamp(0.0, 1.0))
        })
    }
}

/// A device without a battery.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBattery;

impl BatteryMonitor for NoBattery {
    fn level(&self) -> Option<f32> {
        None
    }
}

/// Round a `0.0..=1.0` level to a whole percent.
pub fn percent(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 100.0).round() as u8
}

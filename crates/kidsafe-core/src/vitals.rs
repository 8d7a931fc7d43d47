//! Wristband readings and low-battery edge detection.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Battery level below which a band is reported as low.
pub const DEFAULT_LOW_BATTERY_PERCENT: f64 = 20.0;

/// One sync from a subject's wristband.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandReading {
  /// 0–100.
  pub battery_percent:     f64,
  pub heart_rate_bpm:      u16,
  pub steps:               u32,
  pub temperature_celsius: f64,
  pub synced_at:           DateTime<Utc>,
}

/// Fires once per subject when the battery drops below the threshold, and
/// re-arms when it climbs back to the threshold or above.
#[derive(Debug, Clone)]
pub struct LowBatteryMonitor {
  threshold_percent: f64,
  low:               HashSet<String>,
}

impl LowBatteryMonitor {
  pub fn new(threshold_percent: f64) -> Self {
    Self {
      threshold_percent,
      low: HashSet::new(),
    }
  }

  pub fn threshold_percent(&self) -> f64 { self.threshold_percent }

  /// Returns `true` on the falling edge.
  pub fn observe(&mut self, subject_id: &str, reading: &BandReading) -> bool {
    if reading.battery_percent < self.threshold_percent {
      self.low.insert(subject_id.to_owned())
    } else {
      self.low.remove(subject_id);
      false
    }
  }

  pub fn is_low(&self, subject_id: &str) -> bool { self.low.contains(subject_id) }

  /// Drop any state for a subject, e.g. when its band disconnects.
  pub fn forget(&mut self, subject_id: &str) { self.low.remove(subject_id); }
}

impl Default for LowBatteryMonitor {
  fn default() -> Self { Self::new(DEFAULT_LOW_BATTERY_PERCENT) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn battery(percent: f64) -> BandReading {
    BandReading {
      battery_percent:     percent,
      heart_rate_bpm:      80,
      steps:               1200,
      temperature_celsius: 36.6,
      synced_at:           Utc::now(),
    }
  }

  #[test]
  fn fires_once_per_falling_edge() {
    let mut monitor = LowBatteryMonitor::default();
    let fired: Vec<_> = [50.0, 21.0, 19.5, 18.0, 12.0]
      .into_iter()
      .map(|p| monitor.observe("kid", &battery(p)))
      .collect();
    assert_eq!(fired, [false, false, true, false, false]);
    assert!(monitor.is_low("kid"));
  }

  #[test]
  fn rearms_after_recovery() {
    let mut monitor = LowBatteryMonitor::new(20.0);
    assert!(monitor.observe("kid", &battery(10.0)));
    assert!(!monitor.observe("kid", &battery(20.0)));
    assert!(!monitor.is_low("kid"));
    assert!(monitor.observe("kid", &battery(19.9)));
  }

  #[test]
  fn subjects_are_independent() {
    let mut monitor = LowBatteryMonitor::default();
    assert!(monitor.observe("a", &battery(5.0)));
    assert!(monitor.observe("b", &battery(5.0)));
    monitor.forget("a");
    assert!(monitor.observe("a", &battery(5.0)));
  }
}

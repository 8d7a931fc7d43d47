//! Tunables for [`crate::TrackingService`].

use std::time::Duration;

use kidsafe_core::{
  geo::Coordinate,
  position::DEFAULT_HISTORY_CAPACITY,
  vitals::DEFAULT_LOW_BATTERY_PERCENT,
};
use serde::{Deserialize, Serialize};

/// Every field has a default, so a partial `[tracking]` table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
  /// Period of a position feed.
  pub sample_interval_ms:  u64,
  /// Period of a band feed.
  pub vitals_interval_ms:  u64,
  /// Samples kept per subject in the location history.
  pub history_capacity:    usize,
  /// Battery level below which a `low_battery` alert is raised.
  pub low_battery_percent: f64,
  /// Maximum per-axis move of the simulated walk, in degrees.
  pub walk_step_degrees:   f64,
  /// Where a simulated walk starts when the subject has no known location.
  pub origin:              Coordinate,
}

impl TrackingConfig {
  /// Never zero.
  pub fn sample_interval(&self) -> Duration { Duration::from_millis(self.sample_interval_ms.max(1)) }

  /// Never zero.
  pub fn vitals_interval(&self) -> Duration { Duration::from_millis(self.vitals_interval_ms.max(1)) }
}

impl Default for TrackingConfig {
  fn default() -> Self {
    Self {
      sample_interval_ms:  3_000,
      vitals_interval_ms:  3_000,
      history_capacity:    DEFAULT_HISTORY_CAPACITY,
      low_battery_percent: DEFAULT_LOW_BATTERY_PERCENT,
      walk_step_degrees:   0.001,
      origin:              Coordinate::new(40.7128, -74.0060),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn intervals_are_never_zero() {
    let config = TrackingConfig {
      sample_interval_ms: 0,
      vitals_interval_ms: 0,
      ..TrackingConfig::default()
    };
    assert_eq!(config.sample_interval(), Duration::from_millis(1));
    assert_eq!(config.vitals_interval(), Duration::from_millis(1));
  }

  #[test]
  fn default_intervals_and_limits() {
    let config = TrackingConfig::default();
    assert_eq!(config.sample_interval(), Duration::from_secs(3));
    assert_eq!(config.history_capacity, 100);
    assert_eq!(config.low_battery_percent, 20.0);
  }
}

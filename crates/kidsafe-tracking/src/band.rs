//! Wristband readings for band feeds.

use chrono::Utc;
use kidsafe_core::vitals::BandReading;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::source::FixtureReplay;

/// Produces the next reading of one subject's band.
pub trait VitalsSource: Send {
  /// `last` is the previous reading, or `None` right after connecting.
  fn next_reading(&mut self, last: Option<&BandReading>) -> Option<BandReading>;
}

impl VitalsSource for FixtureReplay<BandReading> {
  fn next_reading(&mut self, _last: Option<&BandReading>) -> Option<BandReading> {
    self.next_item()
  }
}

/// A band that connects with 75–100 % battery, drains up to 0.5 % per sync
/// and reports plausible resting vitals.
#[derive(Debug, Clone)]
pub struct SimulatedBand {
  rng: StdRng,
}

impl SimulatedBand {
  pub fn new() -> Self {
    Self {
      rng: StdRng::from_entropy(),
    }
  }

  pub fn seeded(seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
    }
  }
}

impl Default for SimulatedBand {
  fn default() -> Self { Self::new() }
}

impl VitalsSource for SimulatedBand {
  fn next_reading(&mut self, last: Option<&BandReading>) -> Option<BandReading> {
    let rng = &mut self.rng;
    let reading = match last {
      None => BandReading {
        battery_percent:     rng.gen_range(75.0..100.0),
        heart_rate_bpm:      rng.gen_range(70..90),
        steps:               rng.gen_range(0..5_000),
        temperature_celsius: rng.gen_range(36.5..37.0),
        synced_at:           Utc::now(),
      },
      Some(prev) => BandReading {
        battery_percent:     (prev.battery_percent - rng.gen_range(0.0..0.5)).max(0.0),
        heart_rate_bpm:      rng.gen_range(60..100),
        steps:               prev.steps.saturating_add(rng.gen_range(0..20)),
        temperature_celsius: rng.gen_range(36.0..37.5),
        synced_at:           Utc::now(),
      },
    };
    Some(reading)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn connects_charged_then_drains_slowly() {
    let mut band = SimulatedBand::seeded(3);
    let first = band.next_reading(None).unwrap();
    assert!((75.0..100.0).contains(&first.battery_percent));

    let mut last = first;
    for _ in 0..100 {
      let next = band.next_reading(Some(&last)).unwrap();
      assert!(next.battery_percent <= last.battery_percent);
      assert!(last.battery_percent - next.battery_percent <= 0.5);
      assert!(next.steps >= last.steps);
      assert!((60..100).contains(&next.heart_rate_bpm));
      last = next;
    }
  }

  #[test]
  fn battery_and_steps_saturate() {
    let mut band = SimulatedBand::seeded(9);
    let mut last = BandReading {
      battery_percent:     0.1,
      heart_rate_bpm:      80,
      steps:               u32::MAX - 5,
      temperature_celsius: 36.6,
      synced_at:           Utc::now(),
    };
    for _ in 0..10 {
      last = band.next_reading(Some(&last)).unwrap();
      assert!(last.battery_percent >= 0.0);
      assert!(last.steps >= u32::MAX - 5);
    }
  }
}

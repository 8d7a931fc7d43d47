//! Great-circle distance between coordinates.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`distance`], in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84-like position in decimal degrees. No datum correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinate {
  pub const fn new(latitude: f64, longitude: f64) -> Self {
    Self { latitude, longitude }
  }

  pub fn is_finite(&self) -> bool {
    self.latitude.is_finite() && self.longitude.is_finite()
  }

  /// Shift by a delta in degrees.
  pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
    Self::new(self.latitude + d_lat, self.longitude + d_lng)
  }
}

impl std::fmt::Display for Coordinate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
  }
}

/// Haversine distance between `a` and `b`, in meters.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
  let phi1 = a.latitude.to_radians();
  let phi2 = b.latitude.to_radians();
  let d_phi = (b.latitude - a.latitude).to_radians();
  let d_lambda = (b.longitude - a.longitude).to_radians();

  let h = (d_phi / 2.0).sin().powi(2)
    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
  let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

  EARTH_RADIUS_METERS * c
}

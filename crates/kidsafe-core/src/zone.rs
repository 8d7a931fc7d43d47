//! Safe zones (named circular geofences) and the registry that owns them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, geo::Coordinate};

/// A circular geofence. Zones are never updated in place; replace one by
/// removing it and adding a new zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
  pub zone_id:       Uuid,
  pub name:          String,
  pub center:        Coordinate,
  pub radius_meters: f64,
  /// Opaque display attribute, e.g. `"#3b82f6"`.
  pub color:         String,
}

/// Input to [`ZoneStore::add_zone`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewZone {
  pub name:          String,
  pub center:        Coordinate,
  pub radius_meters: f64,
  pub color:         String,
}

impl NewZone {
  pub fn new(name: impl Into<String>, center: Coordinate, radius_meters: f64) -> Self {
    Self {
      name: name.into(),
      center,
      radius_meters,
      color: "#3b82f6".to_owned(),
    }
  }

  pub fn with_color(mut self, color: impl Into<String>) -> Self {
    self.color = color.into();
    self
  }

  fn validate(&self) -> Result<()> {
    if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
      return Err(Error::InvalidZoneSpec(format!(
        "radius must be a positive number of meters, got {}",
        self.radius_meters
      )));
    }
    if !self.center.is_finite() {
      return Err(Error::InvalidZoneSpec(format!(
        "center {} is not a finite coordinate",
        self.center
      )));
    }
    Ok(())
  }
}

/// In-memory registry of safe zones, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ZoneStore {
  zones: Vec<SafeZone>,
}

impl ZoneStore {
  pub fn new() -> Self { Self::default() }

  /// Rebuild a store from previously persisted zones, keeping their order.
  pub fn from_zones(zones: Vec<SafeZone>) -> Self { Self { zones } }

  /// Validate `new_zone`, assign a fresh id and append the zone.
  pub fn add_zone(&mut self, new_zone: NewZone) -> Result<SafeZone> {
    new_zone.validate()?;
    let zone = SafeZone {
      zone_id:       Uuid::new_v4(),
      name:          new_zone.name,
      center:        new_zone.center,
      radius_meters: new_zone.radius_meters,
      color:         new_zone.color,
    };
    self.zones.push(zone.clone());
    Ok(zone)
  }

  /// Remove a zone by id. Unknown ids are ignored and yield `None`.
  pub fn remove_zone(&mut self, zone_id: Uuid) -> Option<SafeZone> {
    let index = self.zones.iter().position(|z| z.zone_id == zone_id)?;
    Some(self.zones.remove(index))
  }

  pub fn get(&self, zone_id: Uuid) -> Option<&SafeZone> {
    self.zones.iter().find(|z| z.zone_id == zone_id)
  }

  pub fn list_zones(&self) -> &[SafeZone] { &self.zones }

  pub fn len(&self) -> usize { self.zones.len() }

  pub fn is_empty(&self) -> bool { self.zones.is_empty() }
}

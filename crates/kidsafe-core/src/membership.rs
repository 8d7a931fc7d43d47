//! Per-subject, per-zone inside/outside state and transition detection.
//!
//! Evaluation is pure with respect to alerts: [`MembershipTracker::evaluate`]
//! only returns [`Transition`]s, and the caller decides what to do with them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{geo, position::PositionSample, zone::SafeZone};

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
  Entry,
  Exit,
}

/// A subject crossed the boundary of one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
  pub subject_id: String,
  pub zone_id:    Uuid,
  pub zone_name:  String,
  pub kind:       TransitionKind,
}

/// Persisted form of one membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEntry {
  pub subject_id: String,
  pub zone_id:    Uuid,
  pub inside:     bool,
}

/// Tracks whether each subject is currently inside each zone.
///
/// A missing entry means "previously outside", so the first sample found
/// inside a zone yields an [`TransitionKind::Entry`]. Entries for removed
/// zones are left in place; they are never looked at again because
/// evaluation only walks the zones it is given.
#[derive(Debug, Clone, Default)]
pub struct MembershipTracker {
  state: HashMap<(String, Uuid), bool>,
}

impl MembershipTracker {
  pub fn new() -> Self { Self::default() }

  pub fn from_entries(entries: impl IntoIterator<Item = MembershipEntry>) -> Self {
    Self {
      state: entries
        .into_iter()
        .map(|e| ((e.subject_id, e.zone_id), e.inside))
        .collect(),
    }
  }

  /// Re-evaluate `sample` against every zone in `zones`, in order.
  ///
  /// The new state is stored for every zone, whether or not it changed.
  pub fn evaluate(&mut self, sample: &PositionSample, zones: &[SafeZone]) -> Vec<Transition> {
    let mut transitions = Vec::new();

    for zone in zones {
      let meters = geo::distance(sample.coordinate, zone.center);
      let inside = meters <= zone.radius_meters;
      let key = (sample.subject_id.clone(), zone.zone_id);
      let was_inside = self.state.insert(key, inside).unwrap_or(false);

      let kind = match (was_inside, inside) {
        (false, true) => TransitionKind::Entry,
        (true, false) => TransitionKind::Exit,
        _ => continue,
      };

      tracing::debug!(
        subject = %sample.subject_id,
        zone = %zone.name,
        distance = meters,
        ?kind,
        "membership transition"
      );

      transitions.push(Transition {
        subject_id: sample.subject_id.clone(),
        zone_id: zone.zone_id,
        zone_name: zone.name.clone(),
        kind,
      });
    }

    transitions
  }

  /// Last evaluated state, or `None` if the pair was never evaluated.
  pub fn is_inside(&self, subject_id: &str, zone_id: Uuid) -> Option<bool> {
    self.state.get(&(subject_id.to_owned(), zone_id)).copied()
  }

  /// Every entry, sorted by subject then zone for a stable snapshot.
  pub fn entries(&self) -> Vec<MembershipEntry> {
    let mut entries: Vec<_> = self
      .state
      .iter()
      .map(|((subject_id, zone_id), inside)| MembershipEntry {
        subject_id: subject_id.clone(),
        zone_id:    *zone_id,
        inside:     *inside,
      })
      .collect();
    entries.sort_by(|a, b| {
      a.subject_id
        .cmp(&b.subject_id)
        .then_with(|| a.zone_id.cmp(&b.zone_id))
    });
    entries
  }

  pub fn len(&self) -> usize { self.state.len() }

  pub fn is_empty(&self) -> bool { self.state.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    geo::Coordinate,
    zone::{NewZone, ZoneStore},
  };

  const HOME: Coordinate = Coordinate::new(40.7128, -74.0060);
  const AWAY: Coordinate = Coordinate::new(40.7600, -73.9800);

  fn store_with_home(radius: f64) -> (ZoneStore, SafeZone) {
    let mut zones = ZoneStore::new();
    let home = zones.add_zone(NewZone::new("Home", HOME, radius)).unwrap();
    (zones, home)
  }

  fn at(coordinate: Coordinate) -> PositionSample { PositionSample::new("kid", coordinate) }

  fn kinds(transitions: &[Transition]) -> Vec<TransitionKind> {
    transitions.iter().map(|t| t.kind).collect()
  }

  #[test]
  fn first_sample_inside_is_an_entry() {
    let (zones, home) = store_with_home(50.0);
    let mut tracker = MembershipTracker::new();

    let first = tracker.evaluate(&at(HOME), zones.list_zones());
    assert_eq!(first, vec![Transition {
      subject_id: "kid".into(),
      zone_id:    home.zone_id,
      zone_name:  "Home".into(),
      kind:       TransitionKind::Entry,
    }]);

    let second = tracker.evaluate(&at(HOME.offset(0.0001, 0.0)), zones.list_zones());
    assert!(second.is_empty());
  }

  #[test]
  fn first_sample_outside_emits_nothing_but_records_state() {
    let (zones, home) = store_with_home(50.0);
    let mut tracker = MembershipTracker::new();

    assert!(tracker.evaluate(&at(AWAY), zones.list_zones()).is_empty());
    assert_eq!(tracker.is_inside("kid", home.zone_id), Some(false));
  }

  #[test]
  fn in_out_in_produces_entry_exit_entry() {
    let (zones, _) = store_with_home(50.0);
    let mut tracker = MembershipTracker::new();

    let mut all = Vec::new();
    for c in [HOME, AWAY, HOME] {
      all.extend(tracker.evaluate(&at(c), zones.list_zones()));
    }
    assert_eq!(kinds(&all), [
      TransitionKind::Entry,
      TransitionKind::Exit,
      TransitionKind::Entry
    ]);
  }

  #[test]
  fn boundary_is_inclusive() {
    let edge = HOME.offset(0.0003, 0.0);
    let radius = geo::distance(edge, HOME);

    let (zones, _) = store_with_home(radius);
    let mut tracker = MembershipTracker::new();
    assert_eq!(kinds(&tracker.evaluate(&at(edge), zones.list_zones())), [
      TransitionKind::Entry
    ]);

    let (zones, _) = store_with_home(radius - 1e-6);
    let mut tracker = MembershipTracker::new();
    assert!(tracker.evaluate(&at(edge), zones.list_zones()).is_empty());
  }

  #[test]
  fn subjects_are_tracked_independently() {
    let (zones, home) = store_with_home(50.0);
    let mut tracker = MembershipTracker::new();

    tracker.evaluate(&PositionSample::new("a", HOME), zones.list_zones());
    let b = tracker.evaluate(&PositionSample::new("b", HOME), zones.list_zones());
    assert_eq!(kinds(&b), [TransitionKind::Entry]);
    assert_eq!(tracker.is_inside("a", home.zone_id), Some(true));
    assert_eq!(tracker.is_inside("c", home.zone_id), None);
  }

  #[test]
  fn removed_zone_stops_transitions() {
    let (mut zones, home) = store_with_home(50.0);
    let mut tracker = MembershipTracker::new();

    tracker.evaluate(&at(HOME), zones.list_zones());
    zones.remove_zone(home.zone_id);

    assert!(tracker.evaluate(&at(AWAY), zones.list_zones()).is_empty());
    // The stale entry is kept as-is.
    assert_eq!(tracker.is_inside("kid", home.zone_id), Some(true));
  }

  #[test]
  fn overlapping_zones_fire_in_zone_order() {
    let mut zones = ZoneStore::new();
    zones.add_zone(NewZone::new("Home", HOME, 50.0)).unwrap();
    zones.add_zone(NewZone::new("Block", HOME, 500.0)).unwrap();
    let mut tracker = MembershipTracker::new();

    let names: Vec<_> = tracker
      .evaluate(&at(HOME), zones.list_zones())
      .into_iter()
      .map(|t| t.zone_name)
      .collect();
    assert_eq!(names, ["Home", "Block"]);
  }

  #[test]
  fn entries_round_trip() {
    let (zones, home) = store_with_home(50.0);
    let mut tracker = MembershipTracker::new();
    tracker.evaluate(&at(HOME), zones.list_zones());

    let restored = MembershipTracker::from_entries(tracker.entries());
    assert_eq!(restored.is_inside("kid", home.zone_id), Some(true));
    assert_eq!(restored.len(), 1);
  }
}

//! The persisted form of engine state.

use serde::{Deserialize, Serialize};

use crate::{alert::AlertRecord, membership::MembershipEntry, zone::SafeZone};

/// Zones, alerts and membership state, as saved between sessions.
///
/// Zones and alerts are stored oldest first, matching their in-memory order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
  #[serde(default)]
  pub zones:      Vec<SafeZone>,
  #[serde(default)]
  pub alerts:     Vec<AlertRecord>,
  #[serde(default)]
  pub membership: Vec<MembershipEntry>,
}

impl EngineSnapshot {
  pub fn is_empty(&self) -> bool {
    self.zones.is_empty() && self.alerts.is_empty() && self.membership.is_empty()
  }
}

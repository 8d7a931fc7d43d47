//! Alert records and the append-only log that holds them.
//!
//! Records are never removed. The only mutation is acknowledgement, which
//! flips `acknowledged` from `false` to `true` at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// What raised an alert.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertKind {
  Sos,
  ZoneEntry,
  ZoneExit,
  LowBattery,
}

/// A timestamped, acknowledgeable notice about one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
  pub alert_id:     Uuid,
  pub kind:         AlertKind,
  pub message:      String,
  pub subject_id:   String,
  pub subject_name: String,
  /// Set by the log on append.
  pub raised_at:    DateTime<Utc>,
  pub acknowledged: bool,
}

/// Input to [`AlertLog::append`]. Id, timestamp and acknowledgement are
/// assigned by the log.
#[derive(Debug, Clone)]
pub struct NewAlert {
  pub kind:         AlertKind,
  pub message:      String,
  pub subject_id:   String,
  pub subject_name: String,
}

/// Ordered collection of alerts. Storage is insertion order; [`list`]
/// returns newest first.
///
/// [`list`]: AlertLog::list
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
  records: Vec<AlertRecord>,
}

impl AlertLog {
  pub fn new() -> Self { Self::default() }

  /// Rebuild a log from records in insertion (oldest-first) order.
  pub fn from_records(records: Vec<AlertRecord>) -> Self { Self { records } }

  pub fn append(&mut self, draft: NewAlert) -> AlertRecord {
    let record = AlertRecord {
      alert_id:     Uuid::new_v4(),
      kind:         draft.kind,
      message:      draft.message,
      subject_id:   draft.subject_id,
      subject_name: draft.subject_name,
      raised_at:    Utc::now(),
      acknowledged: false,
    };
    self.records.push(record.clone());
    record
  }

  /// Mark an alert as acknowledged.
  ///
  /// Returns `true` if the alert exists, including when it was already
  /// acknowledged, and `false` for an unknown id.
  pub fn acknowledge(&mut self, alert_id: Uuid) -> bool {
    match self.records.iter_mut().find(|r| r.alert_id == alert_id) {
      Some(record) => {
        record.acknowledged = true;
        true
      }
      None => false,
    }
  }

  pub fn get(&self, alert_id: Uuid) -> Option<&AlertRecord> {
    self.records.iter().find(|r| r.alert_id == alert_id)
  }

  /// Newest first.
  pub fn list(&self) -> Vec<AlertRecord> { self.records.iter().rev().cloned().collect() }

  /// Oldest first, as stored.
  pub fn records(&self) -> &[AlertRecord] { &self.records }

  pub fn unacknowledged_count(&self) -> usize {
    self.records.iter().filter(|r| !r.acknowledged).count()
  }

  pub fn total_count(&self) -> usize { self.records.len() }
}

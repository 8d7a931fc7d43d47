//! Position samples and the bounded per-subject history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Number of samples kept per subject unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// One reported position of a tracked subject.
///
/// Samples are not required to arrive in `captured_at` order; consumers only
/// care about the most recently ingested one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
  pub subject_id:  String,
  pub coordinate:  Coordinate,
  pub captured_at: DateTime<Utc>,
}

impl PositionSample {
  /// A sample captured now.
  pub fn new(subject_id: impl Into<String>, coordinate: Coordinate) -> Self {
    Self {
      subject_id: subject_id.into(),
      coordinate,
      captured_at: Utc::now(),
    }
  }
}

/// Fixed-capacity ring of the most recent samples; the oldest is dropped once
/// the capacity is reached.
#[derive(Debug, Clone)]
pub struct LocationHistory {
  capacity: usize,
  samples:  VecDeque<PositionSample>,
}

impl LocationHistory {
  /// A capacity of zero is treated as one.
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      capacity,
      samples: VecDeque::with_capacity(capacity),
    }
  }

  pub fn push(&mut self, sample: PositionSample) {
    if self.samples.len() == self.capacity {
      self.samples.pop_front();
    }
    self.samples.push_back(sample);
  }

  pub fn latest(&self) -> Option<&PositionSample> { self.samples.back() }

  /// Oldest first.
  pub fn iter(&self) -> impl Iterator<Item = &PositionSample> { self.samples.iter() }

  pub fn to_vec(&self) -> Vec<PositionSample> { self.samples.iter().cloned().collect() }

  pub fn len(&self) -> usize { self.samples.len() }

  pub fn is_empty(&self) -> bool { self.samples.is_empty() }

  pub fn capacity(&self) -> usize { self.capacity }
}

impl Default for LocationHistory {
  fn default() -> Self { Self::with_capacity(DEFAULT_HISTORY_CAPACITY) }
}

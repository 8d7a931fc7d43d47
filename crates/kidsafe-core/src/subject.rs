//! Subject identity: resolving a tracked subject's id to a display name.
//!
//! The engine trusts whatever id and name it is handed. Where names come from
//! (an account store, a fixture, a device registry) is the caller's choice,
//! expressed through [`SubjectDirectory`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A tracked person as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: String,
  pub name:       String,
}

impl Subject {
  pub fn new(subject_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      subject_id: subject_id.into(),
      name:       name.into(),
    }
  }
}

/// Resolves subject ids to display names.
pub trait SubjectDirectory: Send + Sync {
  fn display_name(&self, subject_id: &str) -> Option<String>;

  /// The display name, falling back to the raw id.
  fn name_or_id(&self, subject_id: &str) -> String {
    self
      .display_name(subject_id)
      .unwrap_or_else(|| subject_id.to_owned())
  }
}

/// A fixed, in-memory [`SubjectDirectory`].
#[derive(Debug, Clone, Default)]
pub struct Roster {
  names: HashMap<String, String>,
}

impl Roster {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, subject: Subject) {
    self.names.insert(subject.subject_id, subject.name);
  }

  pub fn with(mut self, subject_id: impl Into<String>, name: impl Into<String>) -> Self {
    self.insert(Subject::new(subject_id, name));
    self
  }

  pub fn len(&self) -> usize { self.names.len() }

  pub fn is_empty(&self) -> bool { self.names.is_empty() }
}

impl FromIterator<Subject> for Roster {
  fn from_iter<I: IntoIterator<Item = Subject>>(iter: I) -> Self {
    let mut roster = Self::new();
    for subject in iter {
      roster.insert(subject);
    }
    roster
  }
}

impl SubjectDirectory for Roster {
  fn display_name(&self, subject_id: &str) -> Option<String> {
    self.names.get(subject_id).cloned()
  }
}

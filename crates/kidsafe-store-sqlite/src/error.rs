//! Error type for `kidsafe-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A row's id, email, pairing code or role column disagrees with its JSON
  /// record.
  #[error("corrupt account row {0}")]
  CorruptAccount(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

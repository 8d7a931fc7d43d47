//! Error types for `kidsafe-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid zone: {0}")]
  InvalidZoneSpec(String),

  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("an account with email {0:?} already exists")]
  EmailTaken(String),

  #[error("invalid pairing code: {0:?}")]
  InvalidPairingCode(String),

  #[error("account {0} does not have the required role")]
  RoleMismatch(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

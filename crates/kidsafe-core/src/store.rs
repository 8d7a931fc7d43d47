//! The `Repository` trait, the persistence boundary for accounts and snapshots.
//!
//! The trait is implemented by storage backends (e.g. `kidsafe-store-sqlite`,
//! or [`crate::memory::MemoryStore`] in tests). Services depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, PairingCode},
  snapshot::EngineSnapshot,
};

/// Secondary keys an account can be found by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
  /// Normalised (trimmed, lowercase) email address.
  Email(String),
  PairingCode(PairingCode),
}

/// Abstraction over a Kidsafe storage backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait Repository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Insert or replace an account, keyed by `account_id`.
  fn put_account(
    &self,
    account: Account,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve an account by id. Returns `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Find the account matching a secondary key.
  fn find_account(
    &self,
    lookup: AccountLookup,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// All accounts, oldest first.
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  // ── Engine state ──────────────────────────────────────────────────────

  /// The last saved snapshot, or `None` if nothing was saved yet.
  fn load_snapshot(
    &self,
  ) -> impl Future<Output = Result<Option<EngineSnapshot>, Self::Error>> + Send + '_;

  /// Replace the saved snapshot.
  fn save_snapshot(
    &self,
    snapshot: EngineSnapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

//! [`MemoryStore`]: an in-process [`Repository`] for tests and demos.

use std::{
  convert::Infallible,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use crate::{
  account::Account,
  snapshot::EngineSnapshot,
  store::{AccountLookup, Repository},
};

#[derive(Debug, Default)]
struct Inner {
  /// Insertion order is preserved; replacing an account keeps its slot.
  accounts: Vec<Account>,
  snapshot: Option<EngineSnapshot>,
}

/// A repository held entirely in memory.
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn read(&self) -> RwLockReadGuard<'_, Inner> {
    self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, Inner> {
    self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl Repository for MemoryStore {
  type Error = Infallible;

  async fn put_account(&self, account: Account) -> Result<(), Infallible> {
    let mut inner = self.write();
    match inner
      .accounts
      .iter()
      .position(|a| a.account_id == account.account_id)
    {
      Some(index) => inner.accounts[index] = account,
      None => inner.accounts.push(account),
    }
    Ok(())
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>, Infallible> {
    Ok(self.read().accounts.iter().find(|a| a.account_id == id).cloned())
  }

  async fn find_account(&self, lookup: AccountLookup) -> Result<Option<Account>, Infallible> {
    let inner = self.read();
    let found = inner.accounts.iter().find(|a| match &lookup {
      AccountLookup::Email(email) => &a.email == email,
      AccountLookup::PairingCode(code) => a.pairing_code.as_ref() == Some(code),
    });
    Ok(found.cloned())
  }

  async fn list_accounts(&self) -> Result<Vec<Account>, Infallible> {
    Ok(self.read().accounts.clone())
  }

  async fn load_snapshot(&self) -> Result<Option<EngineSnapshot>, Infallible> {
    Ok(self.read().snapshot.clone())
  }

  async fn save_snapshot(&self, snapshot: EngineSnapshot) -> Result<(), Infallible> {
    self.write().snapshot = Some(snapshot);
    Ok(())
  }
}

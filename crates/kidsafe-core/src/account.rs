//! Accounts and parent↔child pairing.
//!
//! A parent registers and receives a 6-digit pairing code. A child enters
//! that code to link the two accounts; from then on the parent may track the
//! child. No credentials are stored here: who is allowed to act as which
//! account is the caller's concern.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::{AccountLookup, Repository},
  subject::{Roster, Subject},
};

/// How many fresh codes to try before giving up on finding an unused one.
const PAIRING_CODE_ATTEMPTS: usize = 32;

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Parent,
  Child,
}

// ─── Pairing code ────────────────────────────────────────────────────────────

/// Exactly six ASCII digits, never starting with `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairingCode(String);

impl PairingCode {
  /// A random code in `100000..=999999`.
  pub fn generate() -> Self {
    let n = 100_000 + OsRng.next_u32() % 900_000;
    Self(n.to_string())
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for PairingCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    let valid = s.len() == 6
      && s.bytes().all(|b| b.is_ascii_digit())
      && !s.starts_with('0');
    if valid {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidPairingCode(s.to_owned()))
    }
  }
}

impl TryFrom<String> for PairingCode {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<PairingCode> for String {
  fn from(code: PairingCode) -> Self { code.0 }
}

impl fmt::Display for PairingCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Account ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  pub account_id:   Uuid,
  pub name:         String,
  /// Stored normalised: trimmed and lowercase.
  pub email:        String,
  pub role:         Role,
  /// Ids of the accounts on the other side of each pairing.
  #[serde(default)]
  pub paired_with:  Vec<Uuid>,
  /// Present for parents only.
  pub pairing_code: Option<PairingCode>,
  pub created_at:   DateTime<Utc>,
}

impl Account {
  /// The engine-facing identity of this account.
  pub fn subject(&self) -> Subject { Subject::new(self.account_id.to_string(), &self.name) }

  pub fn is_paired(&self) -> bool { !self.paired_with.is_empty() }
}

/// Input to [`AccountService::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub name:  String,
  pub email: String,
  pub role:  Role,
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

// ─── Service ─────────────────────────────────────────────────────────────────

/// Registration and pairing over any [`Repository`].
#[derive(Debug, Clone)]
pub struct AccountService<R> {
  repo: R,
}

impl<R: Repository> AccountService<R> {
  pub fn new(repo: R) -> Self { Self { repo } }

  pub fn repository(&self) -> &R { &self.repo }

  /// Create an account. Parents are issued a pairing code no other account
  /// holds.
  pub async fn register(&self, input: NewAccount) -> Result<Account> {
    let email = normalize_email(&input.email);
    if self
      .repo
      .find_account(AccountLookup::Email(email.clone()))
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::EmailTaken(email));
    }

    let pairing_code = match input.role {
      Role::Parent => Some(self.unused_pairing_code().await?),
      Role::Child => None,
    };

    let account = Account {
      account_id: Uuid::new_v4(),
      name: input.name.trim().to_owned(),
      email,
      role: input.role,
      paired_with: Vec::new(),
      pairing_code,
      created_at: Utc::now(),
    };
    self
      .repo
      .put_account(account.clone())
      .await
      .map_err(Error::store)?;

    tracing::info!(account = %account.account_id, role = %account.role, "registered account");
    Ok(account)
  }

  pub async fn get(&self, id: Uuid) -> Result<Account> {
    self
      .repo
      .get_account(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(id))
  }

  pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
    self
      .repo
      .find_account(AccountLookup::Email(normalize_email(email)))
      .await
      .map_err(Error::store)
  }

  /// Link a child to the parent holding `code`, on both sides. Pairing an
  /// already-paired couple again changes nothing. Returns the parent.
  pub async fn pair(&self, child_id: Uuid, code: &str) -> Result<Account> {
    let code: PairingCode = code.parse()?;

    let mut child = self.get(child_id).await?;
    if child.role != Role::Child {
      return Err(Error::RoleMismatch(child_id));
    }

    let mut parent = self
      .repo
      .find_account(AccountLookup::PairingCode(code.clone()))
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::InvalidPairingCode(code.to_string()))?;

    if !parent.paired_with.contains(&child.account_id) {
      parent.paired_with.push(child.account_id);
    }
    if !child.paired_with.contains(&parent.account_id) {
      child.paired_with.push(parent.account_id);
    }

    self
      .repo
      .put_account(parent.clone())
      .await
      .map_err(Error::store)?;
    self.repo.put_account(child).await.map_err(Error::store)?;

    tracing::info!(parent = %parent.account_id, child = %child_id, "paired accounts");
    Ok(parent)
  }

  /// Children the given parent may track.
  pub async fn children_of(&self, parent_id: Uuid) -> Result<Vec<Account>> {
    let parent = self.get(parent_id).await?;
    if parent.role != Role::Parent {
      return Err(Error::RoleMismatch(parent_id));
    }

    let mut children = Vec::with_capacity(parent.paired_with.len());
    for id in parent.paired_with {
      match self.repo.get_account(id).await.map_err(Error::store)? {
        Some(child) => children.push(child),
        None => tracing::warn!(parent = %parent_id, child = %id, "paired account is missing"),
      }
    }
    Ok(children)
  }

  /// A name directory covering every account.
  pub async fn roster(&self) -> Result<Roster> {
    let accounts = self.repo.list_accounts().await.map_err(Error::store)?;
    Ok(accounts.iter().map(Account::subject).collect())
  }

  async fn unused_pairing_code(&self) -> Result<PairingCode> {
    for _ in 0..PAIRING_CODE_ATTEMPTS {
      let code = PairingCode::generate();
      let taken = self
        .repo
        .find_account(AccountLookup::PairingCode(code.clone()))
        .await
        .map_err(Error::store)?
        .is_some();
      if !taken {
        return Ok(code);
      }
    }
    Err(Error::InvalidPairingCode(
      "no unused pairing code available".to_owned(),
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{memory::MemoryStore, subject::SubjectDirectory};

  fn service() -> AccountService<MemoryStore> { AccountService::new(MemoryStore::new()) }

  fn new_account(name: &str, email: &str, role: Role) -> NewAccount {
    NewAccount {
      name: name.into(),
      email: email.into(),
      role,
    }
  }

  #[test]
  fn generated_codes_are_six_digits() {
    for _ in 0..200 {
      let code = PairingCode::generate();
      assert_eq!(code.as_str().len(), 6);
      assert!(code.as_str().parse::<u32>().unwrap() >= 100_000);
      assert_eq!(code.as_str().parse::<PairingCode>().unwrap(), code);
    }
  }

  #[test]
  fn code_parsing_rejects_malformed_input() {
    for bad in ["", "12345", "1234567", "12a456", "012345"] {
      assert!(matches!(bad.parse::<PairingCode>(), Err(Error::InvalidPairingCode(_))));
    }
    assert_eq!(" 482913 ".parse::<PairingCode>().unwrap().as_str(), "482913");
  }

  #[tokio::test]
  async fn parents_get_codes_children_do_not() {
    let svc = service();
    let parent = svc
      .register(new_account("Dana", "dana@example.com", Role::Parent))
      .await
      .unwrap();
    let child = svc
      .register(new_account("Maya", "maya@example.com", Role::Child))
      .await
      .unwrap();

    assert!(parent.pairing_code.is_some());
    assert!(child.pairing_code.is_none());
  }

  #[tokio::test]
  async fn duplicate_email_is_rejected() {
    let svc = service();
    svc
      .register(new_account("Dana", "dana@example.com", Role::Parent))
      .await
      .unwrap();
    let err = svc
      .register(new_account("Other", "  DANA@example.com ", Role::Child))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::EmailTaken(e) if e == "dana@example.com"));
  }

  #[tokio::test]
  async fn pairing_links_both_sides_once() {
    let svc = service();
    let parent = svc
      .register(new_account("Dana", "dana@example.com", Role::Parent))
      .await
      .unwrap();
    let child = svc
      .register(new_account("Maya", "maya@example.com", Role::Child))
      .await
      .unwrap();
    let code = parent.pairing_code.clone().unwrap();

    let paired = svc.pair(child.account_id, code.as_str()).await.unwrap();
    assert_eq!(paired.account_id, parent.account_id);
    svc.pair(child.account_id, code.as_str()).await.unwrap();

    let parent = svc.get(parent.account_id).await.unwrap();
    let child = svc.get(child.account_id).await.unwrap();
    assert_eq!(parent.paired_with, vec![child.account_id]);
    assert_eq!(child.paired_with, vec![parent.account_id]);

    let children = svc.children_of(parent.account_id).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Maya");
  }

  #[tokio::test]
  async fn unknown_code_fails() {
    let svc = service();
    let child = svc
      .register(new_account("Maya", "maya@example.com", Role::Child))
      .await
      .unwrap();
    let err = svc.pair(child.account_id, "999999").await;
    assert!(matches!(err, Err(Error::InvalidPairingCode(_))));
    assert!(!svc.get(child.account_id).await.unwrap().is_paired());
  }

  #[tokio::test]
  async fn only_children_can_pair() {
    let svc = service();
    let parent = svc
      .register(new_account("Dana", "dana@example.com", Role::Parent))
      .await
      .unwrap();
    let other = svc
      .register(new_account("Sam", "sam@example.com", Role::Parent))
      .await
      .unwrap();
    let code = parent.pairing_code.unwrap();

    let err = svc.pair(other.account_id, code.as_str()).await;
    assert!(matches!(err, Err(Error::RoleMismatch(id)) if id == other.account_id));
  }

  #[tokio::test]
  async fn roster_names_every_account() {
    let svc = service();
    let child = svc
      .register(new_account(" Maya ", "maya@example.com", Role::Child))
      .await
      .unwrap();
    let roster = svc.roster().await.unwrap();
    assert_eq!(roster.name_or_id(&child.account_id.to_string()), "Maya");
  }
}

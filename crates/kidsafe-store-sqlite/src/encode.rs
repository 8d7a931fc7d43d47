//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! and whole records are compact JSON.

use chrono::{DateTime, Utc};
use kidsafe_core::{account::Account, snapshot::EngineSnapshot};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Account ─────────────────────────────────────────────────────────────────

/// Column values for one `accounts` row.
pub struct AccountRow {
  pub account_id:   String,
  pub email:        String,
  pub pairing_code: Option<String>,
  pub role:         String,
  pub created_at:   String,
  pub record_json:  String,
}

pub fn encode_account(account: &Account) -> Result<AccountRow> {
  Ok(AccountRow {
    account_id:   encode_uuid(account.account_id),
    email:        account.email.clone(),
    pairing_code: account.pairing_code.as_ref().map(|c| c.as_str().to_owned()),
    role:         account.role.to_string(),
    created_at:   encode_dt(account.created_at),
    record_json:  serde_json::to_string(account)?,
  })
}

/// Raw values read back from a row, before validation.
pub struct RawAccount {
  pub account_id:   String,
  pub email:        String,
  pub pairing_code: Option<String>,
  pub role:         String,
  pub record_json:  String,
}

impl RawAccount {
  /// Decode the JSON record and check it against the index columns.
  pub fn into_account(self) -> Result<Account> {
    let id = Uuid::parse_str(&self.account_id)?;
    let account: Account = serde_json::from_str(&self.record_json)?;

    let consistent = account.account_id == id
      && account.email == self.email
      && account.pairing_code.as_ref().map(|c| c.as_str()) == self.pairing_code.as_deref()
      && account.role.to_string() == self.role;
    if !consistent {
      return Err(Error::CorruptAccount(self.account_id));
    }
    Ok(account)
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

pub fn encode_snapshot(snapshot: &EngineSnapshot) -> Result<String> {
  Ok(serde_json::to_string(snapshot)?)
}

pub fn decode_snapshot(s: &str) -> Result<EngineSnapshot> { Ok(serde_json::from_str(s)?) }

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use kidsafe_core::account::Role;

  use super::*;

  fn parent() -> Account {
    Account {
      account_id:   Uuid::new_v4(),
      name:         "Dana".into(),
      email:        "dana@example.com".into(),
      role:         Role::Parent,
      paired_with:  Vec::new(),
      pairing_code: Some("482913".parse().unwrap()),
      created_at:   Utc::now(),
    }
  }

  fn raw(row: AccountRow) -> RawAccount {
    RawAccount {
      account_id:   row.account_id,
      email:        row.email,
      pairing_code: row.pairing_code,
      role:         row.role,
      record_json:  row.record_json,
    }
  }

  #[test]
  fn matching_row_decodes() {
    let account = parent();
    let decoded = raw(encode_account(&account).unwrap()).into_account().unwrap();
    assert_eq!(decoded, account);
  }

  #[test]
  fn any_mismatched_index_column_is_corrupt() {
    let account = parent();
    let tamperings: [fn(&mut RawAccount); 4] = [
      |r| r.account_id = encode_uuid(Uuid::new_v4()),
      |r| r.email = "someone@example.com".into(),
      |r| r.pairing_code = None,
      |r| r.role = "child".into(),
    ];

    for tamper in tamperings {
      let mut row = raw(encode_account(&account).unwrap());
      tamper(&mut row);
      assert!(matches!(row.into_account(), Err(Error::CorruptAccount(_))));
    }
  }
}

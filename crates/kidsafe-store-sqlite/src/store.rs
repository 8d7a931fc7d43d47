//! [`SqliteStore`]: the SQLite implementation of [`Repository`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kidsafe_core::{
  account::Account,
  snapshot::EngineSnapshot,
  store::{AccountLookup, Repository},
};

use crate::{
  Error, Result,
  encode::{RawAccount, decode_snapshot, encode_account, encode_dt, encode_snapshot, encode_uuid},
  schema::{SCHEMA, SNAPSHOT_KEY},
};

const SELECT_ACCOUNT: &str =
  "SELECT account_id, email, pairing_code, role, record_json FROM accounts";

fn raw_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccount> {
  Ok(RawAccount {
    account_id:   row.get(0)?,
    email:        row.get(1)?,
    pairing_code: row.get(2)?,
    role:         row.get(3)?,
    record_json:  row.get(4)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kidsafe repository backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_account(
    &self,
    sql: String,
    key: String,
  ) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], raw_account)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

// ─── Repository impl ─────────────────────────────────────────────────────────

impl Repository for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn put_account(&self, account: Account) -> Result<()> {
    let row = encode_account(&account)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             account_id, email, pairing_code, role, created_at, record_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (account_id) DO UPDATE SET
             email        = excluded.email,
             pairing_code = excluded.pairing_code,
             role         = excluded.role,
             record_json  = excluded.record_json",
          rusqlite::params![
            row.account_id,
            row.email,
            row.pairing_code,
            row.role,
            row.created_at,
            row.record_json,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(account = %account.account_id, "stored account");
    Ok(())
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    self
      .query_account(format!("{SELECT_ACCOUNT} WHERE account_id = ?1"), encode_uuid(id))
      .await
  }

  async fn find_account(&self, lookup: AccountLookup) -> Result<Option<Account>> {
    let (column, key) = match lookup {
      AccountLookup::Email(email) => ("email", email),
      AccountLookup::PairingCode(code) => ("pairing_code", code.as_str().to_owned()),
    };
    self
      .query_account(format!("{SELECT_ACCOUNT} WHERE {column} = ?1"), key)
      .await
  }

  async fn list_accounts(&self) -> Result<Vec<Account>> {
    let raws: Vec<RawAccount> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{SELECT_ACCOUNT} ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], raw_account)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_account).collect()
  }

  // ── Engine state ──────────────────────────────────────────────────────────

  async fn load_snapshot(&self) -> Result<Option<EngineSnapshot>> {
    let json: Option<String> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json FROM kv WHERE key = ?1",
              rusqlite::params![SNAPSHOT_KEY],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    json.as_deref().map(decode_snapshot).transpose()
  }

  async fn save_snapshot(&self, snapshot: EngineSnapshot) -> Result<()> {
    let json = encode_snapshot(&snapshot)?;
    let at = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value_json, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (key) DO UPDATE SET
             value_json = excluded.value_json,
             updated_at = excluded.updated_at",
          rusqlite::params![SNAPSHOT_KEY, json, at],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      zones = snapshot.zones.len(),
      alerts = snapshot.alerts.len(),
      "saved engine snapshot"
    );
    Ok(())
  }
}

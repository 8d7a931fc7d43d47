//! SQL schema for the Kidsafe SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Key under which the engine snapshot lives in the `kv` table.
pub const SNAPSHOT_KEY: &str = "engine_snapshot";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per account. The full record lives in record_json; the other
-- columns exist only so lookups can use an index.
CREATE TABLE IF NOT EXISTS accounts (
    account_id   TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,   -- normalised, lowercase
    pairing_code TEXT UNIQUE,            -- parents only
    role         TEXT NOT NULL,          -- 'parent' | 'child'
    created_at   TEXT NOT NULL,          -- RFC 3339 UTC
    record_json  TEXT NOT NULL
);

-- Plain key-value documents (engine snapshot).
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY,
    value_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

PRAGMA user_version = 1;
";

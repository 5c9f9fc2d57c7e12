//! SQL schema for the Odonto SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Snapshots are strictly append-only: the triggers below abort any UPDATE
-- or DELETE. `seq` breaks created_at ties by insertion order.
CREATE TABLE IF NOT EXISTS snapshots (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    snapshot_id  TEXT NOT NULL UNIQUE,
    owner_id     TEXT NOT NULL,
    subject_id   TEXT NOT NULL,
    state_json   TEXT NOT NULL,   -- {\"<tooth>\": \"<condition>\"}, sentinel never stored
    note         TEXT,
    created_at   TEXT NOT NULL    -- RFC 3339 UTC, fixed microsecond precision
);

CREATE TRIGGER IF NOT EXISTS snapshots_no_update
BEFORE UPDATE ON snapshots
BEGIN
    SELECT RAISE(ABORT, 'snapshots are append-only');
END;

CREATE TRIGGER IF NOT EXISTS snapshots_no_delete
BEFORE DELETE ON snapshots
BEGIN
    SELECT RAISE(ABORT, 'snapshots are append-only');
END;

CREATE INDEX IF NOT EXISTS snapshots_scope_idx
    ON snapshots(owner_id, subject_id, created_at);

PRAGMA user_version = 1;
";

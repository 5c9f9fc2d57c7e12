//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision and a `Z` suffix, so lexicographic order equals chronological
//! order. Chart state is stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound as _, Utc};
use odonto_core::{chart::ChartMap, snapshot::Snapshot};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The `created_at` for a new snapshot: `now` at stored precision, pushed
/// past `prev` (the newest stored value for the same scope) if the clock has
/// not moved beyond it.
pub fn next_created_at(now: DateTime<Utc>, prev: Option<&str>) -> DateTime<Utc> {
  let now = now.trunc_subsecs(6);
  match prev.and_then(|s| decode_dt(s).ok()) {
    Some(prev) if prev >= now => prev + Duration::microseconds(1),
    _ => now,
  }
}

// ─── Chart state ─────────────────────────────────────────────────────────────

pub fn encode_state(state: &ChartMap) -> Result<String> {
  Ok(serde_json::to_string(state)?)
}

pub fn decode_state(s: &str) -> Result<ChartMap> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `snapshots` row.
pub struct RawSnapshot {
  pub snapshot_id: String,
  pub owner_id:    String,
  pub subject_id:  String,
  pub state_json:  String,
  pub note:        Option<String>,
  pub created_at:  String,
}

/// Column list matching [`RawSnapshot::from_row`].
pub const SNAPSHOT_COLUMNS: &str =
  "snapshot_id, owner_id, subject_id, state_json, note, created_at";

impl RawSnapshot {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      snapshot_id: row.get(0)?,
      owner_id:    row.get(1)?,
      subject_id:  row.get(2)?,
      state_json:  row.get(3)?,
      note:        row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_snapshot(self) -> Result<Snapshot> {
    Ok(Snapshot {
      id:         decode_uuid(&self.snapshot_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      state:      decode_state(&self.state_json)?,
      note:       self.note,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

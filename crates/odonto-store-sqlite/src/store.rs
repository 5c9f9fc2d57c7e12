//! [`SqliteStore`] — the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use odonto_core::{
  chart::validate,
  snapshot::{NewSnapshot, OwnerId, Snapshot, SubjectId},
  store::SnapshotStore,
};

use crate::{
  Result,
  encode::{
    RawSnapshot, SNAPSHOT_COLUMNS, encode_dt, encode_state, encode_uuid,
    next_created_at,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Odonto snapshot store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
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
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteStore {
  type Error = crate::Error;

  async fn append(&self, owner: OwnerId, input: NewSnapshot) -> Result<Snapshot> {
    if let Err(e) = validate(&input.state) {
      tracing::warn!(subject_id = %input.subject_id, "rejected snapshot: {e}");
      return Err(e.into());
    }

    let id             = Uuid::new_v4();
    let id_str         = encode_uuid(id);
    let owner_str      = encode_uuid(owner);
    let subject_str    = encode_uuid(input.subject_id);
    let state_json_str = encode_state(&input.state)?;
    let note           = input.note.clone();
    let now            = Utc::now();

    // Reading the newest timestamp and inserting happen in one transaction
    // on the connection thread, so concurrent appends cannot interleave.
    let created_at = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let prev: Option<String> = tx.query_row(
          "SELECT MAX(created_at) FROM snapshots
           WHERE owner_id = ?1 AND subject_id = ?2",
          rusqlite::params![owner_str, subject_str],
          |r| r.get(0),
        )?;
        let created_at = next_created_at(now, prev.as_deref());

        tx.execute(
          "INSERT INTO snapshots (
             snapshot_id, owner_id, subject_id, state_json, note, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            owner_str,
            subject_str,
            state_json_str,
            note,
            encode_dt(created_at),
          ],
        )?;
        tx.commit()?;
        Ok(created_at)
      })
      .await?;

    let snapshot = Snapshot {
      id,
      owner_id: owner,
      subject_id: input.subject_id,
      state: input.state,
      note: input.note,
      created_at,
    };

    tracing::info!(
      snapshot_id = %snapshot.id,
      subject_id = %snapshot.subject_id,
      teeth = snapshot.state.len(),
      "appended chart snapshot"
    );
    Ok(snapshot)
  }

  async fn list(&self, owner: OwnerId, subject: SubjectId) -> Result<Vec<Snapshot>> {
    let owner_str   = encode_uuid(owner);
    let subject_str = encode_uuid(subject);

    let raws: Vec<RawSnapshot> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
           WHERE owner_id = ?1 AND subject_id = ?2
           ORDER BY created_at DESC, seq DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, subject_str],
            RawSnapshot::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(subject_id = %subject, count = raws.len(), "listed chart snapshots");
    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }

  async fn latest(
    &self,
    owner:   OwnerId,
    subject: SubjectId,
  ) -> Result<Option<Snapshot>> {
    let owner_str   = encode_uuid(owner);
    let subject_str = encode_uuid(subject);

    let raw: Option<RawSnapshot> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
               WHERE owner_id = ?1 AND subject_id = ?2
               ORDER BY created_at DESC, seq DESC
               LIMIT 1"
            ),
            rusqlite::params![owner_str, subject_str],
            RawSnapshot::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSnapshot::into_snapshot).transpose()
  }

  async fn get(
    &self,
    owner:   OwnerId,
    subject: SubjectId,
    id:      Uuid,
  ) -> Result<Option<Snapshot>> {
    let id_str      = encode_uuid(id);
    let owner_str   = encode_uuid(owner);
    let subject_str = encode_uuid(subject);

    let raw: Option<RawSnapshot> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
               WHERE snapshot_id = ?1 AND owner_id = ?2 AND subject_id = ?3"
            ),
            rusqlite::params![id_str, owner_str, subject_str],
            RawSnapshot::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSnapshot::into_snapshot).transpose()
  }
}

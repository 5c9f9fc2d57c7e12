//! In-memory [`ChartLog`] for unit tests.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use chrono::{Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  chart::{ChartMap, validate},
  error::ValidationError,
  snapshot::Snapshot,
  store::ChartLog,
};

#[derive(Debug, Error)]
pub enum MemoryLogError {
  #[error(transparent)]
  Validation(#[from] ValidationError),
  #[error("injected failure")]
  Injected,
}

#[derive(Clone, Default)]
pub struct MemoryLog {
  subject:   Uuid,
  /// Insertion order.
  snapshots: Arc<Mutex<Vec<Snapshot>>>,
  fail_next: Arc<AtomicBool>,
}

impl MemoryLog {
  pub fn snapshots(&self) -> Vec<Snapshot> { self.snapshots.lock().unwrap().clone() }

  pub fn fail_next_append(&self) { self.fail_next.store(true, Ordering::SeqCst); }

  /// Append directly, bypassing any session.
  pub fn seed(&self, state: ChartMap) -> Snapshot { self.push(state, None) }

  fn push(&self, state: ChartMap, note: Option<String>) -> Snapshot {
    let mut snapshots = self.snapshots.lock().unwrap();
    let now = Utc::now();
    let created_at = match snapshots.last() {
      Some(prev) if prev.created_at >= now => prev.created_at + Duration::microseconds(1),
      _ => now,
    };
    let snapshot = Snapshot {
      id: Uuid::new_v4(),
      owner_id: Uuid::nil(),
      subject_id: self.subject,
      state,
      note,
      created_at,
    };
    snapshots.push(snapshot.clone());
    snapshot
  }
}

impl ChartLog for MemoryLog {
  type Error = MemoryLogError;

  fn subject_id(&self) -> Uuid { self.subject }

  async fn append(
    &self,
    state: ChartMap,
    note: Option<String>,
  ) -> Result<Snapshot, MemoryLogError> {
    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(MemoryLogError::Injected);
    }
    validate(&state)?;
    Ok(self.push(state, note))
  }

  async fn list(&self) -> Result<Vec<Snapshot>, MemoryLogError> {
    let mut all = self.snapshots();
    all.reverse();
    Ok(all)
  }
}

//! Chart editing session. Derives the current chart from a patient's
//! snapshot history and mediates every edit, pin and commit.
//!
//! ```text
//!            pin(id)                         set_condition
//!   Current ─────────▶ ViewingHistorical     Current ─────────▶ Editing ─┐
//!      ▲                      │                 ▲                  │  ▲  │ set_condition
//!      └──── return_to_current┘                 └── commit/discard ┘  └──┘
//! ```
//!
//! The current chart is the newest snapshot (or an empty chart when there is
//! no history). A pinned historical snapshot is read-only: edits and commits
//! are rejected until the session returns to the current chart.

use thiserror::Error;
use uuid::Uuid;

use crate::{
  buffer::MutationBuffer,
  chart::{ChartMap, ToothChange, condition_of, diff},
  condition::Condition,
  snapshot::Snapshot,
  store::ChartLog,
  tooth::ToothNumber,
};

/// What the session is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// The newest snapshot, unmodified.
  Current,
  /// A pinned snapshot from history, read-only.
  ViewingHistorical(Uuid),
  /// The newest snapshot plus uncommitted edits.
  Editing,
}

#[derive(Debug, Error)]
pub enum SessionError<E: std::error::Error + 'static> {
  #[error("snapshot {0} is a historical view and cannot be edited")]
  ReadOnly(Uuid),

  #[error("there are unsaved edits; commit or discard them first")]
  UnsavedEdits,

  #[error("snapshot {0} is not part of this chart's history")]
  UnknownSnapshot(Uuid),

  #[error("chart log error: {0}")]
  Log(#[source] E),
}

/// An editor's view of one patient's chart.
pub struct ChartSession<L: ChartLog> {
  log:     L,
  /// Newest first.
  history: Vec<Snapshot>,
  mode:    Mode,
  /// Always seeded from the newest snapshot when not editing.
  buffer:  MutationBuffer,
}

impl<L: ChartLog> ChartSession<L> {
  /// Load the history from `log` and start in [`Mode::Current`].
  pub async fn open(log: L) -> Result<Self, SessionError<L::Error>> {
    let history = log.list().await.map_err(SessionError::Log)?;
    let buffer = MutationBuffer::new(head_state(&history));
    Ok(Self { log, history, mode: Mode::Current, buffer })
  }

  pub fn log(&self) -> &L { &self.log }

  pub fn mode(&self) -> Mode { self.mode }

  /// All known snapshots, newest first.
  pub fn history(&self) -> &[Snapshot] { &self.history }

  /// The snapshot the current chart is derived from.
  pub fn current(&self) -> Option<&Snapshot> { self.history.first() }

  pub fn is_dirty(&self) -> bool { self.buffer.is_dirty() }

  fn find(&self, id: Uuid) -> Option<&Snapshot> {
    self.history.iter().find(|s| s.id == id)
  }

  /// The chart to render in the current mode.
  pub fn displayed(&self) -> &ChartMap {
    match self.mode {
      Mode::ViewingHistorical(id) => match self.find(id) {
        Some(s) => &s.state,
        None => self.buffer.entries(),
      },
      Mode::Current | Mode::Editing => self.buffer.entries(),
    }
  }

  pub fn condition_of(&self, tooth: ToothNumber) -> Condition {
    condition_of(self.displayed(), tooth)
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// Show snapshot `id` read-only.
  pub fn pin(&mut self, id: Uuid) -> Result<(), SessionError<L::Error>> {
    if self.mode == Mode::Editing {
      return Err(SessionError::UnsavedEdits);
    }
    if self.find(id).is_none() {
      return Err(SessionError::UnknownSnapshot(id));
    }
    self.mode = Mode::ViewingHistorical(id);
    Ok(())
  }

  /// Leave a historical view. The history is re-read so the current chart
  /// reflects commits made elsewhere in the meantime.
  pub async fn return_to_current(&mut self) -> Result<(), SessionError<L::Error>> {
    match self.mode {
      Mode::ViewingHistorical(_) => self.reload().await,
      Mode::Current | Mode::Editing => Ok(()),
    }
  }

  /// Re-read the history and show the newest snapshot.
  pub async fn reload(&mut self) -> Result<(), SessionError<L::Error>> {
    if self.mode == Mode::Editing {
      return Err(SessionError::UnsavedEdits);
    }
    self.history = self.log.list().await.map_err(SessionError::Log)?;
    self.buffer.reset(head_state(&self.history));
    self.mode = Mode::Current;
    Ok(())
  }

  /// Edit one tooth of the current chart.
  pub fn set_condition(
    &mut self,
    tooth: ToothNumber,
    condition: Condition,
  ) -> Result<(), SessionError<L::Error>> {
    if let Mode::ViewingHistorical(id) = self.mode {
      return Err(SessionError::ReadOnly(id));
    }
    self.buffer.set_condition(tooth, condition);
    self.mode = Mode::Editing;
    Ok(())
  }

  /// Drop all uncommitted edits.
  pub fn discard(&mut self) {
    if self.mode == Mode::Editing {
      self.buffer.reset(head_state(&self.history));
      self.mode = Mode::Current;
    }
  }

  /// Persist the displayed chart as a new snapshot, which becomes current.
  ///
  /// Committing without edits records an unchanged checkpoint. On failure the
  /// session stays in its mode with its edits intact.
  pub async fn commit(
    &mut self,
    note: Option<String>,
  ) -> Result<&Snapshot, SessionError<L::Error>> {
    if let Mode::ViewingHistorical(id) = self.mode {
      return Err(SessionError::ReadOnly(id));
    }
    let snapshot = self
      .buffer
      .commit(&self.log, note)
      .await
      .map_err(SessionError::Log)?;

    self.buffer.reset(snapshot.state.clone());
    self.history.insert(0, snapshot);
    self.mode = Mode::Current;
    Ok(&self.history[0])
  }

  // ── Comparison ────────────────────────────────────────────────────────────

  /// Changes from snapshot `id` to the current chart.
  pub fn diff_against_current(
    &self,
    id: Uuid,
  ) -> Result<Vec<ToothChange>, SessionError<L::Error>> {
    let snapshot = self.find(id).ok_or(SessionError::UnknownSnapshot(id))?;
    Ok(diff(&snapshot.state, &head_state(&self.history)))
  }
}

fn head_state(history: &[Snapshot]) -> ChartMap {
  history.first().map(|s| s.state.clone()).unwrap_or_default()
}

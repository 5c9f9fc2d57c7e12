//! Snapshots: immutable, timestamped captures of a patient's whole chart.
//!
//! A snapshot is never updated or deleted. The "current" chart of a patient
//! is not stored anywhere; it is the newest snapshot for that patient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  chart::{ChartMap, condition_of},
  condition::Condition,
  tooth::ToothNumber,
};

/// The clinic account that owns a set of charts. Every store operation is
/// scoped by one.
pub type OwnerId = Uuid;

/// The patient a chart belongs to.
pub type SubjectId = Uuid;

/// One committed chart state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub id:         Uuid,
  pub owner_id:   OwnerId,
  pub subject_id: SubjectId,
  /// Teeth with recorded data. Absent teeth have no data.
  pub state:      ChartMap,
  pub note:       Option<String>,
  /// Server-assigned; the sole ordering key.
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::SnapshotStore::append`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
  pub subject_id: SubjectId,
  pub state:      ChartMap,
  pub note:       Option<String>,
}

impl NewSnapshot {
  pub fn new(subject_id: SubjectId, state: ChartMap) -> Self {
    Self { subject_id, state, note: None }
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }
}

// ─── Per-tooth history ───────────────────────────────────────────────────────

/// A snapshot in which one tooth's condition changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToothEvent<'a> {
  pub snapshot_id: Uuid,
  pub at:          DateTime<Utc>,
  /// The tooth's condition from this snapshot on. [`Condition::None`] means
  /// the snapshot cleared it.
  pub condition:   Condition,
  pub note:        Option<&'a str>,
}

/// The changes to `tooth` across `history`, which is newest first.
///
/// Snapshots that leave the tooth as it was are skipped. The result is also
/// newest first.
pub fn tooth_history(history: &[Snapshot], tooth: ToothNumber) -> Vec<ToothEvent<'_>> {
  let mut previous = Condition::None;
  let mut events: Vec<ToothEvent<'_>> = history
    .iter()
    .rev()
    .filter_map(|s| {
      let condition = condition_of(&s.state, tooth);
      let changed = condition != previous;
      previous = condition;
      changed.then(|| ToothEvent {
        snapshot_id: s.id,
        at: s.created_at,
        condition,
        note: s.note.as_deref(),
      })
    })
    .collect();
  events.reverse();
  events
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  fn tooth(n: u8) -> ToothNumber { ToothNumber::new(n).unwrap() }

  fn snapshot(minute: u32, pairs: &[(u8, Condition)], note: Option<&str>) -> Snapshot {
    Snapshot {
      id:         Uuid::new_v4(),
      owner_id:   Uuid::nil(),
      subject_id: Uuid::nil(),
      state:      pairs.iter().map(|(t, c)| (tooth(*t), *c)).collect(),
      note:       note.map(str::to_owned),
      created_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, minute, 0).unwrap(),
    }
  }

  #[test]
  fn tooth_history_keeps_only_changes_newest_first() {
    // Newest first, as the store lists them.
    let history = vec![
      snapshot(40, &[(11, Condition::Healthy)], Some("extracted")),
      snapshot(30, &[(11, Condition::Healthy), (16, Condition::Canal)], None),
      snapshot(20, &[(11, Condition::Cavity), (16, Condition::Restored)], None),
      snapshot(10, &[(16, Condition::Cavity)], Some("first visit")),
    ];

    let events = tooth_history(&history, tooth(16));
    let seen: Vec<(Uuid, Condition)> =
      events.iter().map(|e| (e.snapshot_id, e.condition)).collect();
    assert_eq!(seen, vec![
      (history[0].id, Condition::None),
      (history[1].id, Condition::Canal),
      (history[2].id, Condition::Restored),
      (history[3].id, Condition::Cavity),
    ]);
    assert_eq!(events[0].note, Some("extracted"));
    assert_eq!(events[3].at, history[3].created_at);

    let events = tooth_history(&history, tooth(11));
    let seen: Vec<Condition> = events.iter().map(|e| e.condition).collect();
    assert_eq!(seen, vec![Condition::Healthy, Condition::Cavity]);
    assert_eq!(events[1].snapshot_id, history[2].id);
  }

  #[test]
  fn tooth_history_of_an_unrecorded_tooth_is_empty() {
    let history = vec![snapshot(10, &[(16, Condition::Cavity)], None)];
    assert!(tooth_history(&history, tooth(48)).is_empty());
    assert!(tooth_history(&[], tooth(16)).is_empty());
  }
}

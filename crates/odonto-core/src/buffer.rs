//! Uncommitted chart edits.

use crate::{
  chart::{ChartMap, condition_of},
  condition::Condition,
  snapshot::Snapshot,
  store::ChartLog,
  tooth::ToothNumber,
};

/// In-memory edits against a chart, committed as one new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBuffer {
  entries: ChartMap,
  dirty:   bool,
}

impl MutationBuffer {
  /// A clean buffer holding `base`.
  pub fn new(base: ChartMap) -> Self { Self { entries: base, dirty: false } }

  /// Record `condition` for `tooth`. The sentinel clears the tooth.
  pub fn set_condition(&mut self, tooth: ToothNumber, condition: Condition) {
    if condition.is_sentinel() {
      self.entries.remove(&tooth);
    } else {
      self.entries.insert(tooth, condition);
    }
    self.dirty = true;
  }

  pub fn is_dirty(&self) -> bool { self.dirty }

  pub fn entries(&self) -> &ChartMap { &self.entries }

  pub fn condition_of(&self, tooth: ToothNumber) -> Condition {
    condition_of(&self.entries, tooth)
  }

  /// Replace the contents with `base` and clear the dirty flag.
  pub fn reset(&mut self, base: ChartMap) {
    self.entries = base;
    self.dirty = false;
  }

  /// Append the buffered chart to `log`. The dirty flag is cleared only on
  /// success; on failure the buffer is left exactly as it was.
  pub async fn commit<L: ChartLog>(
    &mut self,
    log: &L,
    note: Option<String>,
  ) -> Result<Snapshot, L::Error> {
    let snapshot = log.append(self.entries.clone(), note).await?;
    self.dirty = false;
    Ok(snapshot)
  }
}

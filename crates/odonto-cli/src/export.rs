//! Writing the displayed chart to a JSON file.

use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use odonto_core::{
  chart::ChartMap,
  session::{ChartSession, Mode},
  snapshot::SubjectId,
  store::ChartLog,
};
use serde::Serialize;
use uuid::Uuid;

/// The file body. Conditions and tooth keys use their wire names.
#[derive(Debug, Serialize)]
pub struct ChartExport<'a> {
  pub subject_id:  SubjectId,
  /// The snapshot shown, or `None` for an unsaved edit or an empty history.
  pub snapshot_id: Option<Uuid>,
  pub recorded_at: Option<DateTime<Utc>>,
  pub note:        Option<&'a str>,
  pub unsaved:     bool,
  pub exported_at: DateTime<Utc>,
  pub state:       &'a ChartMap,
}

impl<'a> ChartExport<'a> {
  /// Capture whatever `session` is displaying.
  pub fn of<L: ChartLog>(session: &'a ChartSession<L>, exported_at: DateTime<Utc>) -> Self {
    let snapshot = match session.mode() {
      Mode::ViewingHistorical(id) => session.history().iter().find(|s| s.id == id),
      Mode::Current => session.current(),
      Mode::Editing => None,
    };
    Self {
      subject_id: session.log().subject_id(),
      snapshot_id: snapshot.map(|s| s.id),
      recorded_at: snapshot.map(|s| s.created_at),
      note: snapshot.and_then(|s| s.note.as_deref()),
      unsaved: session.mode() == Mode::Editing,
      exported_at,
      state: session.displayed(),
    }
  }

  /// `odonto-<patient>-<timestamp>.json`
  pub fn file_name(&self) -> String {
    format!(
      "odonto-{}-{}.json",
      self.subject_id,
      self.exported_at.format("%Y%m%dT%H%M%S%3f")
    )
  }

  /// Write into `dir`, returning the path of the new file.
  pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(self.file_name());
    let body = serde_json::to_vec_pretty(self).context("encoding chart export")?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
  }
}

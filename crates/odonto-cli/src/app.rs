//! Application state machine and event dispatcher.

use std::path::PathBuf;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use odonto_core::{
  chart::ToothChange,
  condition::Condition,
  session::{ChartSession, Mode, SessionError},
  snapshot::{ToothEvent, tooth_history},
  store::ChartLog,
  tooth::{ArchRow, LOWER_ARCH, ToothNumber, UPPER_ARCH},
};

use crate::export::ChartExport;

// ─── Focus ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// Arrow keys move the tooth cursor; digits set conditions.
  Chart,
  /// Arrow keys move through history; Enter pins a snapshot.
  History,
}

/// The arches top to bottom, as drawn.
pub const ARCHES: [ArchRow; 2] = [UPPER_ARCH, LOWER_ARCH];

const ROW_LEN: usize = 16;

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<L: ChartLog> {
  pub session: ChartSession<L>,

  pub focus: Focus,

  /// `(arch, column)` of the selected tooth.
  pub cursor: (usize, usize),

  /// Selected row in the history pane.
  pub history_cursor: usize,

  /// Note being typed before a commit. `Some` while the prompt is open.
  pub note_input: Option<String>,

  /// Set after a `q` with unsaved edits; a second `q` quits.
  pub quit_armed: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Where `e` writes chart exports.
  pub export_dir: PathBuf,
}

impl<L: ChartLog> App<L> {
  pub fn new(session: ChartSession<L>) -> Self {
    Self {
      session,
      focus: Focus::Chart,
      cursor: (0, 0),
      history_cursor: 0,
      note_input: None,
      quit_armed: false,
      status_msg: String::new(),
      export_dir: PathBuf::from("."),
    }
  }

  pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
    self.export_dir = dir;
    self
  }

  pub fn selected_tooth(&self) -> ToothNumber {
    let (arch, col) = self.cursor;
    let row = &ARCHES[arch];
    if col < 8 { row.left[col] } else { row.right[col - 8] }
  }

  /// Changes from the pinned snapshot to the current chart, if one is pinned.
  pub fn pinned_changes(&self) -> Option<Vec<ToothChange>> {
    match self.session.mode() {
      Mode::ViewingHistorical(id) => self.session.diff_against_current(id).ok(),
      Mode::Current | Mode::Editing => None,
    }
  }

  /// Changes to the selected tooth across the whole history, newest first.
  pub fn selected_history(&self) -> Vec<ToothEvent<'_>> {
    tooth_history(self.session.history(), self.selected_tooth())
  }

  fn export(&mut self) {
    let export = ChartExport::of(&self.session, Utc::now());
    match export.write_to(&self.export_dir) {
      Ok(path) => {
        tracing::info!(path = %path.display(), "exported chart");
        self.status_msg = format!("Exported to {}.", path.display());
      }
      Err(e) => {
        tracing::warn!("{e:#}");
        self.status_msg = format!("Error: {e:#}");
      }
    }
  }

  fn report<T>(&mut self, result: Result<T, SessionError<L::Error>>) -> Option<T> {
    match result {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{e}");
        self.status_msg = format!("Error: {e}");
        None
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.note_input.is_some() {
      self.handle_note_key(key).await;
      return true;
    }

    if key.code == KeyCode::Char('q') {
      if self.session.is_dirty() && !self.quit_armed {
        self.quit_armed = true;
        self.status_msg = "Unsaved edits. Press q again to quit without saving.".into();
        return true;
      }
      return false;
    }
    self.quit_armed = false;
    self.status_msg.clear();

    match key.code {
      KeyCode::Tab => {
        self.focus = match self.focus {
          Focus::Chart => Focus::History,
          Focus::History => Focus::Chart,
        };
      }
      KeyCode::Esc => {
        let result = self.session.return_to_current().await;
        if self.report(result).is_some() {
          self.history_cursor = 0;
        }
      }
      KeyCode::Char('r') => {
        let result = self.session.reload().await;
        if self.report(result).is_some() {
          self.history_cursor = 0;
          self.status_msg = "Reloaded.".into();
        }
      }
      KeyCode::Char('x') => {
        if self.session.is_dirty() {
          self.session.discard();
          self.status_msg = "Edits discarded.".into();
        }
      }
      KeyCode::Char('c') => match self.session.mode() {
        Mode::ViewingHistorical(_) => {
          self.status_msg = "Historical snapshots are read-only. Esc returns to current.".into();
        }
        Mode::Current | Mode::Editing => self.note_input = Some(String::new()),
      },
      KeyCode::Char('e') => self.export(),
      _ => match self.focus {
        Focus::Chart => self.handle_chart_key(key),
        Focus::History => self.handle_history_key(key),
      },
    }
    true
  }

  async fn handle_note_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.note_input = None;
      }
      KeyCode::Enter => {
        let note = self
          .note_input
          .take()
          .map(|n| n.trim().to_string())
          .filter(|n| !n.is_empty());
        let result = self.session.commit(note).await.map(|s| s.created_at);
        if let Some(at) = self.report(result) {
          self.history_cursor = 0;
          self.status_msg = format!("Committed at {}.", at.format("%Y-%m-%d %H:%M:%S"));
        }
      }
      KeyCode::Backspace => {
        if let Some(n) = self.note_input.as_mut() {
          n.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(n) = self.note_input.as_mut() {
          n.push(c);
        }
      }
      _ => {}
    }
  }

  fn handle_chart_key(&mut self, key: KeyEvent) {
    let (arch, col) = self.cursor;
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.cursor.1 = col.saturating_sub(1),
      KeyCode::Right | KeyCode::Char('l') => self.cursor.1 = (col + 1).min(ROW_LEN - 1),
      KeyCode::Up | KeyCode::Char('k') => self.cursor.0 = arch.saturating_sub(1),
      KeyCode::Down | KeyCode::Char('j') => self.cursor.0 = (arch + 1).min(ARCHES.len() - 1),
      KeyCode::Char(d @ '0'..='6') => {
        let condition = condition_for_digit(d);
        let tooth = self.selected_tooth();
        let result = self.session.set_condition(tooth, condition);
        self.report(result);
      }
      _ => {}
    }
  }

  fn handle_history_key(&mut self, key: KeyEvent) {
    let len = self.session.history().len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.history_cursor + 1 < len {
          self.history_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.history_cursor = self.history_cursor.saturating_sub(1);
      }
      KeyCode::Enter => {
        if let Some(id) = self.session.history().get(self.history_cursor).map(|s| s.id) {
          let result = self.session.pin(id);
          self.report(result);
        }
      }
      _ => {}
    }
  }
}

/// `0` clears a tooth; `1`..`6` follow the legend order.
pub fn condition_for_digit(d: char) -> Condition {
  d.to_digit(10)
    .and_then(|n| n.checked_sub(1))
    .and_then(|i| Condition::ALL_RECORDED.get(i as usize).copied())
    .unwrap_or(Condition::None)
}

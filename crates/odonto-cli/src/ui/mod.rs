//! TUI rendering — orchestrates all panes.

pub mod chart;
pub mod history;

use chrono::Local;
use odonto_core::{session::Mode, store::ChartLog};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Focus};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<L: ChartLog>(f: &mut Frame, app: &App<L>) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<L: ChartLog>(f: &mut Frame, area: Rect, app: &App<L>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    format!(" odonto  patient {}", app.session.log().subject_id()),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::Gray),
  );

  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<L: ChartLog>(f: &mut Frame, area: Rect, app: &App<L>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
    .split(area);

  chart::draw(f, cols[0], app);
  history::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<L: ChartLog>(f: &mut Frame, area: Rect, app: &App<L>) {
  if let Some(note) = &app.note_input {
    let line = Line::from(vec![
      Span::styled(
        " NOTE ",
        Style::default()
          .fg(Color::Black)
          .bg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ),
      Span::raw(format!("  {note}_")),
      Span::styled(
        "   Enter commit  Esc cancel",
        Style::default().fg(Color::DarkGray),
      ),
    ]);
    f.render_widget(
      Paragraph::new(line).style(Style::default().bg(Color::Black)),
      area,
    );
    return;
  }

  let (mode_label, mode_color) = match app.session.mode() {
    Mode::Current => ("CURRENT", Color::Cyan),
    Mode::Editing => ("EDITING", Color::Yellow),
    Mode::ViewingHistorical(_) => ("HISTORY", Color::Magenta),
  };

  let hints = match (app.session.mode(), app.focus) {
    (Mode::ViewingHistorical(_), _) => "read-only  Esc back to current  e export  Tab focus  q quit",
    (_, Focus::History) => "↑↓/jk select  Enter view  Tab chart  r reload  q quit",
    (Mode::Editing, Focus::Chart) => "0-6 set  c commit  x discard  e export  Tab history  q quit",
    (Mode::Current, Focus::Chart) => "←→↑↓/hjkl move  0-6 set  c commit  e export  Tab history  r reload  q quit",
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(mode_color)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

//! History pane: snapshots newest first, plus changes for a pinned one.

use chrono::Local;
use odonto_core::{chart::ToothChange, session::Mode, store::ChartLog};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
  app::{App, Focus},
  ui::chart::condition_color,
};

/// Render the history pane into `area`.
pub fn draw<L: ChartLog>(f: &mut Frame, area: Rect, app: &App<L>) {
  let changes = app.pinned_changes();
  let (list_area, diff_area) = match &changes {
    Some(_) => {
      let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
      (rows[0], Some(rows[1]))
    }
    None => (area, None),
  };

  let history = app.session.history();
  let border = if app.focus == Focus::History { Color::White } else { Color::DarkGray };
  let block = Block::default()
    .title(format!(" History ({}) ", history.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  if history.is_empty() {
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);
    f.render_widget(
      Paragraph::new("No snapshots yet. Edit a tooth and press c.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let pinned = match app.session.mode() {
    Mode::ViewingHistorical(id) => Some(id),
    Mode::Current | Mode::Editing => None,
  };

  let items: Vec<ListItem> = history
    .iter()
    .enumerate()
    .map(|(i, s)| {
      let marker = if pinned == Some(s.id) {
        "▶ "
      } else if i == 0 {
        "● "
      } else {
        "  "
      };
      let when = s.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
      let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(format!("{when}"), Style::default().fg(Color::Cyan)),
      ];
      if let Some(note) = &s.note {
        spans.push(Span::raw(format!("  {note}")));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  if app.focus == Focus::History {
    state.select(Some(app.history_cursor));
  }

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    list_area,
    &mut state,
  );

  if let (Some(changes), Some(diff_area)) = (changes, diff_area) {
    draw_changes(f, diff_area, &changes);
  }
}

fn draw_changes(f: &mut Frame, area: Rect, changes: &[ToothChange]) {
  let block = Block::default()
    .title(" Changes up to current ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let lines: Vec<Line> = if changes.is_empty() {
    vec![Line::from(Span::styled(
      "Same as current.",
      Style::default().fg(Color::DarkGray),
    ))]
  } else {
    changes
      .iter()
      .map(|c| {
        Line::from(vec![
          Span::raw(format!("{}  ", c.tooth)),
          Span::styled(c.before.label(), Style::default().fg(condition_color(c.before))),
          Span::raw(" → "),
          Span::styled(c.after.label(), Style::default().fg(condition_color(c.after))),
        ])
      })
      .collect()
  };

  f.render_widget(Paragraph::new(lines).block(block), area);
}

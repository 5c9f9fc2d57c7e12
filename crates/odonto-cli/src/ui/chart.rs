//! Chart pane: both arches, coloured by condition, with a legend.

use chrono::Local;
use odonto_core::{
  chart::tally,
  condition::Condition,
  session::Mode,
  store::ChartLog,
  tooth::ArchRow,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{ARCHES, App, Focus};

/// Changes listed under the selected tooth before eliding older ones.
const HISTORY_LINES: usize = 4;

/// Display colour of a condition.
pub fn condition_color(c: Condition) -> Color {
  match c {
    Condition::Healthy => Color::Green,
    Condition::Restored => Color::Blue,
    Condition::Cavity => Color::Red,
    Condition::Canal => Color::Magenta,
    Condition::Missing => Color::DarkGray,
    Condition::Implant => Color::Cyan,
    Condition::None => Color::Gray,
  }
}

/// Two-character cell marker.
fn symbol(c: Condition) -> &'static str {
  match c {
    Condition::Healthy => "OK",
    Condition::Restored => "RS",
    Condition::Cavity => "CV",
    Condition::Canal => "RC",
    Condition::Missing => "--",
    Condition::Implant => "IM",
    Condition::None => "··",
  }
}

/// Render the chart pane into `area`.
pub fn draw<L: ChartLog>(f: &mut Frame, area: Rect, app: &App<L>) {
  let title = match app.session.mode() {
    Mode::ViewingHistorical(id) => {
      let when = app
        .session
        .history()
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
      format!(" Chart @ {when} (read-only) ")
    }
    Mode::Editing => " Chart * ".to_string(),
    Mode::Current => " Chart ".to_string(),
  };

  let border = if app.focus == Focus::Chart { Color::White } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = vec![Line::from("")];
  for (i, row) in ARCHES.iter().enumerate() {
    let cursor = (app.cursor.0 == i).then_some(app.cursor.1);
    lines.push(number_line(row, cursor));
    lines.push(condition_line(row, cursor, app));
    lines.push(Line::from(""));
  }

  let selected = app.selected_tooth();
  let condition = app.session.condition_of(selected);
  lines.push(Line::from(vec![
    Span::styled(format!(" Tooth {selected}: "), Style::default().add_modifier(Modifier::BOLD)),
    Span::styled(condition.label(), Style::default().fg(condition_color(condition))),
  ]));
  let events = app.selected_history();
  for event in events.iter().take(HISTORY_LINES) {
    let when = event.at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let mut spans = vec![
      Span::styled(format!("   {when}  "), Style::default().fg(Color::Cyan)),
      Span::styled(
        if event.condition.is_sentinel() { "cleared" } else { event.condition.label() },
        Style::default().fg(condition_color(event.condition)),
      ),
    ];
    if let Some(note) = event.note {
      spans.push(Span::styled(format!("  {note}"), Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::from(spans));
  }
  if events.len() > HISTORY_LINES {
    lines.push(Line::from(Span::styled(
      format!("   … {} earlier", events.len() - HISTORY_LINES),
      Style::default().fg(Color::DarkGray),
    )));
  }
  lines.push(Line::from(""));

  // Legend with the digit that sets each condition and its current count.
  let counts = tally(app.session.displayed());
  let mut legend = vec![Span::styled(" 0 ", Style::default().fg(Color::DarkGray))];
  legend.push(Span::styled(
    format!("{}  ", Condition::None.label()),
    Style::default().fg(condition_color(Condition::None)),
  ));
  for (i, (c, n)) in counts.iter().enumerate() {
    legend.push(Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)));
    legend.push(Span::styled(
      format!("{} ({n})  ", c.label()),
      Style::default().fg(condition_color(*c)),
    ));
  }
  lines.push(Line::from(legend));

  f.render_widget(Paragraph::new(lines), inner);
}

fn cell_style(selected: bool) -> Style {
  if selected {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
  } else {
    Style::default()
  }
}

fn number_line(row: &ArchRow, cursor: Option<usize>) -> Line<'static> {
  let mut spans = vec![Span::raw(" ")];
  for (col, tooth) in row.teeth().enumerate() {
    if col == 8 {
      spans.push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(
      format!("{tooth}"),
      cell_style(cursor == Some(col)).fg(Color::White),
    ));
    spans.push(Span::raw(" "));
  }
  Line::from(spans)
}

fn condition_line<L: ChartLog>(row: &ArchRow, cursor: Option<usize>, app: &App<L>) -> Line<'static> {
  let mut spans = vec![Span::raw(" ")];
  for (col, tooth) in row.teeth().enumerate() {
    if col == 8 {
      spans.push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
    }
    let c = app.session.condition_of(tooth);
    spans.push(Span::styled(
      symbol(c),
      cell_style(cursor == Some(col)).fg(condition_color(c)),
    ));
    spans.push(Span::raw(" "));
  }
  Line::from(spans)
}

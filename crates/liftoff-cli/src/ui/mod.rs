//! TUI rendering. Lays out and draws all panes.

pub mod mission_detail;
pub mod mission_list;

use chrono::Local;
use liftoff_client::{LaunchSource, LoadStatus};
use liftoff_core::stats::format_digits;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: LaunchSource>(f: &mut Frame, app: &App<S>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // stats
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0]);
  draw_stats(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " liftoff  [/] search  [Tab] group  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// Counters rendered as one box per digit.
fn draw_stats<S: LaunchSource>(f: &mut Frame, area: Rect, app: &App<S>) {
  let loaded = app.browser.status() == LoadStatus::Success;
  let stats = app.browser.stats();

  let mut spans = Vec::new();
  for (label, count) in [
    ("completed", stats.completed),
    ("total", stats.total),
    ("reflights", stats.reflights),
  ] {
    spans.push(Span::styled(
      format!(" {label} "),
      Style::default().fg(Color::DarkGray),
    ));
    for digit in format_digits(loaded.then_some(count)) {
      spans.push(Span::styled(
        format!("{digit}"),
        Style::default()
          .fg(Color::Black)
          .bg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ));
      spans.push(Span::raw(" "));
    }
  }

  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<S: LaunchSource>(f: &mut Frame, area: Rect, app: &App<S>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  mission_list::draw(f, cols[0], app);

  if app.browser.selected_id().is_some() {
    mission_detail::draw(f, cols[1], app);
  } else {
    draw_empty_detail(f, cols[1]);
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Mission ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select a mission and press Enter.").style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: LaunchSource>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match app.screen {
    Screen::MissionList if app.search_active => ("SEARCH", "Type to filter  Esc cancel  Enter apply"),
    Screen::MissionList => ("NORMAL", "↑↓/jk navigate  Tab group  / search  Enter detail  q quit"),
    Screen::MissionDetail => ("DETAIL", "↑↓/jk scroll  [ prev  ] next  Esc back  q quit"),
  };

  // A notice outranks everything else for its short lifetime.
  let (message, style) = if let Some(notice) = app.browser.notice() {
    (notice.message.clone(), Style::default().fg(Color::Yellow))
  } else if app.browser.status() == LoadStatus::Error {
    let label = app.retry_label();
    let message = if app.browser.retry_gate().has_reached_limit() {
      label
    } else {
      format!("[r] {label}")
    };
    (message, Style::default().fg(Color::Red))
  } else {
    (hints.to_string(), Style::default().fg(Color::DarkGray))
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let line = Line::from(vec![mode_span, Span::styled(format!("  {message}"), style)]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

//! Mission list pane (left panel).

use liftoff_client::{LaunchSource, LoadStatus};
use liftoff_core::mission::display_name;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Group};

/// Render the mission list into `area`.
pub fn draw<S: LaunchSource>(f: &mut Frame, area: Rect, app: &App<S>) {
  let groups = app.browser.groups();
  let group_len = match app.group {
    Group::Upcoming => groups.upcoming.len(),
    Group::Past => groups.past.len(),
  };
  let visible = app.visible_missions();

  let title = if app.query.is_empty() {
    format!(" {} ({group_len}) ", app.group.label())
  } else {
    format!(" {} ({}/{group_len}) ", app.group.label(), visible.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  match app.browser.status() {
    LoadStatus::Loading if app.browser.launches().is_empty() => {
      f.render_widget(
        Paragraph::new("Loading launches…").style(Style::default().fg(Color::DarkGray)),
        inner,
      );
      return;
    }
    LoadStatus::Error if app.browser.launches().is_empty() => {
      f.render_widget(
        Paragraph::new(vec![
          Line::from(Span::styled(
            "Could not load launches.",
            Style::default().fg(Color::Red),
          )),
          Line::from(Span::styled(
            app.retry_label(),
            Style::default().fg(Color::DarkGray),
          )),
        ]),
        inner,
      );
      return;
    }
    _ => {}
  }

  // Search bar along the bottom edge while searching or filtered.
  if (app.search_active || !app.search.is_empty()) && inner.height > 2 {
    let search_area = Rect {
      x:      inner.x,
      y:      inner.y + inner.height - 1,
      width:  inner.width,
      height: 1,
    };
    inner.height -= 1;

    let text = if app.search_active {
      format!("/{}_", app.search)
    } else {
      format!("/{}", app.search)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  if visible.is_empty() {
    let hint = if app.query.is_empty() {
      "No missions."
    } else {
      "No missions match."
    };
    f.render_widget(
      Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let selected = app.browser.selected_id();
  let items: Vec<ListItem> = visible
    .iter()
    .map(|mission| {
      let marker = if selected == Some(mission.id.as_str()) { "▶ " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(display_name(&mission.mission_name)),
        Span::styled(
          format!("  {}", mission.launch_date),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

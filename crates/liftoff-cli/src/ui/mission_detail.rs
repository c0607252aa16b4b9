//! Mission detail pane (right panel).

use liftoff_client::{LaunchSource, SecondaryMetadata};
use liftoff_core::{launch::MissionDetails, mission::display_name, video::youtube_embed_url};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

const BAR_WIDTH: usize = 20;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw<S: LaunchSource>(f: &mut Frame, area: Rect, app: &App<S>) {
  let Some(details) = app.browser.selected_details() else {
    return;
  };
  let block = Block::default()
    .title(format!(" {} ", display_name(&details.mission_name)))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let para = Paragraph::new(detail_lines(&details, app.browser.metadata()))
    .wrap(Wrap { trim: false })
    .scroll((app.detail_scroll, 0));
  f.render_widget(para, inner);
}

fn detail_lines(details: &MissionDetails, meta: &SecondaryMetadata) -> Vec<Line<'static>> {
  let mut lines = vec![
    field("date", details.launch_date.clone()),
    field(
      "status",
      if details.upcoming { "upcoming" } else { "past" }.to_string(),
    ),
    field("payloads", details.payloads.len().to_string()),
  ];

  if let Some(embed) = youtube_embed_url(details.video.as_deref()) {
    lines.push(field("video", embed));
  }
  if let Some(article) = &details.article {
    lines.push(field("article", article.clone()));
  }

  // Rocket
  lines.push(Line::from(""));
  lines.push(heading("Rocket"));
  match &meta.rocket {
    Some(rocket) => {
      lines.push(field("name", rocket.name.clone()));
      if let Some(stages) = rocket.stages {
        lines.push(field("stages", stages.to_string()));
      }
      if let Some(first) = &rocket.first_flight {
        lines.push(field("first flight", first.clone()));
      }
      if let Some(pct) = rocket.success_rate_pct {
        lines.push(field("success rate", format!("{pct:.0}%")));
      }
      if let Some(description) = &rocket.description {
        lines.push(note(description));
      }
    }
    None => lines.push(placeholder(meta.is_loading)),
  }

  // Launchpad
  lines.push(Line::from(""));
  lines.push(heading("Launchpad"));
  match &meta.launchpad {
    Some(pad) => {
      lines.push(field("name", pad.full_name.clone().unwrap_or_else(|| pad.name.clone())));
      if let Some(site) = pad.site() {
        lines.push(field("site", site));
      }
      lines.push(progress("launches", pad.success_progress()));
      if let Some(details) = &pad.details {
        lines.push(note(details));
      }
    }
    None => lines.push(placeholder(meta.is_loading)),
  }

  // Landpad. Missions that never landed have no section at all.
  if details.landpad.is_none() {
    return lines;
  }
  lines.push(Line::from(""));
  lines.push(heading("Landpad"));
  match &meta.landpad {
    Some(pad) => {
      lines.push(field("name", pad.full_name.clone().unwrap_or_else(|| pad.name.clone())));
      if let Some(site) = pad.site() {
        lines.push(field("site", site));
      }
      lines.push(progress("landings", pad.success_progress()));
      if let Some(details) = &pad.details {
        lines.push(note(details));
      }
    }
    None => lines.push(placeholder(meta.is_loading)),
  }
  lines
}

// ─── Line helpers ─────────────────────────────────────────────────────────────

fn heading(title: &str) -> Line<'static> {
  Line::from(Span::styled(
    title.to_string(),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
  ))
}

fn field(label: &str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<14}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn note(text: &str) -> Line<'static> {
  Line::from(Span::styled(
    text.to_string(),
    Style::default().fg(Color::Gray),
  ))
}

fn placeholder(loading: bool) -> Line<'static> {
  let text = if loading { "Loading…" } else { "Unavailable" };
  Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

/// `label  ██████░░░░  60%`, or `n/a` when the ratio is unknown.
fn progress(label: &str, pct: Option<u32>) -> Line<'static> {
  let Some(pct) = pct else {
    return field(label, "n/a".to_string());
  };
  let filled = (pct.min(100) as usize * BAR_WIDTH).div_ceil(100);
  let bar = format!(
    "{}{}",
    "█".repeat(filled),
    "░".repeat(BAR_WIDTH - filled)
  );
  Line::from(vec![
    Span::styled(
      format!("{label:<14}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(bar, Style::default().fg(Color::Green)),
    Span::raw(format!(" {pct}%")),
  ])
}

//! Application state machine and event dispatcher.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use liftoff_client::{Browser, LaunchSource, LoadStatus, Resolution};
use liftoff_core::launch::LaunchRecord;
use liftoff_core::mission::{NormalizedMission, filter_by_name};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use crate::debounce::Debouncer;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the mission list.
  MissionList,
  /// Focus on the detail pane of the selected mission.
  MissionDetail,
}

/// Which browse group the list pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
  Upcoming,
  Past,
}

impl Group {
  pub fn toggle(self) -> Self {
    match self {
      Group::Upcoming => Group::Past,
      Group::Past => Group::Upcoming,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Group::Upcoming => "Upcoming",
      Group::Past => "Past",
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  pub group: Group,

  pub browser: Browser<S>,

  /// Text in the search box.
  pub search: String,

  /// Whether the user is typing a search query.
  pub search_active: bool,

  /// Query the list is actually filtered by. Trails `search` by the debounce
  /// delay.
  pub query: String,

  /// Cursor position within the *filtered* mission list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: u16,

  debouncer: Debouncer<String>,

  resolutions:   UnboundedReceiver<Resolution>,
  resolution_tx: UnboundedSender<Resolution>,

  loads:   UnboundedReceiver<liftoff_client::Result<Vec<LaunchRecord>>>,
  load_tx: UnboundedSender<liftoff_client::Result<Vec<LaunchRecord>>>,
}

impl<S: LaunchSource> App<S> {
  pub fn new(browser: Browser<S>, search_debounce: Duration) -> Self {
    let (resolution_tx, resolutions) = unbounded_channel();
    let (load_tx, loads) = unbounded_channel();
    Self {
      screen: Screen::MissionList,
      group: Group::Past,
      browser,
      search: String::new(),
      search_active: false,
      query: String::new(),
      list_cursor: 0,
      detail_scroll: 0,
      debouncer: Debouncer::new(search_debounce),
      resolutions,
      resolution_tx,
      loads,
      load_tx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Initial fetch. A failure is not fatal: the UI shows the error and offers
  /// a retry.
  pub async fn load(&mut self) {
    if let Err(e) = self.browser.load().await {
      warn!(error = %e, "initial load failed");
    }
    self.clamp_cursor();
  }

  /// Start a retry in the background so the `Loading` state gets drawn. The
  /// result is applied in [`App::tick`].
  fn retry(&mut self) {
    match self.browser.begin_retry() {
      Ok(pending) => {
        let tx = self.load_tx.clone();
        tokio::spawn(async move {
          let _ = tx.send(pending.fetch().await);
        });
      }
      Err(e) => warn!(error = %e, "retry refused"),
    }
  }

  /// Label for the retry control, shown while the list is in error.
  pub fn retry_label(&self) -> String {
    match self.browser.retry_gate().remaining_retries() {
      0 => "No retries left".to_string(),
      n => format!("Retry loading data ({n} left)"),
    }
  }

  /// Per-frame housekeeping: apply finished loads and metadata fetches,
  /// commit a settled search query and drop an expired notice.
  pub fn tick(&mut self, now: Instant) {
    while let Ok(result) = self.loads.try_recv() {
      if let Err(e) = self.browser.finish_load(result) {
        warn!(error = %e, "retry did not load launches");
      }
      self.clamp_cursor();
    }
    while let Ok(resolution) = self.resolutions.try_recv() {
      if !self.browser.settle(resolution) {
        debug!("dropped metadata for a superseded selection");
      }
    }
    if let Some(query) = self.debouncer.poll(now) {
      self.apply_query(query);
    }
    self.browser.expire_notice(now);
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Missions of the current group matching the committed query.
  pub fn visible_missions(&self) -> Vec<&NormalizedMission> {
    let groups = self.browser.groups();
    let missions = match self.group {
      Group::Upcoming => &groups.upcoming,
      Group::Past => &groups.past,
    };
    filter_by_name(missions, &self.query)
  }

  /// The mission under the list cursor, if any.
  pub fn cursor_mission(&self) -> Option<&NormalizedMission> {
    self.visible_missions().get(self.list_cursor).copied()
  }

  fn apply_query(&mut self, query: String) {
    self.query = query;
    self.list_cursor = 0;
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible_missions().len();
    if self.list_cursor >= len {
      self.list_cursor = len.saturating_sub(1);
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.search_active {
      self.handle_search_key(key, now);
      return true;
    }

    match self.screen {
      Screen::MissionList => self.handle_list_key(key).await,
      Screen::MissionDetail => self.handle_detail_key(key),
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search.clear();
        self.debouncer.cancel();
        self.apply_query(String::new());
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.debouncer.cancel();
        self.apply_query(self.search.clone());
      }
      KeyCode::Backspace => {
        self.search.pop();
        self.debouncer.push(self.search.clone(), now);
      }
      KeyCode::Char(c) => {
        self.search.push(c);
        self.debouncer.push(self.search.clone(), now);
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.visible_missions().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Tab => {
        self.group = self.group.toggle();
        self.list_cursor = 0;
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_mission().map(|m| m.id.clone()) {
          self.open_detail(&id);
        }
      }

      KeyCode::Char('/') => {
        self.search_active = true;
      }
      KeyCode::Esc if !self.query.is_empty() => {
        self.search.clear();
        self.apply_query(String::new());
      }

      KeyCode::Char('r') if self.browser.status() == LoadStatus::Error => {
        self.retry();
      }

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.browser.clear_selection();
        self.screen = Screen::MissionList;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      // Step through the list without leaving the detail pane.
      KeyCode::Char(']') | KeyCode::PageDown => {
        if self.list_cursor + 1 < self.visible_missions().len() {
          self.list_cursor += 1;
          if let Some(id) = self.cursor_mission().map(|m| m.id.clone()) {
            self.open_detail(&id);
          }
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
          if let Some(id) = self.cursor_mission().map(|m| m.id.clone()) {
            self.open_detail(&id);
          }
        }
      }

      _ => {}
    }
    true
  }

  /// Select `id` and fetch its metadata in the background. The result comes
  /// back through the resolution channel and is applied in [`App::tick`].
  fn open_detail(&mut self, id: &str) {
    match self.browser.select_mission(id) {
      Ok(pending) => {
        let tx = self.resolution_tx.clone();
        tokio::spawn(async move {
          // The receiver lives as long as the app.
          let _ = tx.send(pending.resolve().await);
        });
        self.screen = Screen::MissionDetail;
        self.detail_scroll = 0;
      }
      Err(e) => warn!(%id, error = %e, "could not select mission"),
    }
  }
}

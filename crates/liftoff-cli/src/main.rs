//! `liftoff`: terminal browser for SpaceX launches.
//!
//! # Usage
//!
//! ```
//! liftoff
//! liftoff --config ~/.config/liftoff/config.toml --log-file /tmp/liftoff.log
//! LIFTOFF_LAUNCHES_URL=http://localhost:8080/v5/launches liftoff
//! ```

mod app;
mod debounce;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::PathBuf,
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use liftoff_client::{
  Browser, FileSession, HttpSource, LaunchSource, MemorySession, RetryGate, SessionStorage,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Overrides, Settings};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "liftoff", version, about = "Terminal browser for SpaceX launches")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Launch list endpoint.
  #[arg(long, env = "LIFTOFF_LAUNCHES_URL")]
  launches_url: Option<String>,

  /// Base URL for rocket, launchpad and landpad lookups.
  #[arg(long, env = "LIFTOFF_METADATA_URL")]
  metadata_url: Option<String>,

  /// Retries of the initial load allowed per session.
  #[arg(long)]
  max_retries: Option<u32>,

  /// Quiet period before a search query is applied, in milliseconds.
  #[arg(long)]
  search_debounce_ms: Option<u32>,

  /// File holding session state such as the retry counter.
  #[arg(long, value_name = "FILE")]
  session_file: Option<PathBuf>,

  /// Write logs here. Logs are discarded otherwise.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

impl Args {
  fn overrides(&self) -> Overrides {
    Overrides {
      launches_url:       self.launches_url.clone(),
      metadata_url:       self.metadata_url.clone(),
      max_retries:        self.max_retries,
      search_debounce_ms: self.search_debounce_ms,
      session_file:       self.session_file.clone(),
      log_file:           self.log_file.clone(),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(args.config.as_deref(), args.overrides())?;

  init_tracing(&settings)?;

  let source = Arc::new(HttpSource::new(settings.source_config()).context("building HTTP client")?);
  let gate = RetryGate::with_ceiling(open_session(&settings)?, settings.max_retries);
  let mut app = App::new(Browser::new(source, gate), settings.search_debounce());

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Logs go to `log_file` when set; otherwise no subscriber is installed.
fn init_tracing(settings: &Settings) -> Result<()> {
  let Some(path) = &settings.log_file else {
    return Ok(());
  };
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

/// The retry counter must outlive the process but not the login session, so
/// it defaults to a file under `$XDG_RUNTIME_DIR`.
fn open_session(settings: &Settings) -> Result<Arc<dyn SessionStorage>> {
  let path = settings.session_file.clone().or_else(|| {
    std::env::var_os("XDG_RUNTIME_DIR")
      .map(|dir| PathBuf::from(dir).join("liftoff").join("session.json"))
  });

  match path {
    Some(path) => {
      let session = FileSession::open(&path)
        .with_context(|| format!("opening session file {}", path.display()))?;
      info!(path = %path.display(), "using file-backed session");
      Ok(Arc::new(session))
    }
    None => {
      info!("no runtime dir; retry budget lasts for this process only");
      Ok(Arc::new(MemorySession::new()))
    }
  }
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run<S: LaunchSource>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S>,
) -> Result<()> {
  // Paint the loading state before blocking on the first fetch.
  terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;
  app.load().await;

  loop {
    app.tick(Instant::now());
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key, Instant::now()).await {
        break;
      }
    }
  }

  Ok(())
}

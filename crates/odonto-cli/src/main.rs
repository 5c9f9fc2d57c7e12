//! `odonto` — terminal chart editor for one patient.
//!
//! # Usage
//!
//! ```text
//! odonto --url http://localhost:8080 --user clinic --password secret --patient <uuid>
//! odonto --config ~/.config/odonto/config.toml --patient <uuid> --export-dir ~/exports
//! ```

mod app;
mod client;
mod export;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result, anyhow};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig, RemoteChart};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use odonto_core::session::ChartSession;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "odonto", about = "Terminal dental chart editor")]
struct Args {
  /// Path to a TOML config file (url, username, password, patient).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the odonto server (default: http://localhost:8080).
  #[arg(long, env = "ODONTO_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "ODONTO_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "ODONTO_PASSWORD")]
  password: Option<String>,

  /// Patient whose chart to open.
  #[arg(long, env = "ODONTO_PATIENT")]
  patient: Option<Uuid>,

  /// Directory that `e` writes chart exports into.
  #[arg(long, value_name = "DIR", default_value = ".")]
  export_dir: PathBuf,

  /// Append logs to this file. Nothing is logged without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
  #[serde(default)]
  patient:  Option<Uuid>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    let file = File::options()
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
      .with_ansi(false)
      .with_writer(Mutex::new(file))
      .init();
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };
  let patient = args
    .patient
    .or(file_cfg.patient)
    .ok_or_else(|| anyhow!("no patient given; pass --patient <uuid>"))?;

  tracing::info!(url = %api_config.base_url, %patient, "opening chart");
  let client = ApiClient::new(api_config).context("building HTTP client")?;
  let session = ChartSession::open(RemoteChart::new(client, patient))
    .await
    .context("loading chart history")?;
  let mut app = App::new(session).with_export_dir(args.export_dir);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<RemoteChart>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}

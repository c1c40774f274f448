mod api;
mod app;
mod artifact;
mod cli;
mod config;
mod constants;
mod display;
mod error;
mod format;
mod frames;
mod graphics;
mod input;
mod theme;
mod tool;
mod tools;
mod ui;
mod workflow;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use api::{HttpBackend, ServerBase};
use app::App;
use cli::Command;
use config::Config;
use constants::constants;
use display::CliDisplayMode;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(name = "mediadesk", author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Image rendering: 'auto', 'direct' (half-block) or 'ascii' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Media server base URL (overrides the saved preference for this run)
  #[arg(long, global = true)]
  server: Option<String>,

  /// Where downloaded files are saved (overrides the saved preference for this run)
  #[arg(long, global = true)]
  download_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

// --- Logging ---

/// Log to a daily file; the terminal belongs to the UI.
fn init_logging() -> Result<WorkerGuard> {
  let dir = config::log_dir();
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;
  let appender = tracing_appender::rolling::daily(&dir, &constants().log_file_prefix);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_env("MEDIADESK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  Ok(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(Command::Completions { shell }) = &args.command {
    cli::print_completions(*shell, &mut Args::command());
    return Ok(());
  }

  let _guard = init_logging()?;

  let config = Config::load();
  let server = args.server.clone().unwrap_or_else(|| config.server_url());
  let base = ServerBase::parse(&server).with_context(|| format!("Invalid server URL '{}'", server))?;
  let download_dir = args.download_dir.clone().unwrap_or_else(|| config.download_dir());
  let backend = Arc::new(HttpBackend::new(base));

  if let Some(command) = args.command {
    info!(?command, "cli: running");
    return cli::run(command, backend.as_ref(), &download_dir).await;
  }

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let display_mode = display::resolve_display_mode(args.display_mode);
  let app = App::new(config, backend, download_dir, display_mode);

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, app).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  let tick = Duration::from_millis(constants().tick_ms);

  loop {
    app.check_pending();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(tick)? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key_event(&mut app, key),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  if app.has_pending() {
    info!("app: quitting with requests still in flight");
  }
  Ok(())
}

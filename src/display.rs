//! How thumbnails and frame previews are drawn into terminal cells.

use clap::ValueEnum;
use tracing::debug;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Direct,
  Ascii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  /// Luminance ramp, one image pixel per cell.
  Ascii,
  /// `▀` with fg/bg colours, two image pixels per cell.
  Direct,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ASCII",
      DisplayMode::Direct => "Half-block",
    }
  }

  /// Image rows packed into one terminal row.
  pub fn pixel_rows_per_cell(self) -> u32 {
    match self {
      DisplayMode::Ascii => 1,
      DisplayMode::Direct => 2,
    }
  }
}

/// The environment variables that decide colour support.
#[derive(Debug, Default)]
pub struct TermEnv {
  pub colorterm: Option<String>,
  pub term: Option<String>,
  pub no_color: Option<String>,
}

impl TermEnv {
  fn current() -> Self {
    Self {
      colorterm: std::env::var("COLORTERM").ok(),
      term: std::env::var("TERM").ok(),
      no_color: std::env::var("NO_COLOR").ok(),
    }
  }
}

/// Half-block needs 24-bit colour. A non-empty `NO_COLOR` or a dumb terminal
/// always gets ASCII, even when `COLORTERM` claims truecolor.
pub fn detect_from(env: &TermEnv) -> DisplayMode {
  if env.no_color.as_deref().is_some_and(|v| !v.is_empty()) {
    return DisplayMode::Ascii;
  }
  let term = env.term.as_deref().unwrap_or_default().to_lowercase();
  if term == "dumb" {
    return DisplayMode::Ascii;
  }
  let colorterm = env.colorterm.as_deref().unwrap_or_default().to_lowercase();
  if colorterm == "truecolor" || colorterm == "24bit" || term.ends_with("-direct") {
    return DisplayMode::Direct;
  }
  DisplayMode::Ascii
}

pub fn resolve_display_mode(cli: CliDisplayMode) -> DisplayMode {
  let mode = match cli {
    CliDisplayMode::Auto => detect_from(&TermEnv::current()),
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
  };
  debug!(?cli, ?mode, "display: resolved");
  mode
}

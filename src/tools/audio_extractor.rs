use reqwest::Url;
use std::path::PathBuf;
use tracing::{error, info};

use super::{Control, NO_VIDEO_FILE, TextField, selected_video};
use crate::api::{AudioReply, Endpoint, ServerBase};
use crate::artifact::{RemoteArtifact, Saved};
use crate::error::ToolResult;
use crate::format::format_file_size;
use crate::workflow::StatusView;

pub const NO_ARTIFACT: &str = "No audio file available for download";
pub const SAVED: &str = "Audio downloaded successfully!";
pub const SAVE_FAILED: &str = "Failed to download audio file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPreview {
  /// Where the server streams the extracted audio from.
  pub player_source: Url,
  pub file_label: String,
  pub size_label: String,
}

impl AudioPreview {
  pub fn from_reply(base: &ServerBase, reply: &AudioReply) -> Self {
    let file_label = reply.download_name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| reply.file_id.clone());
    Self {
      player_source: base.url(&Endpoint::AudioFile(reply.file_id.clone())),
      file_label,
      size_label: format_file_size(reply.size),
    }
  }
}

#[derive(Default)]
pub struct AudioTool {
  pub file: TextField,
  pub status: StatusView,
  pub preview: Option<AudioPreview>,
  artifact: Option<RemoteArtifact>,
}

impl AudioTool {
  pub fn controls(&self) -> Vec<Control> {
    let mut controls = vec![Control::VideoFile];
    if !self.file.is_blank() {
      controls.push(Control::ClearFile);
    }
    controls.push(Control::Extract);
    if self.artifact.is_some() {
      controls.push(Control::Download);
    }
    controls
  }

  pub fn field_mut(&mut self, control: Control) -> Option<&mut TextField> {
    (control == Control::VideoFile).then_some(&mut self.file)
  }

  pub fn has_artifact(&self) -> bool {
    self.artifact.is_some()
  }

  pub fn clear_file(&mut self) {
    self.file.clear();
    self.preview = None;
    if let Some(artifact) = self.artifact.take() {
      info!(id = %artifact.id, "audio: dropping undownloaded artifact");
    }
  }

  /// Validate and start an upload. Returns the file to send.
  pub fn begin_extract(&mut self) -> Option<PathBuf> {
    if !self.status.controls_enabled() || self.status.is_transferring() {
      return None;
    }
    let Some(video) = selected_video(&self.file) else {
      self.status.reject(NO_VIDEO_FILE);
      return None;
    };
    self.status.begin("Extracting audio...");
    self.preview = None;
    self.artifact = None;
    info!(video = %video.display(), "audio: extracting");
    Some(video)
  }

  pub fn apply_extract(&mut self, base: &ServerBase, result: ToolResult<AudioReply>) {
    match result {
      Ok(reply) => {
        self.preview = Some(AudioPreview::from_reply(base, &reply));
        self.artifact = Some(RemoteArtifact::audio(&reply));
        self.status.show_result(None);
      }
      Err(e) => self.status.fail(e.to_string()),
    }
  }

  /// Start saving the extracted audio. The artifact stays held until the
  /// transfer succeeds, so a failed save can be retried.
  pub fn begin_download(&mut self) -> Option<RemoteArtifact> {
    if self.status.is_transferring() {
      return None;
    }
    let Some(ref artifact) = self.artifact else {
      self.status.reject(NO_ARTIFACT);
      return None;
    };
    let artifact = artifact.clone();
    self.status.begin_transfer("Downloading audio...");
    Some(artifact)
  }

  pub fn apply_transfer(&mut self, result: ToolResult<Saved>) {
    match result {
      Ok(_) => {
        self.artifact = None;
        self.status.finish_transfer(Ok(SAVED.to_string()));
      }
      Err(e) => {
        error!(err = %e, "audio: download error");
        self.status.finish_transfer(Err(SAVE_FAILED.to_string()));
      }
    }
  }
}

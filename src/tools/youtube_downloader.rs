use image::DynamicImage;
use tracing::{error, info};

use super::{Control, TextField};
use crate::api::{DownloadRequest, DownloadTicket, VideoInfo};
use crate::artifact::{RemoteArtifact, Saved};
use crate::error::ToolResult;
use crate::format::{format_duration, format_number, parse_timestamp};
use crate::workflow::StatusView;

pub const NO_URL: &str = "Please enter a YouTube URL";
pub const BAD_TIMESTAMP: &str = "Invalid time format. Use HH:MM:SS, MM:SS, or SS";
pub const END_BEFORE_START: &str = "End time must be greater than start time";
pub const DOWNLOAD_DONE: &str = "Download completed! File is being saved to your Downloads folder.";
pub const SAVE_FAILED: &str = "Failed to save file to your computer";

/// Title, thumbnail and metadata rows for a looked-up video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPreview {
  pub title: String,
  pub thumbnail_url: Option<String>,
  pub details: Vec<(&'static str, String)>,
}

impl VideoPreview {
  pub fn from_info(info: &VideoInfo) -> Self {
    let title = if info.title.trim().is_empty() { "Unknown".to_string() } else { info.title.clone() };
    let mut details = Vec::new();
    if let Some(ref uploader) = info.uploader {
      details.push(("Uploader", uploader.clone()));
    }
    if let Some(secs) = info.duration.filter(|d| *d > 0.0) {
      details.push(("Duration", format_duration(secs.round() as u64)));
    }
    if let Some(views) = info.view_count {
      details.push(("Views", format_number(views)));
    }
    let thumbnail_url = info.thumbnail.clone().filter(|u| !u.is_empty());
    Self { title, thumbnail_url, details }
  }
}

/// Optional clip boundaries. Blank fields are sent as `null`.
pub fn validate_clip(start: &str, end: &str) -> Result<(Option<String>, Option<String>), &'static str> {
  let parse = |raw: &str| -> Result<Option<(String, u64)>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Ok(None);
    }
    parse_timestamp(raw).map(|secs| Some((raw.to_string(), secs))).ok_or(BAD_TIMESTAMP)
  };
  let start = parse(start)?;
  let end = parse(end)?;
  if let (Some((_, s)), Some((_, e))) = (&start, &end)
    && e <= s
  {
    return Err(END_BEFORE_START);
  }
  Ok((start.map(|(raw, _)| raw), end.map(|(raw, _)| raw)))
}

#[derive(Default)]
pub struct YouTubeTool {
  pub url: TextField,
  pub start: TextField,
  pub end: TextField,
  pub status: StatusView,
  pub preview: Option<VideoPreview>,
  pub thumbnail: Option<DynamicImage>,
}

impl YouTubeTool {
  pub fn controls(&self) -> Vec<Control> {
    vec![Control::Url, Control::StartTime, Control::EndTime, Control::Extract, Control::Download]
  }

  pub fn field_mut(&mut self, control: Control) -> Option<&mut TextField> {
    match control {
      Control::Url => Some(&mut self.url),
      Control::StartTime => Some(&mut self.start),
      Control::EndTime => Some(&mut self.end),
      _ => None,
    }
  }

  fn validated_url(&mut self) -> Option<String> {
    if self.url.is_blank() {
      self.status.reject(NO_URL);
      return None;
    }
    Some(self.url.trimmed().to_string())
  }

  /// Validate and start an info lookup. Returns the URL to look up.
  pub fn begin_info(&mut self) -> Option<String> {
    if !self.status.controls_enabled() || self.status.is_transferring() {
      return None;
    }
    let url = self.validated_url()?;
    self.status.begin("Processing...");
    self.preview = None;
    self.thumbnail = None;
    info!(url = %url, "youtube: probing video");
    Some(url)
  }

  /// Fold the info reply in. Returns the thumbnail URL to fetch, if any.
  pub fn apply_info(&mut self, result: ToolResult<VideoInfo>) -> Option<String> {
    match result {
      Ok(info) => {
        let preview = VideoPreview::from_info(&info);
        let thumb = preview.thumbnail_url.clone();
        self.preview = Some(preview);
        self.status.show_result(None);
        thumb
      }
      Err(e) => {
        self.status.fail(e.to_string());
        None
      }
    }
  }

  pub fn begin_download(&mut self) -> Option<DownloadRequest> {
    if !self.status.controls_enabled() || self.status.is_transferring() {
      return None;
    }
    let url = self.validated_url()?;
    let (start_time, end_time) = match validate_clip(&self.start.value, &self.end.value) {
      Ok(clip) => clip,
      Err(msg) => {
        self.status.reject(msg);
        return None;
      }
    };
    self.status.begin("Downloading...");
    info!(url = %url, start = ?start_time, end = ?end_time, "youtube: requesting download");
    Some(DownloadRequest { url, start_time, end_time })
  }

  /// On success the server holds the video; the returned artifact should be transferred next.
  pub fn apply_download(&mut self, result: ToolResult<DownloadTicket>) -> Option<RemoteArtifact> {
    match result {
      Ok(ticket) => {
        self.status.show_result(Some(DOWNLOAD_DONE.to_string()));
        self.status.begin_transfer("Saving video...");
        Some(RemoteArtifact::video(&ticket))
      }
      Err(e) => {
        self.status.fail(e.to_string());
        None
      }
    }
  }

  pub fn apply_transfer(&mut self, result: ToolResult<Saved>) {
    match result {
      Ok(saved) => self.status.finish_transfer(Ok(format!("Saved {}", saved.path.display()))),
      Err(e) => {
        error!(err = %e, "youtube: download error");
        self.status.finish_transfer(Err(SAVE_FAILED.to_string()));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::artifact::{ArtifactKind, ArtifactState};
  use crate::error::ToolError;
  use crate::workflow::{Notice, Phase};

  #[test]
  fn empty_url_is_rejected_before_any_request() {
    let mut tool = YouTubeTool::default();
    tool.url.set("   ");
    assert!(tool.begin_info().is_none());
    assert_eq!(tool.status.notice(), Some(&Notice::Error(NO_URL.into())));
    assert_eq!(tool.status.phase(), Phase::Idle);
    assert!(tool.begin_download().is_none());
  }

  #[test]
  fn begin_info_hides_previous_preview() {
    let mut tool = YouTubeTool::default();
    tool.preview = Some(VideoPreview { title: "old".into(), thumbnail_url: None, details: vec![] });
    tool.url.set(" https://youtu.be/x ");
    assert_eq!(tool.begin_info().as_deref(), Some("https://youtu.be/x"));
    assert!(tool.preview.is_none());
    assert!(!tool.status.controls_enabled());
    // Controls are disabled while loading.
    assert!(tool.begin_info().is_none());
    assert!(tool.begin_download().is_none());
  }

  #[test]
  fn info_reply_builds_preview() {
    let mut tool = YouTubeTool::default();
    tool.url.set("u");
    tool.begin_info();
    let info = VideoInfo {
      title: "Song".into(),
      thumbnail: Some("https://i.ytimg.com/vi/x/hq.jpg".into()),
      uploader: Some("Band".into()),
      duration: Some(212.0),
      view_count: Some(1_500_000),
    };
    assert_eq!(tool.apply_info(Ok(info)).as_deref(), Some("https://i.ytimg.com/vi/x/hq.jpg"));
    let preview = tool.preview.as_ref().unwrap();
    assert_eq!(preview.title, "Song");
    assert_eq!(
      preview.details,
      vec![("Uploader", "Band".to_string()), ("Duration", "3:32".to_string()), ("Views", "1.5M".to_string())]
    );
    assert_eq!(tool.status.phase(), Phase::ResultShown);
  }

  #[test]
  fn server_error_is_shown_inline() {
    let mut tool = YouTubeTool::default();
    tool.url.set("u");
    tool.begin_info();
    assert!(tool.apply_info(Err(ToolError::Server("Video unavailable".into()))).is_none());
    assert_eq!(tool.status.notice(), Some(&Notice::Error("Video unavailable".into())));
    assert!(tool.status.controls_enabled());
    assert!(tool.preview.is_none());
  }

  #[test]
  fn clip_validation() {
    assert_eq!(validate_clip("", ""), Ok((None, None)));
    assert_eq!(validate_clip("1:30", ""), Ok((Some("1:30".into()), None)));
    assert_eq!(validate_clip(" 0:10 ", "1:00:00"), Ok((Some("0:10".into()), Some("1:00:00".into()))));
    assert_eq!(validate_clip("abc", ""), Err(BAD_TIMESTAMP));
    assert_eq!(validate_clip("2:00", "1:59"), Err(END_BEFORE_START));
    assert_eq!(validate_clip("60", "1:00"), Err(END_BEFORE_START));
  }

  #[test]
  fn download_flow_hands_off_artifact() {
    let mut tool = YouTubeTool::default();
    tool.url.set("https://youtu.be/x");
    tool.end.set("45");
    let req = tool.begin_download().unwrap();
    let expected = DownloadRequest { url: "https://youtu.be/x".into(), start_time: None, end_time: Some("45".into()) };
    assert_eq!(req, expected);

    let artifact = tool
      .apply_download(Ok(DownloadTicket { file_id: "tok".into(), download_name: Some("Song.mp4".into()) }))
      .unwrap();
    assert_eq!(artifact.kind, ArtifactKind::Video);
    assert_eq!(artifact.download_name, "Song.mp4");
    assert_eq!(artifact.state, ArtifactState::Created);
    assert!(tool.status.is_transferring());
    assert!(tool.status.controls_enabled());
    assert_eq!(tool.status.notice().unwrap().text(), DOWNLOAD_DONE);

    tool.apply_transfer(Err(ToolError::Transfer { status: 500 }));
    assert_eq!(tool.status.notice(), Some(&Notice::Error(SAVE_FAILED.into())));
    assert_eq!(tool.status.phase(), Phase::Idle);
  }

  #[test]
  fn bad_clip_blocks_download() {
    let mut tool = YouTubeTool::default();
    tool.url.set("u");
    tool.start.set("5:00");
    tool.end.set("1:00");
    assert!(tool.begin_download().is_none());
    assert_eq!(tool.status.notice(), Some(&Notice::Error(END_BEFORE_START.into())));
  }
}

//! In-memory `MediaBackend` for workflow tests. Records every call and
//! answers from canned JSON bodies, so replies go through the same
//! `parse_reply` path as the real client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::api::{
  AudioReply, BlobStream, CleanupReply, DownloadRequest, DownloadTicket, Endpoint, FrameSet, MediaBackend, ServerBase,
  VideoInfo, parse_reply,
};
use crate::error::{ToolError, ToolResult};
use crate::frames::ExtractionMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  VideoInfo(String),
  DownloadVideo(DownloadRequest),
  ExtractAudio(PathBuf),
  ExtractFrames { video: PathBuf, mode: ExtractionMode, param: u32 },
  FetchBlob(Endpoint),
  Delete(Endpoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  VideoInfo,
  DownloadVideo,
  ExtractAudio,
  ExtractFrames,
}

pub struct FakeBackend {
  base: ServerBase,
  calls: Mutex<Vec<Call>>,
  replies: HashMap<Op, String>,
  blob: Option<Vec<u8>>,
  delete_fails: bool,
  delete_refused: bool,
}

impl FakeBackend {
  pub fn new() -> Self {
    Self {
      base: ServerBase::parse("http://127.0.0.1:5000").unwrap(),
      calls: Mutex::new(Vec::new()),
      replies: HashMap::new(),
      blob: None,
      delete_fails: false,
      delete_refused: false,
    }
  }

  pub fn with_reply(mut self, op: Op, json: &str) -> Self {
    self.replies.insert(op, json.to_string());
    self
  }

  pub fn with_blob(mut self, body: &[u8]) -> Self {
    self.blob = Some(body.to_vec());
    self
  }

  pub fn failing_delete(mut self) -> Self {
    self.delete_fails = true;
    self
  }

  /// DELETE answers normally but with an `error` field.
  pub fn refusing_delete(mut self) -> Self {
    self.delete_refused = true;
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  fn record(&self, call: Call) {
    self.calls.lock().unwrap().push(call);
  }

  fn reply<T: serde::de::DeserializeOwned>(&self, op: Op) -> ToolResult<T> {
    match self.replies.get(&op) {
      Some(body) => parse_reply(body.as_bytes()),
      None => Err(ToolError::Server(format!("no canned reply for {:?}", op))),
    }
  }
}

#[async_trait]
impl MediaBackend for FakeBackend {
  fn base(&self) -> &ServerBase {
    &self.base
  }

  async fn video_info(&self, url: &str) -> ToolResult<VideoInfo> {
    self.record(Call::VideoInfo(url.to_string()));
    self.reply(Op::VideoInfo)
  }

  async fn download_video(&self, request: DownloadRequest) -> ToolResult<DownloadTicket> {
    self.record(Call::DownloadVideo(request));
    self.reply(Op::DownloadVideo)
  }

  async fn extract_audio(&self, video: &Path) -> ToolResult<AudioReply> {
    self.record(Call::ExtractAudio(video.to_path_buf()));
    self.reply(Op::ExtractAudio)
  }

  async fn extract_frames(&self, video: &Path, mode: ExtractionMode, param: u32) -> ToolResult<FrameSet> {
    self.record(Call::ExtractFrames { video: video.to_path_buf(), mode, param });
    self.reply(Op::ExtractFrames)
  }

  async fn fetch_blob(&self, endpoint: Endpoint) -> ToolResult<BlobStream> {
    self.record(Call::FetchBlob(endpoint));
    match self.blob.clone() {
      Some(body) => Ok(Box::pin(futures::stream::iter(vec![Ok(body)]))),
      None => Err(ToolError::Transfer { status: 404 }),
    }
  }

  async fn delete(&self, endpoint: Endpoint) -> ToolResult<CleanupReply> {
    self.record(Call::Delete(endpoint));
    if self.delete_fails {
      Err(ToolError::Server("File not found".into()))
    } else if self.delete_refused {
      Ok(CleanupReply { message: None, error: Some("File not found".into()) })
    } else {
      Ok(CleanupReply { message: Some("File deleted".into()), error: None })
    }
  }
}

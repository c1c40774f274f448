//! Client side of the media server's HTTP contract.
//!
//! Every JSON endpoint signals failure through an `error` field in the body
//! rather than the status code, so replies are decoded as a generic JSON value
//! first and only then into the typed reply. Blob endpoints are the exception:
//! a non-2xx status there is a failure on its own.

use anyhow::{Context, bail};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response, Url, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::path::Path;
use std::pin::Pin;
use tracing::debug;

use crate::error::{ToolError, ToolResult};
use crate::frames::ExtractionMode;

/// Chunks of an artifact body, in order.
pub type BlobStream = Pin<Box<dyn Stream<Item = ToolResult<Vec<u8>>> + Send>>;

// --- Endpoints ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
  YouTubeExtract,
  YouTubeDownload,
  YouTubeFile(String),
  YouTubeDelete(String),
  AudioExtract,
  AudioFile(String),
  AudioDelete(String),
  FramesExtract,
  Frame { folder: String, file: String },
  FramesArchive(String),
  FramesDelete(String),
}

impl Endpoint {
  /// Unencoded path segments; `ServerBase::url` percent-encodes them.
  pub fn segments(&self) -> Vec<&str> {
    match self {
      Endpoint::YouTubeExtract => vec!["api", "youtube", "extract"],
      Endpoint::YouTubeDownload => vec!["api", "youtube", "download"],
      Endpoint::YouTubeFile(id) => vec!["api", "youtube", "get-file", id.as_str()],
      Endpoint::YouTubeDelete(id) => vec!["api", "youtube", "delete-file", id.as_str()],
      Endpoint::AudioExtract => vec!["api", "audio", "extract"],
      Endpoint::AudioFile(id) => vec!["api", "audio", "get-file", id.as_str()],
      Endpoint::AudioDelete(id) => vec!["api", "audio", "delete-file", id.as_str()],
      Endpoint::FramesExtract => vec!["api", "frames", "extract"],
      Endpoint::Frame { folder, file } => vec!["api", "frames", "get-frame", folder.as_str(), file.as_str()],
      Endpoint::FramesArchive(folder) => vec!["api", "frames", "download-all", folder.as_str()],
      Endpoint::FramesDelete(folder) => vec!["api", "frames", "delete-folder", folder.as_str()],
    }
  }
}

/// Root URL of the media server. Always a hierarchical http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBase(Url);

impl ServerBase {
  pub fn parse(raw: &str) -> anyhow::Result<Self> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid server URL '{}'", raw))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
      bail!("Server URL must be an http(s) address, got '{}'", raw);
    }
    Ok(Self(url))
  }

  pub fn url(&self, endpoint: &Endpoint) -> Url {
    let mut url = self.0.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().extend(endpoint.segments());
    }
    url
  }

  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }
}

// --- Replies ---

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VideoInfo {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub thumbnail: Option<String>,
  #[serde(default)]
  pub uploader: Option<String>,
  /// Seconds; yt-dlp reports this as a float for some sources.
  #[serde(default)]
  pub duration: Option<f64>,
  #[serde(default)]
  pub view_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DownloadRequest {
  pub url: String,
  pub start_time: Option<String>,
  pub end_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DownloadTicket {
  pub file_id: String,
  #[serde(default)]
  pub download_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AudioReply {
  pub file_id: String,
  #[serde(default)]
  pub download_name: Option<String>,
  #[serde(default)]
  pub size: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FrameSet {
  #[serde(default)]
  pub frames_saved: u64,
  #[serde(default)]
  pub frame_files: Vec<String>,
  pub frames_folder: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CleanupReply {
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub error: Option<String>,
}

impl CleanupReply {
  pub fn succeeded(&self) -> bool {
    self.error.as_deref().is_none_or(str::is_empty)
  }

  pub fn summary(&self) -> &str {
    self.message.as_deref().or(self.error.as_deref()).unwrap_or("no details")
  }
}

/// Extract the server's error message, following JavaScript truthiness:
/// `null`, `false`, `0` and `""` mean "no error".
fn error_field(value: &Value) -> Option<String> {
  match value.get("error")? {
    Value::Null | Value::Bool(false) => None,
    Value::String(s) if s.is_empty() => None,
    Value::String(s) => Some(s.clone()),
    Value::Number(n) if n.as_f64() == Some(0.0) => None,
    other => Some(other.to_string()),
  }
}

/// Decode a JSON reply body, turning an `error` field into `ToolError::Server`.
pub fn parse_reply<T: DeserializeOwned>(body: &[u8]) -> ToolResult<T> {
  let value: Value = serde_json::from_slice(body).map_err(ToolError::Decode)?;
  if let Some(msg) = error_field(&value) {
    return Err(ToolError::Server(msg));
  }
  serde_json::from_value(value).map_err(ToolError::Decode)
}

/// Drain a blob stream into memory (frame previews are small).
pub async fn read_blob(mut stream: BlobStream) -> ToolResult<Vec<u8>> {
  let mut body = Vec::new();
  while let Some(chunk) = stream.next().await {
    body.extend_from_slice(&chunk?);
  }
  Ok(body)
}

// --- Backend seam ---

/// The media server as seen by the workflows.
#[async_trait]
pub trait MediaBackend: Send + Sync {
  fn base(&self) -> &ServerBase;

  async fn video_info(&self, url: &str) -> ToolResult<VideoInfo>;

  async fn download_video(&self, request: DownloadRequest) -> ToolResult<DownloadTicket>;

  async fn extract_audio(&self, video: &Path) -> ToolResult<AudioReply>;

  /// `param` goes out as `param_value` for every mode; the server ignores it for `all_frames`.
  async fn extract_frames(&self, video: &Path, mode: ExtractionMode, param: u32) -> ToolResult<FrameSet>;

  async fn fetch_blob(&self, endpoint: Endpoint) -> ToolResult<BlobStream>;

  async fn delete(&self, endpoint: Endpoint) -> ToolResult<CleanupReply>;
}

// --- reqwest implementation ---

pub struct HttpBackend {
  client: Client,
  base: ServerBase,
}

impl HttpBackend {
  pub fn new(base: ServerBase) -> Self {
    Self { client: Client::new(), base }
  }

  async fn decode<T: DeserializeOwned>(response: Response) -> ToolResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(ToolError::Transport)?;
    match parse_reply(&body) {
      Err(ToolError::Decode(_)) if !status.is_success() => {
        Err(ToolError::Server(format!("Server responded with {}", status)))
      }
      other => other,
    }
  }

  async fn post_form<T: DeserializeOwned>(&self, endpoint: Endpoint, form: multipart::Form) -> ToolResult<T> {
    let url = self.base.url(&endpoint);
    debug!(url = %url, "api: POST multipart");
    let response = self.client.post(url).multipart(form).send().await.map_err(ToolError::Transport)?;
    Self::decode(response).await
  }
}

/// Stream a local video as a multipart part named after the file.
async fn video_part(video: &Path) -> ToolResult<multipart::Part> {
  let name = video.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "video".to_string());
  let read_err = |e| ToolError::io(format!("Could not read {}", name), e);
  let file = tokio::fs::File::open(video).await.map_err(read_err)?;
  let len = file.metadata().await.map_err(read_err)?.len();
  Ok(multipart::Part::stream_with_length(reqwest::Body::from(file), len).file_name(name))
}

#[async_trait]
impl MediaBackend for HttpBackend {
  fn base(&self) -> &ServerBase {
    &self.base
  }

  async fn video_info(&self, url: &str) -> ToolResult<VideoInfo> {
    let endpoint = self.base.url(&Endpoint::YouTubeExtract);
    debug!(url = %endpoint, "api: POST json");
    let response = self
      .client
      .post(endpoint)
      .json(&serde_json::json!({ "url": url }))
      .send()
      .await
      .map_err(ToolError::Transport)?;
    Self::decode(response).await
  }

  async fn download_video(&self, request: DownloadRequest) -> ToolResult<DownloadTicket> {
    let endpoint = self.base.url(&Endpoint::YouTubeDownload);
    debug!(url = %endpoint, "api: POST json");
    let response = self.client.post(endpoint).json(&request).send().await.map_err(ToolError::Transport)?;
    Self::decode(response).await
  }

  async fn extract_audio(&self, video: &Path) -> ToolResult<AudioReply> {
    let form = multipart::Form::new().part("video_file", video_part(video).await?);
    self.post_form(Endpoint::AudioExtract, form).await
  }

  async fn extract_frames(&self, video: &Path, mode: ExtractionMode, param: u32) -> ToolResult<FrameSet> {
    let form = multipart::Form::new()
      .part("video_file", video_part(video).await?)
      .text("extraction_mode", mode.as_str())
      .text("param_value", param.to_string());
    self.post_form(Endpoint::FramesExtract, form).await
  }

  async fn fetch_blob(&self, endpoint: Endpoint) -> ToolResult<BlobStream> {
    let url = self.base.url(&endpoint);
    debug!(url = %url, "api: GET blob");
    let response = self.client.get(url).send().await.map_err(ToolError::Transport)?;
    let status = response.status();
    if !status.is_success() {
      return Err(ToolError::Transfer { status: status.as_u16() });
    }
    Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map(|b| b.to_vec()).map_err(ToolError::Transport))))
  }

  async fn delete(&self, endpoint: Endpoint) -> ToolResult<CleanupReply> {
    let url = self.base.url(&endpoint);
    debug!(url = %url, "api: DELETE");
    let response = self.client.delete(url).send().await.map_err(ToolError::Transport)?;
    let body = response.bytes().await.map_err(ToolError::Transport)?;
    serde_json::from_slice(&body).map_err(ToolError::Decode)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::artifact::{self, ArtifactState, RemoteArtifact};
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn base() -> ServerBase {
    ServerBase::parse("http://127.0.0.1:5000").unwrap()
  }

  // --- ServerBase ---

  #[test]
  fn joins_endpoint_onto_root() {
    let url = base().url(&Endpoint::AudioFile("abc".into()));
    assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/audio/get-file/abc");
  }

  #[test]
  fn keeps_base_path_prefix() {
    let base = ServerBase::parse("https://media.example.com/tools/").unwrap();
    assert_eq!(base.url(&Endpoint::YouTubeExtract).path(), "/tools/api/youtube/extract");
  }

  #[test]
  fn percent_encodes_segments() {
    let url = base().url(&Endpoint::Frame { folder: "my frames".into(), file: "a/b#1.jpg".into() });
    assert_eq!(url.path(), "/api/frames/get-frame/my%20frames/a%2Fb%231.jpg");
  }

  #[test]
  fn rejects_non_http_base() {
    assert!(ServerBase::parse("mailto:someone@example.com").is_err());
    assert!(ServerBase::parse("ftp://host/").is_err());
    assert!(ServerBase::parse("not a url").is_err());
  }

  // --- parse_reply ---

  #[test]
  fn error_field_becomes_server_error() {
    let err = parse_reply::<VideoInfo>(br#"{"error": "URL is required"}"#).unwrap_err();
    assert!(matches!(err, ToolError::Server(ref m) if m == "URL is required"));
  }

  #[test]
  fn falsy_error_field_is_ignored() {
    let info: VideoInfo = parse_reply(br#"{"error": null, "title": "T"}"#).unwrap();
    assert_eq!(info.title, "T");
    let info: VideoInfo = parse_reply(br#"{"error": "", "title": "U"}"#).unwrap();
    assert_eq!(info.title, "U");
  }

  #[test]
  fn decodes_audio_reply() {
    let reply: AudioReply = parse_reply(br#"{"file_id":"abc","download_name":"clip.mp3","size":204800}"#).unwrap();
    assert_eq!(reply, AudioReply { file_id: "abc".into(), download_name: Some("clip.mp3".into()), size: 204_800 });
  }

  #[test]
  fn legacy_filename_contract_is_rejected() {
    let err = parse_reply::<DownloadTicket>(br#"{"message":"ok","filename":"v.mp4"}"#).unwrap_err();
    assert!(matches!(err, ToolError::Decode(_)));
  }

  #[test]
  fn non_json_body_is_decode_error() {
    assert!(matches!(parse_reply::<FrameSet>(b"<html>oops</html>"), Err(ToolError::Decode(_))));
  }

  #[test]
  fn video_info_tolerates_float_duration() {
    let info: VideoInfo = parse_reply(br#"{"title":"T","duration":212.5,"view_count":1500}"#).unwrap();
    assert_eq!(info.duration, Some(212.5));
    assert_eq!(info.view_count, Some(1500));
    assert!(info.thumbnail.is_none());
  }

  #[test]
  fn download_request_sends_null_times() {
    let req = DownloadRequest { url: "u".into(), start_time: None, end_time: Some("1:00".into()) };
    let expected = serde_json::json!({"url": "u", "start_time": null, "end_time": "1:00"});
    assert_eq!(serde_json::to_value(&req).unwrap(), expected);
  }

  // --- CleanupReply ---

  #[test]
  fn cleanup_summary_prefers_message() {
    let ok = CleanupReply { message: Some("deleted".into()), error: None };
    assert!(ok.succeeded());
    assert_eq!(ok.summary(), "deleted");
    let failed = CleanupReply { message: None, error: Some("missing".into()) };
    assert!(!failed.succeeded());
    assert_eq!(failed.summary(), "missing");
  }

  #[tokio::test]
  async fn read_blob_concatenates_chunks() {
    let stream: BlobStream = Box::pin(futures::stream::iter(vec![Ok(b"ab".to_vec()), Ok(b"cd".to_vec())]));
    assert_eq!(read_blob(stream).await.unwrap(), b"abcd");
  }

  // --- HttpBackend on the wire ---

  async fn serve() -> (MockServer, HttpBackend) {
    let server = MockServer::start().await;
    let backend = HttpBackend::new(ServerBase::parse(&server.uri()).unwrap());
    (server, backend)
  }

  async fn sent_body(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    String::from_utf8_lossy(&requests[0].body).into_owned()
  }

  #[tokio::test]
  async fn download_posts_json_with_null_times() {
    let (server, backend) = serve().await;
    Mock::given(method("POST"))
      .and(path("/api/youtube/download"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"file_id": "v1", "download_name": "a.mp4"})),
      )
      .mount(&server)
      .await;

    let request = DownloadRequest { url: "https://youtu.be/x".into(), start_time: None, end_time: None };
    let ticket = backend.download_video(request).await.unwrap();

    assert_eq!(ticket.file_id, "v1");
    let body: Value = serde_json::from_str(&sent_body(&server).await).unwrap();
    assert_eq!(body, serde_json::json!({"url": "https://youtu.be/x", "start_time": null, "end_time": null}));
  }

  #[tokio::test]
  async fn frames_form_always_carries_param_value() {
    let (server, backend) = serve().await;
    Mock::given(method("POST"))
      .and(path("/api/frames/extract"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"frames_folder": "f1"})))
      .mount(&server)
      .await;
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    std::fs::write(&video, b"VIDEO-BYTES").unwrap();

    let set = backend.extract_frames(&video, ExtractionMode::AllFrames, 10).await.unwrap();

    assert_eq!(set.frames_folder, "f1");
    let body = sent_body(&server).await;
    assert!(body.contains(r#"name="video_file"; filename="in.mp4""#));
    assert!(body.contains("VIDEO-BYTES"));
    assert!(body.contains(r#"name="extraction_mode""#));
    assert!(body.contains("all_frames"));
    assert!(body.contains(r#"name="param_value""#));
  }

  #[tokio::test]
  async fn missing_upload_fails_before_sending() {
    let (server, backend) = serve().await;
    let err = backend.extract_audio(Path::new("/definitely/not/here.mp4")).await.unwrap_err();
    assert!(matches!(err, ToolError::Io { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn blob_status_maps_to_transfer_error() {
    let (server, backend) = serve().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let err = backend.fetch_blob(Endpoint::AudioFile("gone".into())).await.err().unwrap();
    assert!(matches!(err, ToolError::Transfer { status: 404 }));
  }

  #[tokio::test]
  async fn html_error_page_reports_status() {
    let (server, backend) = serve().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
      .mount(&server)
      .await;

    let err = backend.video_info("https://youtu.be/x").await.unwrap_err();
    assert!(err.to_string().starts_with("Server responded with 500"));
  }

  #[tokio::test]
  async fn error_field_wins_over_success_status() {
    let (server, backend) = serve().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "Invalid URL"})))
      .mount(&server)
      .await;

    let err = backend.video_info("nope").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid URL");
  }

  #[tokio::test]
  async fn refused_delete_keeps_artifact_downloaded() {
    let (server, backend) = serve().await;
    Mock::given(method("GET"))
      .and(path("/api/audio/get-file/abc"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MP3".to_vec()))
      .mount(&server)
      .await;
    Mock::given(method("DELETE"))
      .and(path("/api/audio/delete-file/abc"))
      .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "File not found"})))
      .expect(1)
      .mount(&server)
      .await;
    let dir = tempfile::tempdir().unwrap();
    let artifact =
      RemoteArtifact::audio(&AudioReply { file_id: "abc".into(), download_name: Some("clip.mp3".into()), size: 3 });

    let saved = artifact::transfer(&backend, artifact, dir.path()).await.unwrap();

    assert_eq!(saved.artifact.state, ArtifactState::Downloaded);
    assert_eq!(std::fs::read(dir.path().join("clip.mp3")).unwrap(), b"MP3");
  }
}

use image::DynamicImage;
use ratatui::widgets::ListState;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::api::{AudioReply, DownloadTicket, Endpoint, FrameSet, MediaBackend, VideoInfo, read_blob};
use crate::artifact::{self, RemoteArtifact, Saved};
use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::error::{ToolError, ToolResult};
use crate::frames::FramePreview;
use crate::graphics::{ImageCache, decode_image, fetch_image};
use crate::theme::{THEMES, Theme, theme_index};
use crate::tool::{Selection, Tool, ToolKind, ToolPanel};
use crate::tools::{AudioTool, Control, FrameTool, TextField, YouTubeTool};
use crate::workflow::StatusView;

/// Where keystrokes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Tools,
  Panel,
  FramePreview,
}

type FrameImage = (String, Result<DynamicImage, String>);

/// In-flight background task receivers, one slot per request kind.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  youtube_info: Option<oneshot::Receiver<ToolResult<VideoInfo>>>,
  youtube_download: Option<oneshot::Receiver<ToolResult<DownloadTicket>>>,
  youtube_transfer: Option<oneshot::Receiver<ToolResult<Saved>>>,
  thumbnail: Option<oneshot::Receiver<anyhow::Result<DynamicImage>>>,
  audio_extract: Option<oneshot::Receiver<ToolResult<AudioReply>>>,
  audio_transfer: Option<oneshot::Receiver<ToolResult<Saved>>>,
  frames_extract: Option<oneshot::Receiver<ToolResult<FrameSet>>>,
  frames_transfer: Option<oneshot::Receiver<ToolResult<Saved>>>,
  frame_image: Option<oneshot::Receiver<FrameImage>>,
}

impl AsyncTasks {
  fn any(&self) -> bool {
    self.youtube_info.is_some()
      || self.youtube_download.is_some()
      || self.youtube_transfer.is_some()
      || self.thumbnail.is_some()
      || self.audio_extract.is_some()
      || self.audio_transfer.is_some()
      || self.frames_extract.is_some()
      || self.frames_transfer.is_some()
      || self.frame_image.is_some()
  }
}

/// Resized images kept between frames so redraws don't rescale.
#[derive(Default)]
pub struct GraphicsCache {
  pub thumbnail: ImageCache,
  pub frame: ImageCache,
}

fn spawn<T: Send + 'static>(task: impl Future<Output = T> + Send + 'static) -> oneshot::Receiver<T> {
  let (tx, rx) = oneshot::channel();
  tokio::spawn(async move {
    let _ = tx.send(task.await);
  });
  rx
}

/// Take a task's result once it has arrived. A task that died without
/// reporting yields `lost()`.
fn take_ready<T>(slot: &mut Option<oneshot::Receiver<T>>, lost: impl FnOnce() -> T) -> Option<T> {
  let mut rx = slot.take()?;
  match rx.try_recv() {
    Ok(value) => Some(value),
    Err(oneshot::error::TryRecvError::Empty) => {
      *slot = Some(rx);
      None
    }
    Err(oneshot::error::TryRecvError::Closed) => Some(lost()),
  }
}

async fn load_frame(backend: Arc<dyn MediaBackend>, endpoint: Endpoint) -> Result<DynamicImage, String> {
  let stream = backend.fetch_blob(endpoint).await.map_err(|e| e.to_string())?;
  let body = read_blob(stream).await.map_err(|e| e.to_string())?;
  decode_image(&body).map_err(|e| format!("{:#}", e))
}

fn interrupted<T>() -> ToolResult<T> {
  Err(ToolError::Interrupted)
}

pub struct App {
  pub panel: ToolPanel,
  /// Cursor over the unselected tool list.
  pub list_state: ListState,
  pub focus: Focus,
  /// Index into the selected tool's controls.
  pub control_index: usize,
  pub youtube: YouTubeTool,
  pub audio: AudioTool,
  pub frames: FrameTool,
  pub frame_preview: Option<FramePreview>,
  /// Image for the frame the preview shows, keyed by file name.
  pub frame_image: Option<(String, DynamicImage)>,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  pub download_dir: PathBuf,
  pub gfx: GraphicsCache,
  pub last_error: Option<String>,
  pub should_quit: bool,
  /// App start instant, drives the spinner.
  pub started_at: Instant,
  backend: Arc<dyn MediaBackend>,
  http_client: Client,
  tasks: AsyncTasks,
  config: Config,
  persist_config: bool,
  /// When the last error was set, for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(config: Config, backend: Arc<dyn MediaBackend>, download_dir: PathBuf, display_mode: DisplayMode) -> Self {
    Self::build(config, backend, download_dir, display_mode, true)
  }

  #[cfg(test)]
  pub fn new_for_tests(
    config: Config,
    backend: Arc<dyn MediaBackend>,
    download_dir: PathBuf,
    display_mode: DisplayMode,
  ) -> Self {
    Self::build(config, backend, download_dir, display_mode, false)
  }

  fn build(
    config: Config,
    backend: Arc<dyn MediaBackend>,
    download_dir: PathBuf,
    display_mode: DisplayMode,
    persist_config: bool,
  ) -> Self {
    let tools = constants().tools.iter().map(Tool::from).chain(config.extra_tools.iter().map(Tool::from));
    let panel = ToolPanel::new(tools);
    let mut list_state = ListState::default();
    if !panel.unselected().is_empty() {
      list_state.select(Some(0));
    }
    info!(server = %backend.base().as_str(), tools = panel.unselected().len(), "app: starting");

    Self {
      panel,
      list_state,
      focus: Focus::Tools,
      control_index: 0,
      youtube: YouTubeTool::default(),
      audio: AudioTool::default(),
      frames: FrameTool::default(),
      frame_preview: None,
      frame_image: None,
      theme_index: theme_index(config.theme_name.as_deref()),
      display_mode,
      download_dir,
      gfx: GraphicsCache::default(),
      last_error: None,
      should_quit: false,
      started_at: Instant::now(),
      backend,
      http_client: Client::new(),
      tasks: AsyncTasks::default(),
      config,
      persist_config,
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index comes from theme_index() or modular arithmetic in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    debug!(theme = self.theme().name, "ui: theme");
    if self.persist_config {
      self.config.theme_name = Some(self.theme().name.to_string());
      self.config.save();
    }
  }

  pub fn server_label(&self) -> &str {
    self.backend.base().as_str()
  }

  // --- Errors ---

  /// Set an app-level error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.clear_error();
    }
  }

  // --- Selection ---

  pub fn active_kind(&self) -> Option<ToolKind> {
    self.panel.selected().map(|t| t.kind)
  }

  /// Whether ^d has something to fetch. YouTube downloads start from the form.
  pub fn download_ready(&self) -> bool {
    match self.active_kind() {
      Some(ToolKind::YouTubeDownloader) => true,
      Some(ToolKind::AudioExtractor) => self.audio.has_artifact(),
      Some(ToolKind::FrameGrabber) => self.frames.has_artifact(),
      Some(ToolKind::Generic) | None => false,
    }
  }

  pub fn status(&self, kind: ToolKind) -> Option<&StatusView> {
    match kind {
      ToolKind::YouTubeDownloader => Some(&self.youtube.status),
      ToolKind::AudioExtractor => Some(&self.audio.status),
      ToolKind::FrameGrabber => Some(&self.frames.status),
      ToolKind::Generic => None,
    }
  }

  pub fn move_tool_cursor(&mut self, step: isize) {
    let count = self.panel.unselected().len() as isize;
    if count == 0 {
      self.list_state.select(None);
      return;
    }
    let i = self.list_state.selected().map_or(0, |i| (i as isize + step).rem_euclid(count) as usize);
    self.list_state.select(Some(i));
  }

  pub fn select_highlighted(&mut self) {
    let Some(name) = self.list_state.selected().and_then(|i| self.panel.unselected().get(i)).map(|t| t.name.clone())
    else {
      return;
    };
    self.select_tool(&name);
  }

  pub fn select_tool(&mut self, name: &str) {
    match self.panel.select(name) {
      Selection::Selected { previous } => {
        info!(tool = %name, previous = ?previous, "app: tool selected");
        self.close_frame_preview();
        self.control_index = 0;
        self.focus = Focus::Panel;
        self.clamp_tool_cursor();
      }
      Selection::Unchanged => self.focus = Focus::Panel,
      Selection::Unknown => warn!(tool = %name, "app: no such tool"),
    }
  }

  pub fn close_tool(&mut self) {
    self.close_frame_preview();
    if let Some(name) = self.panel.close() {
      info!(tool = %name, "app: tool closed");
    }
    self.focus = Focus::Tools;
    self.clamp_tool_cursor();
  }

  fn clamp_tool_cursor(&mut self) {
    let count = self.panel.unselected().len();
    match self.list_state.selected() {
      _ if count == 0 => self.list_state.select(None),
      Some(i) if i >= count => self.list_state.select(Some(count - 1)),
      None => self.list_state.select(Some(0)),
      Some(_) => {}
    }
  }

  // --- Controls ---

  pub fn controls(&self) -> Vec<Control> {
    match self.active_kind() {
      Some(ToolKind::YouTubeDownloader) => self.youtube.controls(),
      Some(ToolKind::AudioExtractor) => self.audio.controls(),
      Some(ToolKind::FrameGrabber) => self.frames.controls(),
      Some(ToolKind::Generic) | None => Vec::new(),
    }
  }

  pub fn focused_control(&self) -> Option<Control> {
    let controls = self.controls();
    controls.get(self.control_index.min(controls.len().saturating_sub(1))).copied()
  }

  pub fn move_control(&mut self, step: isize) {
    let count = self.controls().len() as isize;
    if count > 0 {
      let current = self.control_index.min(count as usize - 1) as isize;
      self.control_index = (current + step).rem_euclid(count) as usize;
    }
  }

  pub fn focused_field_mut(&mut self) -> Option<&mut TextField> {
    let control = self.focused_control()?;
    self.field_mut(control)
  }

  /// The text field behind `control` on the selected tool.
  pub fn field_mut(&mut self, control: Control) -> Option<&mut TextField> {
    match self.active_kind()? {
      ToolKind::YouTubeDownloader => self.youtube.field_mut(control),
      ToolKind::AudioExtractor => self.audio.field_mut(control),
      ToolKind::FrameGrabber => self.frames.field_mut(control),
      ToolKind::Generic => None,
    }
  }

  /// Enter on the focused control.
  pub fn activate(&mut self) {
    match self.focused_control() {
      Some(Control::Download) => self.trigger_download(),
      Some(Control::ClearFile) => {
        self.clear_file();
        self.control_index = 0;
      }
      Some(Control::Mode) => self.frames.cycle_mode(1),
      Some(Control::Frames) => self.open_frame_preview(),
      Some(_) => self.trigger_extract(),
      None => {}
    }
  }

  pub fn clear_file(&mut self) {
    match self.active_kind() {
      Some(ToolKind::AudioExtractor) => self.audio.clear_file(),
      Some(ToolKind::FrameGrabber) => self.frames.clear_file(),
      _ => {}
    }
  }

  // --- Workflows ---

  pub fn trigger_extract(&mut self) {
    match self.active_kind() {
      Some(ToolKind::YouTubeDownloader) => self.trigger_video_info(),
      Some(ToolKind::AudioExtractor) => self.trigger_audio_extract(),
      Some(ToolKind::FrameGrabber) => self.trigger_frames_extract(),
      Some(ToolKind::Generic) | None => {}
    }
  }

  pub fn trigger_download(&mut self) {
    match self.active_kind() {
      Some(ToolKind::YouTubeDownloader) => self.trigger_video_download(),
      Some(ToolKind::AudioExtractor) => {
        if let Some(artifact) = self.audio.begin_download() {
          self.tasks.audio_transfer = Some(self.spawn_transfer(artifact));
        }
      }
      Some(ToolKind::FrameGrabber) => {
        if let Some(artifact) = self.frames.begin_download() {
          self.tasks.frames_transfer = Some(self.spawn_transfer(artifact));
        }
      }
      Some(ToolKind::Generic) | None => {}
    }
  }

  fn trigger_video_info(&mut self) {
    let Some(url) = self.youtube.begin_info() else { return };
    self.tasks.thumbnail = None;
    self.gfx.thumbnail.clear();
    let backend = Arc::clone(&self.backend);
    self.tasks.youtube_info = Some(spawn(async move { backend.video_info(&url).await }));
  }

  fn trigger_video_download(&mut self) {
    let Some(request) = self.youtube.begin_download() else { return };
    let backend = Arc::clone(&self.backend);
    self.tasks.youtube_download = Some(spawn(async move { backend.download_video(request).await }));
  }

  fn trigger_audio_extract(&mut self) {
    let Some(video) = self.audio.begin_extract() else { return };
    let backend = Arc::clone(&self.backend);
    self.tasks.audio_extract = Some(spawn(async move { backend.extract_audio(&video).await }));
  }

  fn trigger_frames_extract(&mut self) {
    let Some(req) = self.frames.begin_extract() else { return };
    self.close_frame_preview();
    let backend = Arc::clone(&self.backend);
    self.tasks.frames_extract =
      Some(spawn(async move { backend.extract_frames(&req.video, req.mode, req.param).await }));
  }

  fn spawn_transfer(&self, artifact: RemoteArtifact) -> oneshot::Receiver<ToolResult<Saved>> {
    let backend = Arc::clone(&self.backend);
    let dir = self.download_dir.clone();
    info!(id = %artifact.id, dir = %dir.display(), "app: saving artifact");
    spawn(async move { artifact::transfer(backend.as_ref(), artifact, &dir).await })
  }

  // --- Frame preview ---

  pub fn open_frame_preview(&mut self) {
    let Some(preview) = self.frames.open_preview() else { return };
    debug!(index = preview.index(), "ui: frame preview open");
    self.load_frame_image(&preview);
    self.frame_preview = Some(preview);
    self.focus = Focus::FramePreview;
  }

  pub fn navigate_frame(&mut self, step: isize) {
    if let Some(preview) = self.frame_preview.take() {
      let preview = preview.navigate(step);
      self.load_frame_image(&preview);
      self.frame_preview = Some(preview);
    }
  }

  pub fn close_frame_preview(&mut self) {
    if let Some(preview) = self.frame_preview.take() {
      self.frames.close_preview(preview);
      self.focus = Focus::Panel;
    }
    self.frame_image = None;
    self.tasks.frame_image = None;
    self.gfx.frame.clear();
  }

  fn load_frame_image(&mut self, preview: &FramePreview) {
    if self.frame_image.as_ref().is_some_and(|(file, _)| file == preview.current_file()) {
      return;
    }
    let file = preview.current_file().to_string();
    let endpoint = preview.endpoint();
    let backend = Arc::clone(&self.backend);
    self.tasks.frame_image = Some(spawn(async move { (file, load_frame(backend, endpoint).await) }));
  }

  // --- Polling ---

  pub fn has_pending(&self) -> bool {
    self.tasks.any()
  }

  /// Fold in every background result that has arrived. Called once per tick.
  pub fn check_pending(&mut self) {
    if let Some(result) = take_ready(&mut self.tasks.youtube_info, interrupted)
      && let Some(thumb_url) = self.youtube.apply_info(result)
    {
      let client = self.http_client.clone();
      self.tasks.thumbnail = Some(spawn(async move { fetch_image(&client, &thumb_url).await }));
    }

    if let Some(result) = take_ready(&mut self.tasks.thumbnail, || Err(anyhow::anyhow!("thumbnail task dropped"))) {
      match result {
        Ok(image) => {
          self.youtube.thumbnail = Some(image);
          self.gfx.thumbnail.clear();
        }
        Err(e) => {
          let err = format!("{:#}", e);
          warn!(err = %err, "youtube: thumbnail unavailable");
        }
      }
    }

    if let Some(result) = take_ready(&mut self.tasks.youtube_download, interrupted)
      && let Some(artifact) = self.youtube.apply_download(result)
    {
      self.tasks.youtube_transfer = Some(self.spawn_transfer(artifact));
    }

    if let Some(result) = take_ready(&mut self.tasks.youtube_transfer, interrupted) {
      self.youtube.apply_transfer(result);
    }

    if let Some(result) = take_ready(&mut self.tasks.audio_extract, interrupted) {
      let base = self.backend.base().clone();
      self.audio.apply_extract(&base, result);
    }

    if let Some(result) = take_ready(&mut self.tasks.audio_transfer, interrupted) {
      self.audio.apply_transfer(result);
    }

    if let Some(result) = take_ready(&mut self.tasks.frames_extract, interrupted) {
      self.frames.apply_extract(result);
    }

    if let Some(result) = take_ready(&mut self.tasks.frames_transfer, interrupted) {
      // A saved archive means the server folder is gone.
      if result.is_ok() {
        self.close_frame_preview();
      }
      self.frames.apply_transfer(result);
    }

    if let Some((file, result)) =
      take_ready(&mut self.tasks.frame_image, || (String::new(), Err("frame task dropped".to_string())))
    {
      let current = self.frame_preview.as_ref().map(|p| p.current_file().to_string());
      match result {
        Ok(image) if current.as_deref() == Some(file.as_str()) => {
          self.frame_image = Some((file, image));
          self.gfx.frame.clear();
        }
        Ok(_) => {}
        Err(e) => {
          warn!(file = %file, err = %e, "frames: preview image unavailable");
          self.set_error(format!("Could not load frame {}", file));
        }
      }
    }
  }
}

//! Headless commands: one workflow per invocation, no terminal UI.
//!
//! These drive the same tool state as the TUI, awaiting each step inline
//! instead of polling a task.

use anyhow::{Result, anyhow, bail};
use clap::Subcommand;
use clap_complete::Shell;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::MediaBackend;
use crate::artifact::{self, ArtifactState, RemoteArtifact, Saved};
use crate::error::ToolResult;
use crate::frames::ExtractionMode;
use crate::tools::{AudioTool, FrameTool, YouTubeTool};
use crate::workflow::{Notice, StatusView};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show a YouTube video's details, or download it (optionally clipped)
  Youtube {
    url: String,
    /// Clip start, e.g. 1:30
    #[arg(long)]
    start: Option<String>,
    /// Clip end, e.g. 2:45
    #[arg(long)]
    end: Option<String>,
    /// Only print video info, don't download
    #[arg(long)]
    info: bool,
  },
  /// Extract the audio track of a local video and save it
  Audio { video: PathBuf },
  /// Extract frames from a local video and save them as a zip archive
  Frames {
    video: PathBuf,
    #[arg(long, value_enum, default_value_t = ExtractionMode::NFrames)]
    mode: ExtractionMode,
    /// Frame count or step; ignored for all_frames
    #[arg(long)]
    value: Option<String>,
  },
  /// Print shell completions
  Completions { shell: Shell },
}

pub fn print_completions(shell: Shell, cmd: &mut clap::Command) {
  let name = cmd.get_name().to_string();
  clap_complete::generate(shell, cmd, name, &mut io::stdout());
}

/// Whatever the tool last told the user, as an error.
fn rejection(status: &StatusView) -> anyhow::Error {
  anyhow!(status.notice().map(Notice::text).unwrap_or("Request failed").to_string())
}

/// Print a success notice, or turn an error notice into `Err`.
fn finish(status: &StatusView) -> Result<()> {
  match status.notice() {
    Some(notice) if notice.is_error() => bail!("{}", notice.text()),
    Some(notice) => {
      println!("{}", notice.text());
      Ok(())
    }
    None => Ok(()),
  }
}

/// Set when the server kept its copy after the file was saved.
fn leftover_warning(saved: &Saved) -> Option<String> {
  (saved.artifact.state != ArtifactState::Deleted)
    .then(|| format!("warning: the server still holds {}", saved.artifact.download_name))
}

async fn save(backend: &dyn MediaBackend, artifact: RemoteArtifact, dir: &Path) -> ToolResult<Saved> {
  let saved = artifact::transfer(backend, artifact, dir).await;
  match &saved {
    Ok(saved) => {
      info!(path = %saved.path.display(), bytes = saved.bytes, state = ?saved.artifact.state, "cli: saved");
      if let Some(warning) = leftover_warning(saved) {
        eprintln!("{}", warning);
      }
    }
    Err(e) => eprintln!("{}", e),
  }
  saved
}

pub async fn run(command: Command, backend: &dyn MediaBackend, download_dir: &Path) -> Result<()> {
  match command {
    Command::Youtube { url, start, end, info } => {
      let mut tool = YouTubeTool::default();
      tool.url.set(url);
      tool.start.set(start.unwrap_or_default());
      tool.end.set(end.unwrap_or_default());
      if info {
        youtube_info(&mut tool, backend).await
      } else {
        youtube_download(&mut tool, backend, download_dir).await
      }
    }
    Command::Audio { video } => audio(video, backend, download_dir).await,
    Command::Frames { video, mode, value } => frames(video, mode, value, backend, download_dir).await,
    // Handled before a backend exists.
    Command::Completions { .. } => Ok(()),
  }
}

async fn youtube_info(tool: &mut YouTubeTool, backend: &dyn MediaBackend) -> Result<()> {
  let Some(url) = tool.begin_info() else { return Err(rejection(&tool.status)) };
  tool.apply_info(backend.video_info(&url).await);
  let Some(preview) = &tool.preview else { return Err(rejection(&tool.status)) };
  println!("{}", preview.title);
  for (label, value) in &preview.details {
    println!("  {:<10}{}", label, value);
  }
  if let Some(thumb) = &preview.thumbnail_url {
    println!("  {:<10}{}", "Thumbnail", thumb);
  }
  Ok(())
}

async fn youtube_download(tool: &mut YouTubeTool, backend: &dyn MediaBackend, dir: &Path) -> Result<()> {
  let Some(request) = tool.begin_download() else { return Err(rejection(&tool.status)) };
  let Some(artifact) = tool.apply_download(backend.download_video(request).await) else {
    return Err(rejection(&tool.status));
  };
  tool.apply_transfer(save(backend, artifact, dir).await);
  finish(&tool.status)
}

async fn audio(video: PathBuf, backend: &dyn MediaBackend, dir: &Path) -> Result<()> {
  let mut tool = AudioTool::default();
  tool.file.set(video.to_string_lossy());
  let Some(video) = tool.begin_extract() else { return Err(rejection(&tool.status)) };
  tool.apply_extract(backend.base(), backend.extract_audio(&video).await);
  let Some(preview) = &tool.preview else { return Err(rejection(&tool.status)) };
  println!("{} ({})", preview.file_label, preview.size_label);

  let Some(artifact) = tool.begin_download() else { return Err(rejection(&tool.status)) };
  tool.apply_transfer(save(backend, artifact, dir).await);
  finish(&tool.status)
}

async fn frames(
  video: PathBuf,
  mode: ExtractionMode,
  value: Option<String>,
  backend: &dyn MediaBackend,
  dir: &Path,
) -> Result<()> {
  let mut tool = FrameTool::default();
  tool.file.set(video.to_string_lossy());
  tool.set_mode(mode);
  if let Some(value) = value {
    tool.param.set(value);
  }
  let Some(req) = tool.begin_extract() else { return Err(rejection(&tool.status)) };
  tool.apply_extract(backend.extract_frames(&req.video, req.mode, req.param).await);
  let Some(grid) = &tool.result else { return Err(rejection(&tool.status)) };
  println!("{}", grid.count_label);

  let Some(artifact) = tool.begin_download() else { return Err(rejection(&tool.status)) };
  tool.apply_transfer(save(backend, artifact, dir).await);
  finish(&tool.status)
}

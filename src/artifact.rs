//! Server-held files produced by a workflow, and the one-shot transfer that
//! saves them locally and then asks the server to drop its copy.

use futures::StreamExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::api::{AudioReply, DownloadTicket, Endpoint, MediaBackend};
use crate::error::{ToolError, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
  Video,
  Audio,
  FrameArchive,
}

/// Created on a successful extract/download reply, Downloaded once the blob
/// is on disk, Deleted once the server confirms cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
  Created,
  Downloaded,
  Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArtifact {
  pub kind: ArtifactKind,
  /// Opaque server id (file id or frames folder).
  pub id: String,
  pub download_name: String,
  pub state: ArtifactState,
}

impl RemoteArtifact {
  fn created(kind: ArtifactKind, id: &str, download_name: Option<&str>) -> Self {
    let download_name = download_name.filter(|n| !n.is_empty()).unwrap_or(id).to_string();
    Self { kind, id: id.to_string(), download_name, state: ArtifactState::Created }
  }

  pub fn video(ticket: &DownloadTicket) -> Self {
    Self::created(ArtifactKind::Video, &ticket.file_id, ticket.download_name.as_deref())
  }

  pub fn audio(reply: &AudioReply) -> Self {
    Self::created(ArtifactKind::Audio, &reply.file_id, reply.download_name.as_deref())
  }

  pub fn frame_archive(folder: &str) -> Self {
    Self::created(ArtifactKind::FrameArchive, folder, Some(&format!("{}.zip", folder)))
  }

  pub fn fetch_endpoint(&self) -> Endpoint {
    match self.kind {
      ArtifactKind::Video => Endpoint::YouTubeFile(self.id.clone()),
      ArtifactKind::Audio => Endpoint::AudioFile(self.id.clone()),
      ArtifactKind::FrameArchive => Endpoint::FramesArchive(self.id.clone()),
    }
  }

  pub fn cleanup_endpoint(&self) -> Endpoint {
    match self.kind {
      ArtifactKind::Video => Endpoint::YouTubeDelete(self.id.clone()),
      ArtifactKind::Audio => Endpoint::AudioDelete(self.id.clone()),
      ArtifactKind::FrameArchive => Endpoint::FramesDelete(self.id.clone()),
    }
  }
}

/// A completed transfer.
#[derive(Debug)]
pub struct Saved {
  pub path: PathBuf,
  pub bytes: u64,
  pub artifact: RemoteArtifact,
}

/// Strip any directory components the server may have put in a download name.
fn safe_file_name(name: &str, fallback: &str) -> String {
  let leaf = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
  if leaf.is_empty() || leaf == "." || leaf == ".." { fallback.to_string() } else { leaf.to_string() }
}

/// Create `clip.mp3`, else `clip (1).mp3`, `clip (2).mp3`, … whichever is free.
/// `create_new` makes the claim atomic, so concurrent transfers never share a file.
async fn create_free_file(dir: &Path, name: &str) -> ToolResult<(PathBuf, File)> {
  let (stem, ext) = match name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
    _ => (name, String::new()),
  };
  let mut n = 0u32;
  loop {
    let candidate = if n == 0 { dir.join(name) } else { dir.join(format!("{} ({}){}", stem, n, ext)) };
    match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
      Ok(file) => return Ok((candidate, file)),
      Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
      Err(e) => return Err(ToolError::io(format!("Could not create {}", candidate.display()), e)),
    }
  }
}

/// Fetch the artifact, write it under `dir`, then issue exactly one cleanup call.
///
/// Cleanup is best-effort: its failure is logged and leaves the artifact in
/// `Downloaded`, but the transfer still succeeds because the file is saved.
/// If the fetch or the write fails, no cleanup is attempted so the user can retry.
pub async fn transfer(backend: &dyn MediaBackend, mut artifact: RemoteArtifact, dir: &Path) -> ToolResult<Saved> {
  let mut stream = backend.fetch_blob(artifact.fetch_endpoint()).await?;

  tokio::fs::create_dir_all(dir)
    .await
    .map_err(|e| ToolError::io(format!("Could not create {}", dir.display()), e))?;
  let (path, mut file) = create_free_file(dir, &safe_file_name(&artifact.download_name, &artifact.id)).await?;

  let mut bytes = 0u64;
  let written: ToolResult<()> = async {
    while let Some(chunk) = stream.next().await {
      let chunk = chunk?;
      file.write_all(&chunk).await.map_err(|e| ToolError::io(format!("Could not write {}", path.display()), e))?;
      bytes += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| ToolError::io(format!("Could not write {}", path.display()), e))
  }
  .await;
  if let Err(e) = written {
    drop(file);
    let _ = tokio::fs::remove_file(&path).await;
    return Err(e);
  }

  artifact.state = ArtifactState::Downloaded;
  info!(id = %artifact.id, path = %path.display(), bytes, "artifact: saved");

  match backend.delete(artifact.cleanup_endpoint()).await {
    Ok(reply) if reply.succeeded() => {
      info!(id = %artifact.id, reply = %reply.summary(), "artifact: server cleanup");
      artifact.state = ArtifactState::Deleted;
    }
    Ok(reply) => warn!(id = %artifact.id, reply = %reply.summary(), "artifact: server refused cleanup"),
    Err(e) => warn!(id = %artifact.id, err = %e, "artifact: could not delete server copy"),
  }

  Ok(Saved { path, bytes, artifact })
}

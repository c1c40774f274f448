use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::constants::constants;

/// A user-defined tool that has no built-in workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenericTool {
  pub name: String,
  #[serde(default)]
  pub description: String,
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Config {
  pub server_url: Option<String>,
  pub download_dir: Option<PathBuf>,
  pub theme_name: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub extra_tools: Vec<GenericTool>,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "mediadesk")
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match toml::from_str(&content) {
          Ok(config) => return config,
          Err(e) => warn!(path = %config_file.display(), err = %e, "config: ignoring unreadable prefs"),
        }
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// Server base URL, falling back to the compiled-in default.
  pub fn server_url(&self) -> String {
    self.server_url.clone().unwrap_or_else(|| constants().default_server_url.clone())
  }

  /// Where saved artifacts land: configured dir, else the user's Downloads folder, else `.`.
  pub fn download_dir(&self) -> PathBuf {
    if let Some(ref dir) = self.download_dir {
      return dir.clone();
    }
    UserDirs::new()
      .and_then(|dirs| dirs.download_dir().map(|d| d.to_path_buf()))
      .unwrap_or_else(|| PathBuf::from("."))
  }
}

/// Directory for log files (the TUI owns stdout, so logs go to disk).
pub fn log_dir() -> PathBuf {
  project_dirs().map(|d| d.data_local_dir().join("logs")).unwrap_or_else(|| std::env::temp_dir().join("mediadesk"))
}

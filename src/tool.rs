//! The tool panel: which tool occupies the selected slot and which remain
//! in the unselected list.

use serde::Deserialize;
use tracing::debug;

use crate::config::GenericTool;
use crate::constants::ToolEntry;

/// What a tool can do once selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ToolKind {
  AudioExtractor,
  FrameGrabber,
  YouTubeDownloader,
  Generic,
}

/// How a tool is drawn. A tool in the unselected list always has the
/// default appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolChrome {
  pub highlighted: bool,
  pub show_description: bool,
  pub show_close: bool,
}

impl ToolChrome {
  fn selected() -> Self {
    Self { highlighted: true, show_description: true, show_close: true }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
  pub name: String,
  pub description: String,
  pub kind: ToolKind,
  pub chrome: ToolChrome,
}

impl Tool {
  pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ToolKind) -> Self {
    Self { name: name.into(), description: description.into(), kind, chrome: ToolChrome::default() }
  }

  /// Body text shown for tools without a built-in workflow.
  pub fn placeholder_text(&self) -> String {
    format!(
      "Configuration options for {} will appear here. \
       This area will contain buttons, inputs, and sliders to control the tool's functionality.",
      self.name
    )
  }
}

impl From<&ToolEntry> for Tool {
  fn from(entry: &ToolEntry) -> Self {
    Tool::new(&entry.name, &entry.description, entry.kind)
  }
}

impl From<&GenericTool> for Tool {
  fn from(entry: &GenericTool) -> Self {
    let description =
      if entry.description.is_empty() { "Tool description will appear here" } else { entry.description.as_str() };
    Tool::new(&entry.name, description, ToolKind::Generic)
  }
}

/// Outcome of `ToolPanel::select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  /// The tool was already selected; nothing changed.
  Unchanged,
  /// No tool by that name exists on the panel.
  Unknown,
  /// The tool now occupies the slot; `previous` was moved back to the list.
  Selected { previous: Option<String> },
}

/// Exclusive selection over a set of uniquely named tools.
#[derive(Debug, Clone, Default)]
pub struct ToolPanel {
  unselected: Vec<Tool>,
  selected: Option<Tool>,
}

impl ToolPanel {
  /// Build a panel; later tools whose name repeats an earlier one are dropped.
  pub fn new(tools: impl IntoIterator<Item = Tool>) -> Self {
    let mut unselected: Vec<Tool> = Vec::new();
    for mut tool in tools {
      if unselected.iter().any(|t| t.name == tool.name) {
        debug!(name = %tool.name, "panel: skipping duplicate tool name");
        continue;
      }
      tool.chrome = ToolChrome::default();
      unselected.push(tool);
    }
    Self { unselected, selected: None }
  }

  pub fn unselected(&self) -> &[Tool] {
    &self.unselected
  }

  pub fn selected(&self) -> Option<&Tool> {
    self.selected.as_ref()
  }

  pub fn is_selected(&self, name: &str) -> bool {
    self.selected.as_ref().is_some_and(|t| t.name == name)
  }

  /// The preview region is visible exactly when a tool is selected; its title is the tool name.
  pub fn preview_title(&self) -> Option<&str> {
    self.selected.as_ref().map(|t| t.name.as_str())
  }

  pub fn select(&mut self, name: &str) -> Selection {
    if self.is_selected(name) {
      return Selection::Unchanged;
    }
    let Some(pos) = self.unselected.iter().position(|t| t.name == name) else {
      return Selection::Unknown;
    };

    let previous = self.restore_selected();
    let mut tool = self.unselected.remove(pos);
    tool.chrome = ToolChrome::selected();
    debug!(tool = %tool.name, previous = ?previous, "panel: select");
    self.selected = Some(tool);
    Selection::Selected { previous }
  }

  /// Put the selected tool back in the list. Returns its name, or `None` if the slot was empty.
  pub fn close(&mut self) -> Option<String> {
    let closed = self.restore_selected();
    if let Some(ref name) = closed {
      debug!(tool = %name, "panel: close");
    }
    closed
  }

  fn restore_selected(&mut self) -> Option<String> {
    let mut tool = self.selected.take()?;
    tool.chrome = ToolChrome::default();
    let name = tool.name.clone();
    self.unselected.push(tool);
    Some(name)
  }
}

//! Shared view-model for a tool's request lifecycle.
//!
//! Each tool owns one `StatusView`. Workflows drive it through the phases
//! below; the renderer reads it to decide whether to draw a spinner, an
//! inline notice, or enabled buttons.
//!
//! ```text
//! Idle ─validate─▶ Idle (error)
//!   └────────────▶ Loading ─▶ ErrorShown
//!                          └▶ ResultShown ─▶ Downloading ─▶ Idle
//! ```

use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
  #[default]
  Idle,
  Loading,
  ErrorShown,
  ResultShown,
  Downloading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Error(String),
  Success(String),
}

impl Notice {
  pub fn text(&self) -> &str {
    match self {
      Notice::Error(s) | Notice::Success(s) => s,
    }
  }

  pub fn is_error(&self) -> bool {
    matches!(self, Notice::Error(_))
  }
}

#[derive(Debug, Clone, Default)]
pub struct StatusView {
  phase: Phase,
  loading_label: &'static str,
  notice: Option<Notice>,
}

impl StatusView {
  #[cfg(test)]
  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  /// Spinner caption while a request or transfer is in flight.
  pub fn loading(&self) -> Option<&'static str> {
    matches!(self.phase, Phase::Loading | Phase::Downloading).then_some(self.loading_label)
  }

  /// Request controls are disabled only while the tool's request is outstanding.
  pub fn controls_enabled(&self) -> bool {
    self.phase != Phase::Loading
  }

  pub fn is_transferring(&self) -> bool {
    self.phase == Phase::Downloading
  }

  /// Validation failed: show the message, send nothing.
  pub fn reject(&mut self, msg: impl Into<String>) {
    let msg = msg.into();
    debug!(msg = %msg, "workflow: input rejected");
    self.notice = Some(Notice::Error(msg));
  }

  /// Request issued: spinner on, notice cleared, controls disabled.
  pub fn begin(&mut self, label: &'static str) {
    self.phase = Phase::Loading;
    self.loading_label = label;
    self.notice = None;
  }

  pub fn fail(&mut self, msg: impl Into<String>) {
    self.phase = Phase::ErrorShown;
    self.notice = Some(Notice::Error(msg.into()));
  }

  /// Response rendered; `notice` is an optional success line shown alongside it.
  pub fn show_result(&mut self, notice: Option<String>) {
    self.phase = Phase::ResultShown;
    self.notice = notice.map(Notice::Success);
  }

  pub fn begin_transfer(&mut self, label: &'static str) {
    self.phase = Phase::Downloading;
    self.loading_label = label;
  }

  pub fn finish_transfer(&mut self, outcome: Result<String, String>) {
    self.phase = Phase::Idle;
    self.notice = Some(match outcome {
      Ok(msg) => Notice::Success(msg),
      Err(msg) => Notice::Error(msg),
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reject_keeps_phase_and_shows_error() {
    let mut status = StatusView::default();
    status.reject("Please select a video file");
    assert_eq!(status.phase(), Phase::Idle);
    assert_eq!(status.notice(), Some(&Notice::Error("Please select a video file".into())));
    assert!(status.controls_enabled());
    assert!(status.loading().is_none());
  }

  #[test]
  fn begin_clears_notice_and_disables_controls() {
    let mut status = StatusView::default();
    status.reject("old");
    status.begin("Extracting audio...");
    assert!(status.notice().is_none());
    assert!(!status.controls_enabled());
    assert_eq!(status.loading(), Some("Extracting audio..."));
  }

  #[test]
  fn fail_reenables_controls() {
    let mut status = StatusView::default();
    status.begin("Processing...");
    status.fail("boom");
    assert_eq!(status.phase(), Phase::ErrorShown);
    assert!(status.controls_enabled());
    assert!(status.loading().is_none());
    assert!(status.notice().unwrap().is_error());
  }

  #[test]
  fn transfer_cycle_returns_to_idle() {
    let mut status = StatusView::default();
    status.begin("Extracting frames...");
    status.show_result(None);
    assert_eq!(status.phase(), Phase::ResultShown);

    status.begin_transfer("Saving...");
    assert!(status.is_transferring());
    assert!(status.controls_enabled());
    assert_eq!(status.loading(), Some("Saving..."));

    status.finish_transfer(Ok("Frames downloaded successfully!".into()));
    assert_eq!(status.phase(), Phase::Idle);
    assert_eq!(status.notice().unwrap().text(), "Frames downloaded successfully!");
  }
}

use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Focus};
use crate::frames::ExtractionMode;
use crate::graphics::ImageWidget;
use crate::theme::Theme;
use crate::tool::{Tool, ToolKind};
use crate::tools::audio_extractor::AudioPreview;
use crate::tools::frame_grabber::FrameGrid;
use crate::tools::youtube_downloader::VideoPreview;
use crate::tools::{Control, TextField};
use crate::workflow::{Notice, StatusView};

/// Width of the label column in front of each control.
const LABEL_W: u16 = 22;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn spinner_frame(elapsed: Duration) -> &'static str {
  SPINNER[(elapsed.as_millis() / 100) as usize % SPINNER.len()]
}

/// Scroll `field` so the cursor stays inside `width` columns. Returns the
/// visible slice and the cursor column within it.
fn visible_text(field: &mut TextField, width: usize) -> (String, usize) {
  if width == 0 {
    return (String::new(), 0);
  }
  let cursor_col = display_width(&field.value, field.cursor);
  if cursor_col < field.scroll {
    field.scroll = cursor_col;
  } else if cursor_col >= field.scroll + width {
    field.scroll = cursor_col.saturating_sub(width) + 1;
  }

  let scroll = field.scroll;
  let visible: String = field
    .value
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + width)
    .map(|(_, _, c)| c)
    .collect();
  (visible, cursor_col - scroll)
}

fn rounded(theme: &Theme, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(color))
}

// --- Components ---

/// The selected slot: name, description and close hint, or a prompt when empty.
pub fn selected_slot_lines(tool: Option<&Tool>, theme: &Theme) -> Vec<Line<'static>> {
  let Some(tool) = tool else {
    return vec![Line::from(Span::styled("No tool selected", Style::default().fg(theme.muted)))];
  };
  let name_style = if tool.chrome.highlighted {
    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.fg)
  };
  let mut lines = vec![Line::from(Span::styled(tool.name.clone(), name_style))];
  if tool.chrome.show_description {
    lines.push(Line::from(Span::styled(tool.description.clone(), Style::default().fg(theme.fg))));
  }
  if tool.chrome.show_close {
    lines.push(Line::from(vec![
      Span::styled(" ^x ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(" Close", Style::default().fg(theme.muted)),
    ]));
  }
  lines
}

/// Spinner while loading, otherwise the tool's notice, otherwise nothing.
pub fn status_line(status: &StatusView, elapsed: Duration, theme: &Theme) -> Option<Line<'static>> {
  if let Some(label) = status.loading() {
    return Some(Line::from(Span::styled(
      format!("{} {}", spinner_frame(elapsed), label),
      Style::default().fg(theme.status),
    )));
  }
  status.notice().map(|notice| notice_line(notice, theme))
}

pub fn notice_line(notice: &Notice, theme: &Theme) -> Line<'static> {
  match notice {
    Notice::Error(msg) => Line::from(Span::styled(format!("⚠  {}", msg), Style::default().fg(theme.error))),
    Notice::Success(msg) => Line::from(Span::styled(format!("✓ {}", msg), Style::default().fg(theme.success))),
  }
}

fn detail_line(label: &str, value: &str, width: usize, theme: &Theme) -> Line<'static> {
  let label = format!("{:<10}", label);
  let value_w = width.saturating_sub(label.chars().count());
  Line::from(vec![
    Span::styled(label, Style::default().fg(theme.muted)),
    Span::styled(truncate_str(value, value_w), Style::default().fg(theme.fg)),
  ])
}

pub fn video_lines(preview: &VideoPreview, width: usize, theme: &Theme) -> Vec<Line<'static>> {
  let mut lines = vec![
    Line::from(Span::styled(
      truncate_str(&preview.title, width),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
  ];
  lines.extend(preview.details.iter().map(|(label, value)| detail_line(label, value, width, theme)));
  lines
}

pub fn audio_lines(preview: &AudioPreview, width: usize, theme: &Theme) -> Vec<Line<'static>> {
  vec![
    detail_line("File", &preview.file_label, width, theme),
    detail_line("Size", &preview.size_label, width, theme),
    Line::from(""),
    Line::from(Span::styled("Source", Style::default().fg(theme.muted))),
    Line::from(Span::styled(
      truncate_str(preview.player_source.as_str(), width),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )),
  ]
}

/// Frame names laid out in columns, the cursor cell highlighted.
pub fn frame_grid_lines(
  grid: &FrameGrid,
  cursor: usize,
  focused: bool,
  width: usize,
  theme: &Theme,
) -> Vec<Line<'static>> {
  let cell_w = grid.files.iter().map(|f| f.chars().count()).max().unwrap_or(0) + 2;
  let cols = (width / cell_w.max(1)).max(1);
  grid
    .files
    .chunks(cols)
    .enumerate()
    .map(|(row, names)| {
      let spans: Vec<Span> = names
        .iter()
        .enumerate()
        .map(|(col, name)| {
          let text = format!(" {:<w$} ", name, w = cell_w.saturating_sub(2));
          let style = if row * cols + col != cursor {
            Style::default().fg(theme.fg)
          } else if focused {
            Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
          } else {
            Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED)
          };
          Span::styled(text, style)
        })
        .collect();
      Line::from(spans)
    })
    .collect()
}

fn control_label(control: Control, mode: ExtractionMode) -> &'static str {
  match control {
    Control::Url => "YouTube URL",
    Control::StartTime => "Start (optional)",
    Control::EndTime => "End (optional)",
    Control::VideoFile => "Video file",
    Control::Mode => "Extraction mode",
    Control::Param => mode.param_label().unwrap_or("Value"),
    Control::Frames => "Frames",
    Control::ClearFile | Control::Extract | Control::Download => "",
  }
}

fn button_text(kind: ToolKind, control: Control) -> &'static str {
  match (kind, control) {
    (_, Control::ClearFile) => "Clear file",
    (ToolKind::YouTubeDownloader, Control::Extract) => "Get Video Info",
    (ToolKind::YouTubeDownloader, Control::Download) => "Download Video",
    (ToolKind::AudioExtractor, Control::Extract) => "Extract Audio",
    (ToolKind::AudioExtractor, Control::Download) => "Download Audio",
    (ToolKind::FrameGrabber, Control::Extract) => "Extract Frames",
    (ToolKind::FrameGrabber, Control::Download) => "Download All Frames",
    _ => "",
  }
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
      .areas(frame.area());

  render_header(frame, theme, header_area);

  let [left_area, right_area] =
    Layout::horizontal([Constraint::Percentage(32), Constraint::Percentage(68)]).areas(main_area);
  render_tools(frame, app, left_area);
  if app.panel.preview_title().is_some() {
    render_panel(frame, app, right_area);
  } else {
    render_welcome(frame, theme, right_area);
  }

  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if app.frame_preview.is_some() {
    render_frame_preview(frame, app, main_area);
  }
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let title_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
  let left = Line::from(Span::styled(" ▶ mediadesk ", title_style));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(
      "▶  Welcome to mediadesk",
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled("Grab videos, audio and frames from your media server.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Pick a tool on the left and press Enter.", Style::default().fg(theme.muted))),
  ];
  let paragraph =
    Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(rounded(theme, false));
  frame.render_widget(paragraph, area);
}

fn render_tools(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let slot_h = if app.panel.selected().is_some() { 6 } else { 3 };
  let [slot_area, list_area] = Layout::vertical([Constraint::Length(slot_h), Constraint::Min(3)]).areas(area);

  let slot = Paragraph::new(selected_slot_lines(app.panel.selected(), theme)).wrap(Wrap { trim: true }).block(
    rounded(theme, false)
      .title(" Selected ")
      .title_style(Style::default().fg(theme.muted))
      .padding(Padding::horizontal(1)),
  );
  frame.render_widget(slot, slot_area);

  let inner_w = list_area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = app
    .panel
    .unselected()
    .iter()
    .enumerate()
    .map(|(i, tool)| {
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      ListItem::new(Line::from(Span::styled(truncate_str(&tool.name, inner_w), Style::default().fg(theme.fg)))).bg(bg)
    })
    .collect();

  let focused = app.focus == Focus::Tools;
  let highlight = if focused {
    Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.accent)
  };
  let list = List::new(items)
    .block(
      rounded(theme, focused)
        .title(" Tools ")
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(highlight);

  frame.render_stateful_widget(list, list_area, &mut app.list_state);
}

fn render_panel(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let Some(tool) = app.panel.selected().cloned() else { return };

  let block = rounded(theme, app.focus == Focus::Panel)
    .title(format!(" {} ", tool.name))
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  if tool.kind == ToolKind::Generic {
    let text =
      Paragraph::new(tool.placeholder_text()).style(Style::default().fg(theme.muted)).wrap(Wrap { trim: true });
    frame.render_widget(text, inner);
    return;
  }

  let controls = app.controls();
  let rows = controls.iter().filter(|c| **c != Control::Frames).count() as u16;
  let [controls_area, status_area, result_area] =
    Layout::vertical([Constraint::Length(rows + 1), Constraint::Length(2), Constraint::Min(0)]).areas(inner);

  render_controls(frame, app, tool.kind, controls_area);

  let elapsed = app.started_at.elapsed();
  if let Some(line) = app.status(tool.kind).and_then(|s| status_line(s, elapsed, theme)) {
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), status_area);
  }

  match tool.kind {
    ToolKind::YouTubeDownloader => render_video_result(frame, app, result_area),
    ToolKind::AudioExtractor => {
      if let Some(preview) = &app.audio.preview {
        let lines = audio_lines(preview, result_area.width as usize, theme);
        frame.render_widget(Paragraph::new(lines), result_area);
      }
    }
    ToolKind::FrameGrabber => render_frame_grid(frame, app, result_area),
    ToolKind::Generic => {}
  }
}

fn render_controls(frame: &mut Frame, app: &mut App, kind: ToolKind, area: Rect) {
  let theme = app.theme();
  let focused = if app.focus == Focus::Panel { app.focused_control() } else { None };
  let enabled = app.status(kind).is_none_or(|s| s.controls_enabled());
  let transferring = app.status(kind).is_some_and(|s| s.is_transferring());
  let mode = app.frames.mode;

  let mut row = 0u16;
  for control in app.controls() {
    if control == Control::Frames || row >= area.height {
      continue;
    }
    let rect = Rect { y: area.y + row, height: 1, ..area };
    row += 1;
    let is_focused = focused == Some(control);
    let label_style = if is_focused { Style::default().fg(theme.accent) } else { Style::default().fg(theme.muted) };
    let [label_area, value_area] = Layout::horizontal([Constraint::Length(LABEL_W), Constraint::Min(1)]).areas(rect);

    if control.is_text() {
      frame.render_widget(Span::styled(control_label(control, mode), label_style), label_area);
      let width = value_area.width as usize;
      let Some(field) = app.field_mut(control) else { continue };
      let (visible, cursor_col) = visible_text(field, width);
      let placeholder = field.value.is_empty();
      let text = if placeholder && control == Control::VideoFile { "path/to/video.mp4".to_string() } else { visible };
      let style = if placeholder {
        Style::default().fg(theme.muted).bg(theme.stripe_bg)
      } else {
        Style::default().fg(theme.fg).bg(theme.stripe_bg)
      };
      frame.render_widget(Paragraph::new(text).style(style), value_area);
      if is_focused {
        frame.set_cursor_position((value_area.x + cursor_col as u16, value_area.y));
      }
    } else if control == Control::Mode {
      frame.render_widget(Span::styled(control_label(control, mode), label_style), label_area);
      let style = if is_focused {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg)
      } else {
        Style::default().fg(theme.fg)
      };
      frame.render_widget(Span::styled(format!("◀ {} ▶", mode.label()), style), value_area);
    } else {
      let disabled = match control {
        Control::Download => transferring,
        _ => !enabled || transferring,
      };
      let style = if disabled {
        Style::default().fg(theme.muted)
      } else if is_focused {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(theme.accent)
      };
      frame.render_widget(Span::styled(format!("[ {} ]", button_text(kind, control)), style), value_area);
    }
  }
}

fn render_video_result(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let Some(preview) = &app.youtube.preview else { return };
  let [thumb_area, info_area] =
    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

  let lines = video_lines(preview, info_area.width.saturating_sub(1) as usize, theme);
  let text_area = Rect { x: info_area.x + 1, width: info_area.width.saturating_sub(1), ..info_area };
  frame.render_widget(Paragraph::new(lines), text_area);

  if let Some(image) = &app.youtube.thumbnail {
    let key = preview.thumbnail_url.as_deref().unwrap_or(&preview.title);
    let fitted = app.gfx.thumbnail.fitted(key, image, thumb_area, app.display_mode);
    frame.render_widget(ImageWidget { image: fitted, display_mode: app.display_mode }, thumb_area);
  } else if preview.thumbnail_url.is_some() {
    let hint =
      Paragraph::new("Loading thumbnail…").style(Style::default().fg(theme.muted)).alignment(Alignment::Center);
    frame.render_widget(hint, thumb_area);
  }
}

fn render_frame_grid(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let Some(grid) = &app.frames.result else { return };
  let [count_area, grid_area] = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
  frame.render_widget(
    Span::styled(grid.count_label.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    count_area,
  );

  let focused = app.focus == Focus::Panel && app.focused_control() == Some(Control::Frames);
  let lines = frame_grid_lines(grid, app.frames.grid_cursor, focused, grid_area.width as usize, theme);
  let cell_w = grid.files.iter().map(|f| f.chars().count()).max().unwrap_or(0) + 2;
  let cols = (grid_area.width as usize / cell_w.max(1)).max(1);
  let cursor_row = (app.frames.grid_cursor / cols) as u16;
  let offset = cursor_row.saturating_sub(grid_area.height.saturating_sub(1));
  frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), grid_area);
}

fn render_frame_preview(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let Some(preview) = &app.frame_preview else { return };

  let [_, mid, _] =
    Layout::vertical([Constraint::Percentage(8), Constraint::Percentage(84), Constraint::Percentage(8)]).areas(area);
  let [_, modal, _] =
    Layout::horizontal([Constraint::Percentage(8), Constraint::Percentage(84), Constraint::Percentage(8)]).areas(mid);

  frame.render_widget(Clear, modal);
  let title = Line::from(vec![
    Span::styled(" Frame Preview ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("[{}] ", app.display_mode.label().to_lowercase()), Style::default().fg(theme.muted)),
  ]);
  let block = rounded(theme, true)
    .title(title)
    .title_bottom(Line::from(format!(" {} ", preview.caption())).centered())
    .style(Style::default().bg(theme.bg));
  let inner = block.inner(modal);
  frame.render_widget(block, modal);

  match &app.frame_image {
    Some((file, image)) if file == preview.current_file() => {
      let fitted = app.gfx.frame.fitted(file, image, inner, app.display_mode);
      frame.render_widget(ImageWidget { image: fitted, display_mode: app.display_mode }, inner);
    }
    _ => {
      let text = format!("{} Loading frame…", spinner_frame(app.started_at.elapsed()));
      let y = inner.y + inner.height / 2;
      frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(theme.muted)).alignment(Alignment::Center),
        Rect { y, height: 1, ..inner },
      );
    }
  }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(label) = app.active_kind().and_then(|k| app.status(k)).and_then(StatusView::loading) {
    (format!(" {} {}", spinner_frame(app.started_at.elapsed()), label), Style::default().fg(theme.status))
  } else {
    (
      format!(" Ready · {} · saving to {}", app.server_label(), app.download_dir.display()),
      Style::default().fg(theme.muted),
    )
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.focus {
    Focus::Tools => {
      let mut k = vec![("Enter", "Select"), ("j/k", "Navigate")];
      if app.panel.selected().is_some() {
        k.push(("Tab", "Panel"));
        k.push(("Esc", "Close"));
      } else {
        k.push(("Esc", "Quit"));
      }
      k.push(("^t", "Theme"));
      k
    }
    Focus::Panel => {
      let mut k = vec![("Tab", "Next"), ("Enter", "Activate")];
      match app.focused_control() {
        Some(Control::Mode) => k.push(("←/→", "Mode")),
        Some(Control::Frames) => k.push(("←/→ Space", "Pick / Preview")),
        _ => {}
      }
      if app.active_kind().is_some_and(|k| k != ToolKind::Generic) {
        k.push(("^e", "Run"));
      }
      if app.download_ready() {
        k.push(("^d", "Download"));
      }
      k.push(("^x", "Close"));
      k.push(("Esc", "Tools"));
      k
    }
    Focus::FramePreview => vec![("←/→", "Navigate"), ("Esc", "Close"), ("^t", "Theme")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{AudioReply, ServerBase};
  use crate::theme::THEMES;

  fn theme() -> &'static Theme {
    &THEMES[0]
  }

  fn text(lines: &[Line]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
  }

  #[test]
  fn truncation_appends_ellipsis() {
    assert_eq!(truncate_str("abcdef", 4), "abc…");
    assert_eq!(truncate_str("abc", 4), "abc");
  }

  #[test]
  fn visible_text_follows_cursor() {
    let mut field = TextField::with_value("0123456789");
    let (visible, col) = visible_text(&mut field, 4);
    assert_eq!(visible, "789");
    assert_eq!(col, 3);
    field.cursor = 0;
    let (visible, col) = visible_text(&mut field, 4);
    assert_eq!(visible, "0123");
    assert_eq!(col, 0);
  }

  #[test]
  fn empty_slot_prompts() {
    assert_eq!(text(&selected_slot_lines(None, theme())), vec!["No tool selected"]);
  }

  #[test]
  fn unselected_chrome_hides_extras() {
    let tool = Tool::new("Audio Extractor", "Pull the soundtrack", ToolKind::AudioExtractor);
    assert_eq!(text(&selected_slot_lines(Some(&tool), theme())), vec!["Audio Extractor"]);
  }

  #[test]
  fn notice_colours_follow_kind() {
    let err = notice_line(&Notice::Error("bad".into()), theme());
    assert_eq!(err.spans[0].style.fg, Some(theme().error));
    let ok = notice_line(&Notice::Success("done".into()), theme());
    assert_eq!(ok.spans[0].style.fg, Some(theme().success));
    assert!(ok.to_string().ends_with("done"));
  }

  #[test]
  fn audio_result_shows_size_and_source() {
    let base = ServerBase::parse("http://127.0.0.1:5000").unwrap();
    let reply = AudioReply { file_id: "abc".into(), download_name: Some("clip.mp3".into()), size: 204_800 };
    let lines = text(&audio_lines(&AudioPreview::from_reply(&base, &reply), 80, theme()));
    assert_eq!(lines[0].trim_end(), "File      clip.mp3");
    assert_eq!(lines[1].trim_end(), "Size      200.0 KB");
    assert_eq!(lines[4], "http://127.0.0.1:5000/api/audio/get-file/abc");
  }

  #[test]
  fn frame_grid_wraps_into_columns() {
    let grid = FrameGrid {
      count_label: "3 frames extracted".into(),
      folder: "f".into(),
      files: vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()],
    };
    let lines = frame_grid_lines(&grid, 2, true, 14, theme());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].spans[0].style.bg, Some(theme().highlight_bg));
    assert_eq!(lines[0].spans[0].style.bg, None);
  }

  #[test]
  fn spinner_cycles() {
    assert_eq!(spinner_frame(Duration::from_millis(0)), SPINNER[0]);
    assert_eq!(spinner_frame(Duration::from_millis(1050)), SPINNER[0]);
    assert_eq!(spinner_frame(Duration::from_millis(250)), SPINNER[2]);
  }
}

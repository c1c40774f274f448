use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::debug;

use crate::app::{App, Focus};
use crate::tools::Control;

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

  if ctrl && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if ctrl && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  match app.focus {
    Focus::Tools => handle_tools_key(app, key),
    Focus::Panel => handle_panel_key(app, key),
    Focus::FramePreview => handle_preview_key(app, key),
  }
}

fn handle_tools_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.move_tool_cursor(1),
    KeyCode::Up | KeyCode::Char('k') => app.move_tool_cursor(-1),
    KeyCode::Enter => app.select_highlighted(),
    KeyCode::Tab | KeyCode::Right => {
      if app.panel.selected().is_some() {
        app.focus = Focus::Panel;
      }
    }
    KeyCode::Esc => {
      if app.panel.selected().is_some() {
        app.close_tool();
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

fn handle_panel_key(app: &mut App, key: event::KeyEvent) {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  if ctrl {
    match key.code {
      KeyCode::Char('x') => app.close_tool(),
      KeyCode::Char('d') => app.trigger_download(),
      KeyCode::Char('e') => app.trigger_extract(),
      _ => {}
    }
    return;
  }

  match key.code {
    KeyCode::Esc => {
      debug!("ui: focus tools");
      app.focus = Focus::Tools;
      return;
    }
    KeyCode::Tab | KeyCode::Down => {
      app.move_control(1);
      return;
    }
    KeyCode::BackTab | KeyCode::Up => {
      app.move_control(-1);
      return;
    }
    KeyCode::Enter => {
      app.activate();
      return;
    }
    _ => {}
  }

  match app.focused_control() {
    Some(Control::Mode) => match key.code {
      KeyCode::Left | KeyCode::Char('h') => app.frames.cycle_mode(-1),
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => app.frames.cycle_mode(1),
      _ => {}
    },
    Some(Control::Frames) => match key.code {
      KeyCode::Left | KeyCode::Char('h') => app.frames.move_cursor(-1),
      KeyCode::Right | KeyCode::Char('l') => app.frames.move_cursor(1),
      KeyCode::Char(' ') => app.open_frame_preview(),
      _ => {}
    },
    Some(control) if control.is_button() => {
      if key.code == KeyCode::Char(' ') {
        app.activate();
      }
    }
    _ => {
      if let Some(field) = app.focused_field_mut() {
        field.handle_key(key.code);
      }
    }
  }
}

fn handle_preview_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') => app.navigate_frame(-1),
    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('j') | KeyCode::Char(' ') => app.navigate_frame(1),
    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_frame_preview(),
    _ => {}
  }
}

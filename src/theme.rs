use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub success: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 4] = [
  Theme {
    name: "Slate",
    bg: Color::Rgb(24, 26, 32),
    fg: Color::Rgb(220, 223, 228),
    accent: Color::Rgb(97, 175, 239),
    muted: Color::Rgb(120, 126, 138),
    border: Color::Rgb(62, 68, 81),
    highlight_fg: Color::Rgb(24, 26, 32),
    highlight_bg: Color::Rgb(97, 175, 239),
    stripe_bg: Color::Rgb(30, 33, 40),
    status: Color::Rgb(229, 192, 123),
    error: Color::Rgb(224, 108, 117),
    success: Color::Rgb(152, 195, 121),
    key_fg: Color::Rgb(24, 26, 32),
    key_bg: Color::Rgb(120, 126, 138),
  },
  Theme {
    name: "Dusk",
    bg: Color::Rgb(35, 28, 46),
    fg: Color::Rgb(231, 220, 240),
    accent: Color::Rgb(214, 142, 214),
    muted: Color::Rgb(140, 124, 158),
    border: Color::Rgb(78, 64, 96),
    highlight_fg: Color::Rgb(35, 28, 46),
    highlight_bg: Color::Rgb(214, 142, 214),
    stripe_bg: Color::Rgb(42, 34, 55),
    status: Color::Rgb(240, 190, 140),
    error: Color::Rgb(240, 110, 130),
    success: Color::Rgb(150, 210, 170),
    key_fg: Color::Rgb(35, 28, 46),
    key_bg: Color::Rgb(140, 124, 158),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 248, 242),
    fg: Color::Rgb(50, 50, 56),
    accent: Color::Rgb(32, 110, 180),
    muted: Color::Rgb(130, 130, 136),
    border: Color::Rgb(200, 196, 186),
    highlight_fg: Color::Rgb(250, 248, 242),
    highlight_bg: Color::Rgb(32, 110, 180),
    stripe_bg: Color::Rgb(242, 239, 230),
    status: Color::Rgb(170, 110, 20),
    error: Color::Rgb(190, 40, 50),
    success: Color::Rgb(40, 130, 60),
    key_fg: Color::Rgb(250, 248, 242),
    key_bg: Color::Rgb(130, 130, 136),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::Gray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Yellow,
    error: Color::Red,
    success: Color::Green,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme called `name`, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}

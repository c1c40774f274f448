use anyhow::{Context, Result, bail};
use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};
use reqwest::Client;

use crate::display::DisplayMode;

// --- Loading ---

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
  image::load_from_memory(bytes).context("Failed to decode image from memory")
}

/// Fetch and decode a remote image (video thumbnails live on a CDN, not the media server).
pub async fn fetch_image(client: &Client, url: &str) -> Result<DynamicImage> {
  let response = client.get(url).send().await.with_context(|| format!("Failed to fetch image from {}", url))?;
  if !response.status().is_success() {
    bail!("Image request to {} returned {}", url, response.status());
  }
  let bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", url))?;
  decode_image(&bytes).with_context(|| format!("Bad image at {}", url))
}

// --- Sizing ---

/// Scale `image` to fit `area` with its aspect ratio kept, accounting for
/// terminal cells being about twice as tall as they are wide.
pub fn fit_to_area(image: &DynamicImage, area: Rect, mode: DisplayMode) -> DynamicImage {
  let w = (area.width as u32).max(1);
  let h = (area.height as u32).max(1);
  // Fit into a grid of square "pixels": one column wide, half a row tall.
  let fitted = image.resize(w, h * 2, FilterType::Triangle);
  let rows = (fitted.height() * mode.pixel_rows_per_cell()).div_ceil(2).max(1);
  if rows == fitted.height() {
    fitted
  } else {
    fitted.resize_exact(fitted.width().max(1), rows, FilterType::Triangle)
  }
}

/// Last resized image, keyed by what it shows and the area it was fitted to.
#[derive(Default)]
pub struct ImageCache {
  key: Option<(String, u16, u16)>,
  image: Option<DynamicImage>,
}

impl ImageCache {
  pub fn fitted(&mut self, id: &str, source: &DynamicImage, area: Rect, mode: DisplayMode) -> &DynamicImage {
    let key = (id.to_string(), area.width, area.height);
    if self.key.as_ref() != Some(&key) {
      self.key = Some(key);
      self.image = None;
    }
    self.image.get_or_insert_with(|| fit_to_area(source, area, mode))
  }

  pub fn clear(&mut self) {
    self.key = None;
    self.image = None;
  }
}

// --- Image Widget ---

/// Draws an already-fitted image centred in the area.
pub struct ImageWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_CHARS: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

impl Widget for ImageWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_direct(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
    }
  }
}

fn cell(offset: u32, i: u32) -> u16 {
  (offset + i).min(u16::MAX as u32) as u16
}

fn render_direct(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let img_w = rgb.width().min(area.width as u32);
  let img_h = rgb.height();
  let cell_h = img_h.div_ceil(2).min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(cell_h) / 2;

  for y in 0..cell_h {
    for x in 0..img_w {
      let upper = rgb.get_pixel(x, y * 2);
      let lower_y = y * 2 + 1;
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if lower_y < img_h {
        let lower = rgb.get_pixel(x, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      buf.set_string(
        area.x.saturating_add(cell(offset_x, x)),
        area.y.saturating_add(cell(offset_y, y)),
        "▀",
        Style::default().fg(fg).bg(bg),
      );
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let img_w = luma.width().min(area.width as u32);
  let img_h = luma.height().min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(img_h) / 2;

  for y in 0..img_h {
    for x in 0..img_w {
      buf.set_string(
        area.x.saturating_add(cell(offset_x, x)),
        area.y.saturating_add(cell(offset_y, y)),
        ascii_ramp(luma.get_pixel(x, y)[0]),
        Style::default(),
      );
    }
  }
}

fn ascii_ramp(luma: u8) -> &'static str {
  let idx = ((luma as f32 / 255.0) * (ASCII_CHARS.len() - 1) as f32).round() as usize;
  ASCII_CHARS[idx.min(ASCII_CHARS.len() - 1)]
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn solid(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
  }

  #[test]
  fn ascii_ramp_ends() {
    assert_eq!(ascii_ramp(0), " ");
    assert_eq!(ascii_ramp(255), "@");
  }

  #[test]
  fn fit_keeps_aspect_inside_area() {
    let area = Rect::new(0, 0, 40, 10);
    let wide = solid(1600, 900, [0, 0, 0]);
    let fitted = fit_to_area(&wide, area, DisplayMode::Direct);
    assert!(fitted.width() <= 40);
    assert!(fitted.height() <= 20);
    let ascii = fit_to_area(&wide, area, DisplayMode::Ascii);
    assert!(ascii.height() <= 10);
  }

  #[test]
  fn half_block_paints_centered_cells() {
    let area = Rect::new(0, 0, 6, 3);
    let mut buf = Buffer::empty(area);
    ImageWidget { image: &solid(2, 2, [255, 0, 0]), display_mode: DisplayMode::Direct }.render(area, &mut buf);
    let painted = &buf[(2, 1)];
    assert_eq!(painted.symbol(), "▀");
    assert_eq!(painted.fg, Color::Rgb(255, 0, 0));
    assert_eq!(buf[(0, 0)].symbol(), " ");
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
  }

  #[test]
  fn cache_refits_on_resize() {
    let mut cache = ImageCache::default();
    let img = solid(100, 100, [9, 9, 9]);
    let small = cache.fitted("a", &img, Rect::new(0, 0, 10, 5), DisplayMode::Direct).width();
    let large = cache.fitted("a", &img, Rect::new(0, 0, 30, 15), DisplayMode::Direct).width();
    assert!(large > small);
  }
}

//! Human-readable labels for sizes, durations and counts, plus the
//! timestamp grammar accepted for clip boundaries.

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// `204800` → `200.0 KB`. Zero renders as `0 B`.
pub fn format_file_size(bytes: u64) -> String {
  if bytes == 0 {
    return "0 B".to_string();
  }
  let mut value = bytes as f64;
  let mut unit = 0;
  while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", value, SIZE_UNITS[unit])
}

/// `75` → `1:15`, `3725` → `1:02:05`.
pub fn format_duration(seconds: u64) -> String {
  if seconds == 0 {
    return "Unknown".to_string();
  }
  let hours = seconds / 3600;
  let minutes = (seconds % 3600) / 60;
  let secs = seconds % 60;
  if hours > 0 { format!("{}:{:02}:{:02}", hours, minutes, secs) } else { format!("{}:{:02}", minutes, secs) }
}

/// `1234` → `1.2K`, `3_400_000` → `3.4M`.
pub fn format_number(n: u64) -> String {
  if n >= 1_000_000 {
    format!("{:.1}M", n as f64 / 1_000_000.0)
  } else if n >= 1_000 {
    format!("{:.1}K", n as f64 / 1_000.0)
  } else {
    n.to_string()
  }
}

/// Parse `HH:MM:SS`, `MM:SS` or `SS` into seconds.
pub fn parse_timestamp(input: &str) -> Option<u64> {
  let parts: Vec<u64> = input.trim().split(':').map(|p| p.trim().parse::<u64>().ok()).collect::<Option<_>>()?;
  match parts.as_slice() {
    [h, m, s] => Some(h * 3600 + m * 60 + s),
    [m, s] => Some(m * 60 + s),
    [s] => Some(*s),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- format_file_size ---

  #[test]
  fn file_size_kilobytes() {
    assert_eq!(format_file_size(204_800), "200.0 KB");
  }

  #[test]
  fn file_size_small_and_zero() {
    assert_eq!(format_file_size(0), "0 B");
    assert_eq!(format_file_size(512), "512.0 B");
  }

  #[test]
  fn file_size_megabytes_and_cap() {
    assert_eq!(format_file_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072.0 GB");
  }

  // --- format_duration ---

  #[test]
  fn duration_minutes_and_hours() {
    assert_eq!(format_duration(75), "1:15");
    assert_eq!(format_duration(3725), "1:02:05");
    assert_eq!(format_duration(0), "Unknown");
  }

  // --- format_number ---

  #[test]
  fn number_suffixes() {
    assert_eq!(format_number(999), "999");
    assert_eq!(format_number(1234), "1.2K");
    assert_eq!(format_number(3_400_000), "3.4M");
  }

  // --- parse_timestamp ---

  #[test]
  fn timestamp_forms() {
    assert_eq!(parse_timestamp("1:30"), Some(90));
    assert_eq!(parse_timestamp("01:02:03"), Some(3723));
    assert_eq!(parse_timestamp("45"), Some(45));
  }

  #[test]
  fn timestamp_rejects_garbage() {
    assert_eq!(parse_timestamp(""), None);
    assert_eq!(parse_timestamp("1:2:3:4"), None);
    assert_eq!(parse_timestamp("ab:10"), None);
    assert_eq!(parse_timestamp("-5"), None);
  }
}

//! Display formatting for values read from the loop's files.

use chrono::{DateTime, Local};

/// Render an RFC 3339 timestamp as local wall-clock time (`HH:MM:SS`).
///
/// Anything that doesn't parse is returned unchanged so hand-written log
/// entries still display.
pub fn format_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(ts) => ts.with_timezone(&Local).format("%H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rfc3339() {
        let raw = "2025-01-08T10:30:00Z";
        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string();
        assert_eq!(format_timestamp(raw), expected);
        assert_eq!(format_timestamp(raw).len(), 8);
    }

    #[test]
    fn test_format_passthrough() {
        assert_eq!(format_timestamp("yesterday-ish"), "yesterday-ish");
        assert_eq!(format_timestamp(""), "");
    }
}

//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Filename-safe stamp for a run timestamp, e.g. `20261019T143045123Z`
///
/// Millisecond precision so back-to-back runs get distinct report names.
pub fn file_stamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%S%3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_file_stamp_format() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 45).unwrap();
        assert_eq!(file_stamp(&ts), "20261019T143045000Z");
    }

    #[test]
    fn test_file_stamp_has_no_path_separators() {
        let stamp = file_stamp(&now());
        assert!(!stamp.contains('/'));
        assert!(!stamp.contains(':'));
        assert!(!stamp.contains(' '));
    }
}

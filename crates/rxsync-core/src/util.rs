//! Shared utility functions used across multiple modules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Normalize a date string to `YYYY-MM-DD`.
///
/// Accepts plain ISO dates, RFC 3339 timestamps, and `YYYY-MM-DD HH:MM:SS`
/// datetimes. Returns `None` when no date can be extracted.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date().format("%Y-%m-%d").to_string());
    }
    // Timestamps with sub-second precision still lead with the date
    if let Some(prefix) = value.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Parse a remote-side timestamp into Unix milliseconds.
///
/// Remote payloads carry either RFC 3339 or `YYYY-MM-DD HH:MM:SS` (treated
/// as UTC). Returns `None` for anything else.
pub fn parse_remote_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.timestamp_millis());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.and_utc().timestamp_millis());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" https://example.com ".to_string())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn normalize_date_plain() {
        assert_eq!(
            normalize_date("2024-01-01"),
            Some("2024-01-01".to_string())
        );
    }

    #[test]
    fn normalize_date_rfc3339() {
        assert_eq!(
            normalize_date("2024-01-01T15:30:00Z"),
            Some("2024-01-01".to_string())
        );
        assert_eq!(
            normalize_date("2024-01-01T23:59:59.123456+00:00"),
            Some("2024-01-01".to_string())
        );
    }

    #[test]
    fn normalize_date_datetime() {
        assert_eq!(
            normalize_date("2024-01-01 15:30:00"),
            Some("2024-01-01".to_string())
        );
    }

    #[test]
    fn normalize_date_rejects_garbage() {
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn parse_remote_timestamp_formats() {
        assert_eq!(
            parse_remote_timestamp("1970-01-01T00:00:01Z"),
            Some(1000)
        );
        assert_eq!(
            parse_remote_timestamp("1970-01-01 00:00:01"),
            Some(1000)
        );
        assert_eq!(parse_remote_timestamp("not a time"), None);
    }

    #[test]
    fn now_millis_is_positive() {
        assert!(now_millis() > 0);
    }
}

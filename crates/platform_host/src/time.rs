//! Time helpers for file metadata and taskbar clock labels.

use chrono::{DateTime, Local, TimeZone};

/// Display format used for "modified" labels (`7/20/2024 10:00 AM`).
pub const MODIFIED_LABEL_FORMAT: &str = "%-m/%-d/%Y %I:%M %p";

/// Formats `at` as a modified label.
pub fn format_modified_label<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(MODIFIED_LABEL_FORMAT).to_string()
}

/// Formats `at` for the taskbar clock (`9:05 AM`, or `09:05` in 24-hour mode).
pub fn format_clock_label<Tz>(at: &DateTime<Tz>, use_24_hour: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let format = if use_24_hour { "%H:%M" } else { "%-I:%M %p" };
    at.format(format).to_string()
}

/// Returns the modified label for the current local time.
pub fn modified_label_now() -> String {
    format_modified_label(&Local::now())
}

/// Converts a unix millisecond timestamp reported by a provider into a local modified label.
pub fn modified_label_from_unix_ms(unix_ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(unix_ms)
        .single()
        .map(|at| format_modified_label(&at))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn modified_label_uses_unpadded_month_and_day() {
        let at = Utc
            .with_ymd_and_hms(2024, 7, 21, 9, 0, 0)
            .single()
            .expect("valid time");
        assert_eq!(format_modified_label(&at), "7/21/2024 09:00 AM");

        let afternoon = Utc
            .with_ymd_and_hms(2024, 7, 18, 14, 45, 0)
            .single()
            .expect("valid time");
        assert_eq!(format_modified_label(&afternoon), "7/18/2024 02:45 PM");
    }

    #[test]
    fn clock_label_honors_hour_mode() {
        let at = Utc
            .with_ymd_and_hms(2024, 7, 21, 21, 5, 0)
            .single()
            .expect("valid time");
        assert_eq!(format_clock_label(&at, false), "9:05 PM");
        assert_eq!(format_clock_label(&at, true), "21:05");
    }

    #[test]
    fn unix_ms_labels_are_non_empty() {
        let label = modified_label_from_unix_ms(1_721_466_000_000).expect("label");
        assert!(label.ends_with("AM") || label.ends_with("PM"));
    }
}

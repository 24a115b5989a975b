//! Wall-clock helpers: current time, Unix conversions and display formats.

use std::sync::OnceLock;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Current wall-clock time in the local offset.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_unix_ms() -> u64 {
    unix_ms(OffsetDateTime::now_utc())
}

/// Milliseconds since the Unix epoch; times before the epoch clamp to 0.
pub fn unix_ms(t: OffsetDateTime) -> u64 {
    u64::try_from(t.unix_timestamp_nanos() / 1_000_000).unwrap_or(0)
}

/// Convert Unix milliseconds to a date-time in the given offset.
pub fn from_unix_ms(ms: u64, offset: UtcOffset) -> OffsetDateTime {
    let nanos = i128::from(ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(offset)
}

/// Local offset, UTC if unknown.
///
/// Detected once and cached. The platform lookup can refuse to run once the
/// process has several threads, so call this before starting the runtime.
pub fn local_offset() -> UtcOffset {
    static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// Format as `DD.MM.YYYY HH:MM:SS`.
pub fn format_datetime(t: &OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] [hour]:[minute]:[second]");
    t.format(&format).unwrap_or_else(|_| t.to_string())
}

/// Format as `HH:MM:SS`.
pub fn format_time_of_day(t: &OffsetDateTime) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    t.format(&format).unwrap_or_else(|_| t.to_string())
}

/// Short age for status bars: "4s ago", "3m ago", "2h ago".
pub fn format_age(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_unix_ms_roundtrip() {
        let t = datetime!(2024-01-02 03:04:05.678 UTC);
        let ms = unix_ms(t);
        assert_eq!(ms, 1_704_164_645_678);
        assert_eq!(from_unix_ms(ms, UtcOffset::UTC), t);
    }

    #[test]
    fn test_pre_epoch_clamps() {
        assert_eq!(unix_ms(datetime!(1969-12-31 23:59:59 UTC)), 0);
    }

    #[test]
    fn test_formats() {
        let t = datetime!(2024-01-02 03:04:05 UTC);
        assert_eq!(format_datetime(&t), "02.01.2024 03:04:05");
        assert_eq!(format_time_of_day(&t), "03:04:05");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(-3), "0s ago");
        assert_eq!(format_age(59), "59s ago");
        assert_eq!(format_age(61), "1m ago");
        assert_eq!(format_age(7200), "2h ago");
    }
}

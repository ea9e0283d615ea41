use chrono::{DateTime, Local, TimeZone};

/// Format used for the human-readable update time of tracked artifacts.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a Unix timestamp (seconds) as `YYYY-MM-DD HH:MM:SS` in the local
/// time zone.
///
/// Returns `None` if the timestamp is outside the range chrono can represent.
///
/// # Examples
///
/// ```
/// use pkgindex_utils::time::format_local_timestamp;
///
/// let rendered = format_local_timestamp(0).unwrap();
/// assert_eq!(rendered.len(), "1970-01-01 00:00:00".len());
/// ```
pub fn format_local_timestamp(seconds: i64) -> Option<String> {
    format_timestamp_in(seconds, &Local)
}

/// Renders a Unix timestamp (seconds) in the given time zone.
pub fn format_timestamp_in<Tz>(seconds: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(seconds, 0)?;
    Some(
        utc.with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    )
}

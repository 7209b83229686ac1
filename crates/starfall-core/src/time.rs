use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current UTC time as an RFC 3339 timestamp (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn timestamp_now() -> String {
    format_utc(Utc::now())
}

/// RFC 3339 with whole seconds and a `Z` suffix, so rows sort lexically by time.
pub fn format_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

//! Lenient parsing of page-sourced counters and timestamps.
//!
//! Page markup exposes engagement counts and dates in whatever shape the site
//! renders them. These helpers turn that text into canonical values without
//! ever failing: counters fall back to `0`, and timestamps fall back to the
//! raw string.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

static ISO_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("valid iso prefix regex"));

/// Date-time layouts tried in order. Offset-less values are read as UTC.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y, %I:%M %p",
    "%B %d, %Y at %I:%M %p",
    "%d %B %Y %H:%M",
    "%I:%M %p · %b %d, %Y",
    "%I:%M %p - %d %b %Y",
];

/// Date-only layouts; parsed values land on midnight UTC.
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
];

/// Coerces a raw counter into a non-negative integer.
///
/// Accepts thousands separators (`"1,204"`), decimals (truncated), and
/// `K`/`M`/`B` suffixes (`"3.5K"` → 3500). Anything else, including negative
/// or non-finite values, becomes `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    if cleaned.is_empty() {
        return 0;
    }

    let (number, multiplier) = match cleaned.chars().last() {
        Some('k' | 'K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m' | 'M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('b' | 'B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => (value * multiplier).floor() as u64,
        _ => 0,
    }
}

/// Returns `true` when `value` starts with a strict `YYYY-MM-DDT` prefix.
#[must_use]
pub fn is_iso_datetime(value: &str) -> bool {
    ISO_PREFIX_RE.is_match(value)
}

/// Parses natural-language and locale date strings into UTC.
///
/// Tries RFC 3339, RFC 2822, bare epoch seconds or milliseconds, then the
/// layouts in [`DATETIME_LAYOUTS`] and [`DATE_LAYOUTS`].
#[must_use]
pub fn parse_loose_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_epoch(value) {
        return Some(dt);
    }

    for layout in DATETIME_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(value, layout) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Rewrites a non-ISO timestamp to ISO-8601. ISO values pass through
/// untouched; unparseable values are returned as-is.
#[must_use]
pub fn rewrite_timestamp(raw: String) -> String {
    if is_iso_datetime(&raw) {
        return raw;
    }
    match parse_loose_timestamp(&raw) {
        Some(dt) => harmwatch_core::iso_timestamp(dt),
        None => {
            tracing::debug!(timestamp = %raw, "keeping unparseable timestamp as-is");
            raw
        }
    }
}

/// Epoch seconds (10 digits) or milliseconds (13 digits).
fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = value.parse().ok()?;
    match value.len() {
        10 => DateTime::from_timestamp(n, 0),
        13 => DateTime::from_timestamp_millis(n),
        _ => None,
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;

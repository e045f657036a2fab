//! Display helpers for note lists.
//!
//! Pure functions; no state, no I/O.

use chrono::{DateTime, Datelike, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

/// Preview length used by list rows.
pub const DEFAULT_SNIPPET_LEN: usize = 140;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Formats `epoch_ms` relative to `now`, in `now`'s timezone.
///
/// - same calendar day: `HH:MM`
/// - same year: `Mon DD`
/// - otherwise: `Mon DD, YYYY`
pub fn format_updated_at_relative_to<Tz>(epoch_ms: i64, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(stamp) = now.timezone().timestamp_millis_opt(epoch_ms).single() else {
        return String::new();
    };

    if stamp.date_naive() == now.date_naive() {
        return stamp.format("%H:%M").to_string();
    }
    if stamp.year() == now.year() {
        return stamp.format("%b %d").to_string();
    }
    stamp.format("%b %d, %Y").to_string()
}

/// [`format_updated_at_relative_to`] against the local wall clock.
pub fn format_updated_at(epoch_ms: i64) -> String {
    format_updated_at_relative_to(epoch_ms, &Local::now())
}

/// One-line preview: whitespace runs collapsed, trimmed, and cut to
/// `max_len` characters with a trailing ellipsis when longer.
pub fn snippet(text: &str, max_len: usize) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let normalized = collapsed.trim();
    if normalized.chars().count() <= max_len {
        return normalized.to_string();
    }

    let mut cut = normalized
        .chars()
        .take(max_len.saturating_sub(1))
        .collect::<String>();
    cut.push('…');
    cut
}

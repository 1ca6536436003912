//! Scan-time parsing: pulling HH:MM punch tokens out of free-text cells
//! and the minute arithmetic shared by the rule engine.

use std::sync::OnceLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Extracts every `H:MM`/`HH:MM` token from a cell, in order of appearance.
///
/// The order is assumed to alternate in/out punches. This is a literal
/// pattern match: out-of-range tokens like "25:99" are extracted here and
/// rejected later by [`parse_hhmm`].
pub fn scan_tokens(text: &str) -> Vec<String> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| Regex::new(r"\d{1,2}:\d{2}").expect("valid scan pattern"));
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Strict time-of-day interpretation of a scan token.
pub fn parse_hhmm(token: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(token, "%H:%M").ok()
}

/// Minutes from `start` to `end`, rolling over midnight when `end` is
/// earlier than `start` (overnight shifts).
pub fn span_minutes(start: NaiveTime, end: NaiveTime) -> i64 {
    let s = minutes_of_day(start);
    let e = minutes_of_day(end);
    if e < s {
        e + MINUTES_PER_DAY - s
    } else {
        e - s
    }
}

/// Sums the duration of each consecutive (in, out) scan pair, in hours
/// rounded to 2 decimals.
///
/// An odd trailing scan has no pair and is ignored; a pair with a token
/// that fails strict parsing contributes nothing.
#[allow(clippy::cast_precision_loss)]
pub fn worked_hours(tokens: &[String]) -> f64 {
    let mut total_minutes: i64 = 0;
    for pair in tokens.chunks_exact(2) {
        if let (Some(t_in), Some(t_out)) = (parse_hhmm(&pair[0]), parse_hhmm(&pair[1])) {
            total_minutes += span_minutes(t_in, t_out);
        }
    }
    round2(total_minutes as f64 / 60.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn minutes_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

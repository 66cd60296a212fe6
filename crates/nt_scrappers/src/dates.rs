//! Best-effort publish date extraction from free text.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_PATTERNS: Vec<Regex> = [
        r"(\w+ \d{1,2}, \d{4})",           // March 8, 2025
        r"(\d{1,2} \w+ \d{4})",            // 8 March 2025
        r"(\d{4}-\d{1,2}-\d{1,2})",        // 2025-03-08
        r"(\d{1,2}/\d{1,2}/\d{4})",        // 3/8/2025
        r"(\d{1,2}-\d{1,2}-\d{4})",        // 3-8-2025
        r"Published (\w+ \d{1,2}, \d{4})",
        r"Updated (\w+ \d{1,2}, \d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
}

const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

fn parse_candidate(candidate: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
}

/// Returns the first date found in `text`. Patterns are tried in order and
/// the first match that parses under any known format wins.
pub fn parse_date_from_text(text: &str) -> Option<NaiveDate> {
    DATE_PATTERNS.iter().find_map(|pattern| {
        let candidate = pattern.captures(text)?.get(1)?.as_str();
        parse_candidate(candidate)
    })
}

/// Parses a date emitted by a model: ISO first, then free text.
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| value.get(..10).and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()))
        .or_else(|| parse_date_from_text(value))
}

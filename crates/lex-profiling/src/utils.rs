//! Shared literal-parsing helpers.
//!
//! Type inference, column profiling and the polars export all need to agree
//! on what counts as an integer, a float, a boolean or a date, so the rules
//! live here in one place.

use crate::config::BooleanVocabulary;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Numeric literals
// =============================================================================

/// Parse a signed 64-bit integer literal (surrounding whitespace ignored).
pub fn parse_integer_literal(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Parse a decimal/float literal.
///
/// The literal must contain at least one ASCII digit, so `inf` and `NaN`
/// do not count as numbers.
pub fn parse_float_literal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 7] = [',', '$', '%', '€', '£', '¥', ' '];

// Numbers dressed up with currency symbols, thousands separators or a
// percent sign. Compiled once at startup.
static FORMATTED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?\s*[$€£¥]?\s*[-+]?(?:\d{1,3}(?:[, ]\d{3})+|\d+)(?:\.\d+)?\s*[%€]?$")
        .expect("Invalid regex: formatted number")
});

/// Clean a string for numeric parsing by removing formatting characters.
///
/// ```rust,ignore
/// use lex_profiling::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect()
}

/// Parse a number that may carry formatting noise (`$1,234.56`, `12%`).
pub fn parse_formatted_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !FORMATTED_NUMBER.is_match(trimmed) {
        return None;
    }
    parse_float_literal(&clean_numeric_string(trimmed))
}

// =============================================================================
// Booleans
// =============================================================================

/// Map a token from the boolean vocabulary to its value.
pub fn parse_bool_token(s: &str, vocabulary: &BooleanVocabulary) -> Option<bool> {
    let trimmed = s.trim();
    if vocabulary
        .truthy
        .iter()
        .any(|t| t.eq_ignore_ascii_case(trimmed))
    {
        Some(true)
    } else if vocabulary
        .falsy
        .iter()
        .any(|t| t.eq_ignore_ascii_case(trimmed))
    {
        Some(false)
    } else {
        None
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Parse a date/time literal against chrono format strings.
///
/// Each format is tried as a datetime with a UTC offset (normalised to UTC),
/// then as a naive datetime, then as a naive date.
pub fn parse_datetime_literal<S: AsRef<str>>(s: &str, formats: &[S]) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Offset-aware parsing goes first: the naive parser accepts an offset
    // field but silently drops it.
    formats.iter().map(AsRef::as_ref).find_map(|format| {
        DateTime::parse_from_str(trimmed, format)
            .ok()
            .map(|dt| dt.naive_utc())
            .or_else(|| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    })
}

/// Check whether a string parses as a date under any of the formats.
pub fn is_datetime_literal<S: AsRef<str>>(s: &str, formats: &[S]) -> bool {
    parse_datetime_literal(s, formats).is_some()
}

// =============================================================================
// Tests
// =============================================================================

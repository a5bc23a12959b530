//! Date and date-time formatting and parsing.
//!
//! Column formats use the familiar `yyyy-MM-dd HH:mm` pattern letters, or one
//! of the skeletons `yMd` (short date for the culture) and `yMMMd` (date with
//! abbreviated month). Patterns are translated once into a `chrono` format
//! string which is then used both ways.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::FormatError;
use crate::value::Value;

use super::culture::Culture;

/// Formats and parses dates with one translated pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    pattern: String,
    strftime: String,
    has_time: bool,
    with_time: bool,
}

impl DateFormatter {
    /// Create a date formatter. `with_time` selects date-time output when no
    /// explicit pattern is given and makes `parse` produce `DateTime`.
    pub fn new(culture: &Culture, pattern: Option<&str>, with_time: bool) -> Self {
        let pattern = match pattern.map(str::trim).filter(|p| !p.is_empty()) {
            Some("yMd") => culture.short_date_pattern(),
            Some("yMMMd") => culture.medium_date_pattern().to_string(),
            Some(custom) => custom.to_string(),
            None if with_time => {
                format!("{} {}", culture.short_date_pattern(), culture.time_pattern())
            }
            None => culture.short_date_pattern(),
        };
        let strftime = to_strftime(&pattern);
        let has_time = ["%H", "%-H", "%I", "%-I", "%M", "%-M", "%S", "%-S"]
            .iter()
            .any(|spec| strftime.contains(spec));
        Self {
            pattern,
            strftime,
            has_time,
            with_time,
        }
    }

    /// The source pattern, after skeleton expansion.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Format a date, a date-time, or an ISO-8601 string.
    pub fn format(&self, value: &Value) -> String {
        match coerce_datetime(value) {
            Some(dt) => dt.format(&self.strftime).to_string(),
            None => value.to_string(),
        }
    }

    /// Parse text back into a `Date` or `DateTime`. Empty text is `Null`.
    pub fn parse(&self, text: &str) -> Result<Value, FormatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }

        let expected = if self.with_time { "datetime" } else { "date" };
        let datetime = if self.has_time {
            NaiveDateTime::parse_from_str(trimmed, &self.strftime)
                .map_err(|_| FormatError::parse(text, expected))?
        } else {
            NaiveDate::parse_from_str(trimmed, &self.strftime)
                .map_err(|_| FormatError::parse(text, expected))?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| FormatError::parse(text, expected))?
        };

        Ok(if self.with_time {
            Value::DateTime(datetime)
        } else {
            Value::Date(datetime.date())
        })
    }
}

/// Reads a date-like value, accepting ISO-8601 / RFC 3339 strings.
pub fn coerce_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(_) | Value::DateTime(_) => value.as_datetime(),
        Value::String(s) => parse_iso(s),
        _ => None,
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Translate a `yyyy-MM-dd`-style pattern into a `chrono` format string.
///
/// Text inside single quotes is copied literally.
pub fn to_strftime(pattern: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("dd", "%d"),
        ("d", "%-d"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("s", "%-S"),
        ("tt", "%p"),
    ];

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    'outer: while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('\'') {
            let (literal, tail) = stripped.split_once('\'').unwrap_or((stripped, ""));
            out.push_str(&literal.replace('%', "%%"));
            rest = tail;
            continue;
        }
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
        }
        rest = chars.as_str();
    }
    out
}

//! Day-first date parsing.
//!
//! Accepts ISO dates (with an optional time), `YYYY/MM/DD`, compact
//! `YYYYMMDD`, numeric `D-M-Y` forms with `-`, `/` or `.` separators
//! (falling back to month-first when the day-first reading is not a real
//! date) and common textual month forms.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Splits an optional trailing time component off a date.
static TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<date>.+?)(?:[T ](?P<time>\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)Z?)?$").unwrap()
});

const TEXTUAL_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%d %b, %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d/%b/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Parse a date, reading ambiguous numeric forms day-first.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let caps = TIME_SUFFIX.captures(value)?;
    if let Some(time) = caps.name("time") {
        parse_time(time.as_str())?;
    }
    let date = caps.name("date")?.as_str().trim();

    parse_numeric(date).or_else(|| parse_textual(date))
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

fn parse_numeric(value: &str) -> Option<NaiveDate> {
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return ymd(&value[..4], &value[4..6], &value[6..]);
    }

    let separator = value.chars().find(|c| matches!(c, '-' | '/' | '.'))?;
    let parts: Vec<&str> = value.split(separator).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || p.len() > 4 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let (first, second, third) = (parts[0], parts[1], parts[2]);
    if first.len() == 4 {
        if separator == '.' {
            return None;
        }
        return ymd(first, second, third);
    }
    if first.len() > 2 || second.len() > 2 || !(third.len() == 2 || third.len() == 4) {
        return None;
    }

    ymd(third, second, first).or_else(|| ymd(third, first, second))
}

fn parse_textual(value: &str) -> Option<NaiveDate> {
    TEXTUAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year = expand_year(year)?;
    let month = month.parse().ok()?;
    let day = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years map to 2000-2068 and 1969-1999.
fn expand_year(year: &str) -> Option<i32> {
    let parsed: i32 = year.parse().ok()?;
    match year.len() {
        4 => Some(parsed),
        2 if parsed <= 68 => Some(2000 + parsed),
        2 => Some(1900 + parsed),
        _ => None,
    }
}

//! Date normalization.
//!
//! Accepted shapes:
//! - `2025-04-15` (passes through)
//! - `Tuesday, April 15` / `April 15th` / `Apr 15, 2026`
//! - `15th of April` / `15 April`
//!
//! Without an explicit year the current year is assumed, rolling forward to
//! next year when the month/day has already passed. Slots are always in the
//! future, so a past-looking date means next year's occurrence.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::TemporalError;

const MONTH_PATTERN: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|\
                             aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("Invalid canonical date regex")
    });

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_PATTERN})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .expect("Invalid month-day regex")
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_PATTERN})\b"
    ))
    .expect("Invalid day-month regex")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("Invalid year regex"));

/// Normalize a natural-language date relative to `today`.
pub fn normalize_date(input: &str, today: NaiveDate) -> Result<NaiveDate, TemporalError> {
    let trimmed = input.trim();
    let err = || TemporalError::DateFormat {
        input: input.to_string(),
    };

    if let Some(caps) = CANONICAL_RE.captures(trimmed) {
        let year = caps[1].parse().map_err(|_| err())?;
        let month = caps[2].parse().map_err(|_| err())?;
        let day = caps[3].parse().map_err(|_| err())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err);
    }

    let (month, day) = extract_month_day(trimmed).ok_or_else(err)?;
    let explicit_year = YEAR_RE
        .captures(trimmed)
        .and_then(|caps| caps[1].parse::<i32>().ok());

    resolve_year(month, day, explicit_year, today).ok_or_else(err)
}

fn extract_month_day(text: &str) -> Option<(u32, u32)> {
    if let Some(caps) = MONTH_DAY_RE.captures(text) {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        return Some((month, day));
    }
    if let Some(caps) = DAY_MONTH_RE.captures(text) {
        let day = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        return Some((month, day));
    }
    None
}

fn resolve_year(
    month: u32,
    day: u32,
    explicit_year: Option<i32>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if let Some(year) = explicit_year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

/// Month number from a full or abbreviated English month name.
fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

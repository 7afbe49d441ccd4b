//! Time normalization.
//!
//! An ordered chain of matchers; the first one that recognizes the input
//! wins. A bare hour such as `"9"` is taken literally on the 24-hour clock
//! (`09:00`) and is never guessed into the afternoon.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::error::TemporalError;

/// Fixed times for day-part phrases. Longer phrases come first so that
/// "early morning" is not read as "morning".
pub const DAY_PART_TIMES: &[(&str, u32, u32)] = &[
    ("early morning", 9, 0),
    ("early afternoon", 13, 0),
    ("morning", 10, 0),
    ("afternoon", 14, 0),
    ("evening", 17, 0),
];

type Matcher = fn(&str) -> Option<NaiveTime>;

/// Matchers in priority order.
const MATCHERS: &[(&str, Matcher)] = &[
    ("24-hour", match_twenty_four_hour as Matcher),
    ("hour-minute-meridiem", match_hour_minute_meridiem as Matcher),
    ("hour-meridiem", match_hour_meridiem as Matcher),
    ("bare-hour", match_bare_hour as Matcher),
    ("oclock", match_oclock as Matcher),
    ("day-part", match_day_part as Matcher),
    ("fallback", match_fallback as Matcher),
];

static TWENTY_FOUR_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("Invalid 24-hour regex"));

static HOUR_MINUTE_MERIDIEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s?(am|pm)$").expect("Invalid hour-minute-meridiem regex")
});

static HOUR_MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s?(am|pm)$").expect("Invalid hour-meridiem regex"));

static BARE_HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})$").expect("Invalid bare hour regex"));

static OCLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s*o\s?'?\s?clock\b(?:\s*(am|pm)\b)?").expect("Invalid o'clock regex")
});

static MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(am|pm)\b").expect("Invalid meridiem regex"));

static FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s?(am|pm)?\b").expect("Invalid fallback time regex")
});

/// Normalize a natural-language time to a 24-hour `NaiveTime`.
pub fn normalize_time(input: &str) -> Result<NaiveTime, TemporalError> {
    let text = fold(input);

    for (name, matcher) in MATCHERS {
        if let Some(time) = matcher(&text) {
            tracing::trace!(input, matcher = *name, "Time matched");
            return Ok(time);
        }
    }

    Err(TemporalError::TimeFormat {
        input: input.to_string(),
    })
}

/// Lowercase, fold `a.m.`/`p.m.` and typographic apostrophes, squash spaces.
fn fold(input: &str) -> String {
    input
        .to_lowercase()
        .replace("a.m.", "am")
        .replace("p.m.", "pm")
        .replace(['\u{2019}', '\u{2018}'], "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a time from an hour, minute and optional am/pm marker.
///
/// With a marker the hour must be 1-12: `12am` is midnight, `12pm` is noon,
/// and `pm` adds twelve to any other hour.
fn to_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem {
        Some(m) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (m, hour) {
                ("am", 12) => 0,
                ("am", h) => h,
                ("pm", 12) => 12,
                ("pm", h) => h + 12,
                _ => return None,
            }
        }
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn num(s: &str) -> Option<u32> {
    s.parse().ok()
}

fn match_twenty_four_hour(text: &str) -> Option<NaiveTime> {
    let caps = TWENTY_FOUR_HOUR_RE.captures(text)?;
    to_time(num(&caps[1])?, num(&caps[2])?, None)
}

fn match_hour_minute_meridiem(text: &str) -> Option<NaiveTime> {
    let caps = HOUR_MINUTE_MERIDIEM_RE.captures(text)?;
    to_time(num(&caps[1])?, num(&caps[2])?, Some(&caps[3]))
}

fn match_hour_meridiem(text: &str) -> Option<NaiveTime> {
    let caps = HOUR_MERIDIEM_RE.captures(text)?;
    to_time(num(&caps[1])?, 0, Some(&caps[2]))
}

fn match_bare_hour(text: &str) -> Option<NaiveTime> {
    let caps = BARE_HOUR_RE.captures(text)?;
    to_time(num(&caps[1])?, 0, None)
}

fn match_oclock(text: &str) -> Option<NaiveTime> {
    let caps = OCLOCK_RE.captures(text)?;
    let meridiem = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .or_else(|| MERIDIEM_RE.captures(text).map(|c| c[1].to_string()));
    to_time(num(&caps[1])?, 0, meridiem.as_deref())
}

/// Day-part phrases only apply when the text carries no digits; an explicit
/// number is left to the fallback matcher.
fn match_day_part(text: &str) -> Option<NaiveTime> {
    if text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    DAY_PART_TIMES
        .iter()
        .find(|(phrase, _, _)| contains_phrase(text, phrase))
        .and_then(|(_, hour, minute)| NaiveTime::from_hms_opt(*hour, *minute, 0))
}

fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Generic `hour[:minute][am|pm]` anywhere in the text. A candidate with a
/// marker or minutes beats a lone number, so "the 15th at 9:30am" reads as
/// 09:30 rather than 15:00.
fn match_fallback(text: &str) -> Option<NaiveTime> {
    let mut plain = None;
    for caps in FALLBACK_RE.captures_iter(text) {
        let hour = num(&caps[1])?;
        let minute = match caps.get(2) {
            Some(m) => num(m.as_str())?,
            None => 0,
        };
        let meridiem = caps.get(3).map(|m| m.as_str());
        let Some(time) = to_time(hour, minute, meridiem) else {
            continue;
        };
        if meridiem.is_some() || caps.get(2).is_some() {
            return Some(time);
        }
        plain.get_or_insert(time);
    }
    plain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(input: &str) -> String {
        normalize_time(input)
            .unwrap_or_else(|e| panic!("{input:?} should parse: {e}"))
            .format("%H:%M")
            .to_string()
    }

    #[test]
    fn twenty_four_hour_is_zero_padded() {
        assert_eq!(norm("14:30"), "14:30");
        assert_eq!(norm("9:05"), "09:05");
        assert_eq!(norm("00:00"), "00:00");
    }

    #[test]
    fn hour_minute_with_meridiem() {
        assert_eq!(norm("9:30pm"), "21:30");
        assert_eq!(norm("9:30 am"), "09:30");
        assert_eq!(norm("12:15am"), "00:15");
        assert_eq!(norm("12:45 pm"), "12:45");
        assert_eq!(norm("9:30 P.M."), "21:30");
    }

    #[test]
    fn hour_only_with_meridiem() {
        assert_eq!(norm("9am"), "09:00");
        assert_eq!(norm("3 pm"), "15:00");
        assert_eq!(norm("12am"), "00:00");
        assert_eq!(norm("12pm"), "12:00");
    }

    #[test]
    fn bare_hour_is_taken_literally() {
        assert_eq!(norm("9"), "09:00");
        assert_eq!(norm("2"), "02:00");
        assert_eq!(norm("15"), "15:00");
    }

    #[test]
    fn oclock_variants() {
        assert_eq!(norm("2 o'clock"), "02:00");
        assert_eq!(norm("2oclock"), "02:00");
        assert_eq!(norm("2 o\u{2019}clock"), "02:00");
        assert_eq!(norm("3 o'clock pm"), "15:00");
        assert_eq!(norm("pm, at 4 o'clock"), "16:00");
    }

    #[test]
    fn day_part_phrases_are_fixed() {
        assert_eq!(norm("early morning"), "09:00");
        assert_eq!(norm("morning"), "10:00");
        assert_eq!(norm("in the early afternoon please"), "13:00");
        assert_eq!(norm("Afternoon"), "14:00");
        assert_eq!(norm("evening"), "17:00");
    }

    #[test]
    fn fallback_finds_time_inside_text() {
        assert_eq!(norm("at 9:30am please"), "09:30");
        assert_eq!(norm("the 15th at 2pm"), "14:00");
        assert_eq!(norm("around 11 if possible"), "11:00");
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(normalize_time("25:00").is_err());
        assert!(normalize_time("13pm").is_err());
        assert!(normalize_time("9:75").is_err());
    }

    #[test]
    fn nothing_recognizable_is_a_time_format_error() {
        assert_eq!(
            normalize_time("whenever suits").unwrap_err(),
            TemporalError::TimeFormat {
                input: "whenever suits".into()
            }
        );
    }
}

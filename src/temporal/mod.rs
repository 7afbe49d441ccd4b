//! Temporal normalizer: natural-language dates and times to canonical form.
//!
//! The remote slot service speaks `YYYY-MM-DD` and `HH:MM` (24-hour). Slots
//! are shown to customers as `Tuesday, April 15 at 9:30 am`, and whatever the
//! customer types back has to be re-derived into the canonical pair before it
//! can be compared with a live slot.

pub mod date;
pub mod time;

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime};

pub use date::normalize_date;
pub use time::normalize_time;

use crate::error::TemporalError;

/// Source of "today" for year resolution.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Normalizer bound to a clock.
#[derive(Clone)]
pub struct TemporalNormalizer {
    clock: Arc<dyn Clock>,
}

impl TemporalNormalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn date(&self, input: &str) -> Result<NaiveDate, TemporalError> {
        normalize_date(input, self.clock.today())
    }

    pub fn time(&self, input: &str) -> Result<NaiveTime, TemporalError> {
        normalize_time(input)
    }
}

/// `YYYY-MM-DD`
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `HH:MM`, 24-hour, zero padded.
pub fn canonical_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `Tuesday, April 15`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// `9:30 am` (no leading zero on the hour).
pub fn display_time(time: NaiveTime) -> String {
    time.format("%-I:%M %P").to_string()
}

/// `Tuesday, April 15 at 9:30 am`
pub fn display_slot(date: NaiveDate, time: NaiveTime) -> String {
    format!("{} at {}", display_date(date), display_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn canonical_forms_are_zero_padded() {
        assert_eq!(canonical_date(ymd(2026, 4, 5)), "2026-04-05");
        assert_eq!(canonical_time(hm(9, 5)), "09:05");
    }

    #[test]
    fn display_drops_leading_zero() {
        assert_eq!(display_time(hm(9, 30)), "9:30 am");
        assert_eq!(display_time(hm(14, 0)), "2:00 pm");
        assert_eq!(display_time(hm(0, 15)), "12:15 am");
        assert_eq!(display_slot(ymd(2025, 4, 15), hm(9, 30)), "Tuesday, April 15 at 9:30 am");
    }

    #[test]
    fn displayed_slot_reads_back_to_the_same_pair() {
        let normalizer = TemporalNormalizer::new(Arc::new(FixedClock(ymd(2025, 3, 1))));
        let date = ymd(2025, 4, 15);
        let time = hm(13, 45);

        assert_eq!(normalizer.date(&display_date(date)).unwrap(), date);
        assert_eq!(normalizer.time(&display_time(time)).unwrap(), time);
    }
}

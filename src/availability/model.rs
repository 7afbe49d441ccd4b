//! Slot and booking types shared with the remote slot service.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A bookable appointment offered by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    pub fn matches(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.date == date && self.time == time
    }
}

/// Result of one availability lookup that reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityOutcome {
    /// The service answered with a (possibly empty) slot list.
    Slots { slots: Vec<Slot>, total: usize },
    /// The service refused the lookup, e.g. postcode outside the area.
    Rejected { message: Option<String> },
}

/// A booking as the dialogue collected it: every field is raw text.
///
/// Missing fields read as empty so an incomplete request still reaches the
/// postcode and date/time checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRequest {
    pub date: String,
    pub time: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
}

/// A booking ready for the wire: canonical date and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSubmission {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
}

/// Result of a booking submission that reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Confirmed { message: String },
    Failed { error: String },
}

/// `HH:MM` on the wire; `HH:MM:SS` is tolerated on input.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

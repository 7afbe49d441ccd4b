//! Human-readable slot listings and the fixed customer-facing messages.

use super::model::Slot;
use crate::temporal::display_slot;

/// Slots shown per listing.
pub const SLOTS_PER_PAGE: usize = 5;

/// Numbered lines for one page of slots, numbering from `offset + 1`.
pub fn slot_lines(slots: &[Slot], offset: usize) -> Vec<String> {
    slots
        .iter()
        .skip(offset)
        .take(SLOTS_PER_PAGE)
        .enumerate()
        .map(|(i, slot)| format!("{}. {}", offset + i + 1, display_slot(slot.date, slot.time)))
        .collect()
}

/// A full listing for one page. `None` when the page is empty.
pub fn slot_listing(postcode: &str, slots: &[Slot], total: usize, offset: usize) -> Option<String> {
    let lines = slot_lines(slots, offset);
    if lines.is_empty() {
        return None;
    }

    let total = total.max(slots.len());
    let shown_through = offset + lines.len();

    let mut out = if offset == 0 {
        format!("Here are the next available tuning slots for {postcode}:\n")
    } else {
        format!("Here are some more tuning slots for {postcode}:\n")
    };
    out.push_str(&lines.join("\n"));

    if total > shown_through || offset > 0 {
        let range = if offset == 0 {
            shown_through.to_string()
        } else {
            format!("{}-{}", offset + 1, shown_through)
        };
        out.push_str(&format!("\n\n(Showing {range} of {total})"));
    }

    out.push_str("\n\nJust let me know which slot you'd like, or ask for more options.");
    Some(out)
}

pub fn no_slots(postcode: &str, phone: &str) -> String {
    format!(
        "Sorry, there are no tuning slots available for {postcode} at the moment. \
         Please call the shop on {phone} and we'll do our best to fit you in."
    )
}

pub fn no_more_slots(postcode: &str, phone: &str) -> String {
    format!(
        "That's all the tuning slots I can see for {postcode} right now. \
         If none of them suit, please call the shop on {phone}."
    )
}

pub fn no_suitable_slots(postcode: &str, phone: &str) -> String {
    format!(
        "Sorry, we couldn't find any suitable slots for {postcode}. \
         Please call the shop on {phone} if you'd like to talk it through."
    )
}

pub fn lookup_unavailable(phone: &str) -> String {
    format!(
        "I'm sorry, I'm having trouble reaching our booking system right now. \
         Please call the shop directly on {phone} and we'll check availability for you."
    )
}

pub fn booking_unavailable(date: &str, time: &str, phone: &str) -> String {
    format!(
        "I'm sorry, I couldn't complete your booking for {date} at {time} because our \
         booking system isn't responding. Please call the shop on {phone} and mention \
         {date} at {time} so we can book it for you."
    )
}

pub fn slot_taken(date: &str, time: &str, alternatives: &[Slot]) -> String {
    let mut out = format!("Sorry, {date} at {time} isn't available any more.");
    let lines = slot_lines(alternatives, 0);
    if lines.is_empty() {
        out.push_str(" Please choose one of the slots currently on offer.");
    } else {
        out.push_str(" These slots are currently available:\n");
        out.push_str(&lines.join("\n"));
        out.push_str("\n\nPlease pick one of these instead.");
    }
    out
}

pub fn postcode_missing() -> String {
    "I couldn't find a postcode in that address. Could you give me the full address, \
     including the postcode?"
        .to_string()
}

pub fn restate_date(input: &str) -> String {
    format!(
        "Sorry, I couldn't work out the date \"{input}\". Could you give it the same way \
         as the slots I offered, for example \"Tuesday, April 15\"?"
    )
}

pub fn restate_time(input: &str) -> String {
    format!(
        "Sorry, I couldn't work out the time \"{input}\". Could you give it the same way \
         as the slots I offered, for example \"9:30 am\"?"
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime};

    use super::*;

    fn slots(n: usize) -> Vec<Slot> {
        let start = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        (0..n)
            .map(|i| Slot::new(start + Duration::days(i as i64), time))
            .collect()
    }

    #[test]
    fn first_page_shows_five_of_many() {
        let listing = slot_listing("HP4 3QH", &slots(29), 29, 0).unwrap();
        let numbered = listing.lines().filter(|l| l.contains(". ")).count();
        assert_eq!(numbered, 5);
        assert!(listing.contains("1. Tuesday, April 15 at 9:30 am"));
        assert!(listing.contains("5. Saturday, April 19 at 9:30 am"));
        assert!(!listing.contains("6. "));
        assert!(listing.contains("(Showing 5 of 29)"));
        assert!(listing.contains("ask for more options"));
    }

    #[test]
    fn short_list_has_no_showing_note() {
        let listing = slot_listing("HP4 3QH", &slots(3), 3, 0).unwrap();
        assert!(listing.contains("3. Thursday, April 17 at 9:30 am"));
        assert!(!listing.contains("Showing"));
    }

    #[test]
    fn total_larger_than_returned_still_noted() {
        let listing = slot_listing("HP4 3QH", &slots(5), 12, 0).unwrap();
        assert!(listing.contains("(Showing 5 of 12)"));
    }

    #[test]
    fn second_page_continues_numbering() {
        let listing = slot_listing("HP4 3QH", &slots(29), 29, 5).unwrap();
        assert!(listing.contains("6. Sunday, April 20 at 9:30 am"));
        assert!(listing.contains("(Showing 6-10 of 29)"));
    }

    #[test]
    fn past_the_end_is_none() {
        assert!(slot_listing("HP4 3QH", &slots(3), 3, 5).is_none());
        assert!(slot_listing("HP4 3QH", &[], 0, 0).is_none());
    }

    #[test]
    fn slot_taken_names_the_request_and_reoffers() {
        let msg = slot_taken("Friday the 18th", "2pm", &slots(2));
        assert!(msg.starts_with("Sorry, Friday the 18th at 2pm isn't available"));
        assert!(msg.contains("1. Tuesday, April 15 at 9:30 am"));
    }
}

//! Utterances that skip persona reasoning and go straight to the reconciler.

use std::sync::LazyLock;

use regex::Regex;

use crate::availability::extract_postcode;
use crate::availability::postcode::strip_postcode;

/// Words that, next to a postcode, mean "show me tuning slots".
/// Booking verbs stay out: "book the first one, HP4 3QH" is for the personas.
static TUNING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(tun(e|ed|es|er|ing|ings)|slots?|availab(le|ility))\b")
        .expect("Invalid tuning keyword regex")
});

/// "more options", "any other times?", "show me the next few slots".
/// The slot noun must follow the "more" word, at most one word apart.
static MORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\b(more|other|another|different|next|later)\s+(\w+\s+)?(options?|slots?|times?|dates?|days?|availability|appointments?)\b)|^\s*(any\s+)?more\s*[?.!]*\s*$",
    )
    .expect("Invalid more-options regex")
});

/// Words allowed around a bare postcode ("it's HP4 3QH please").
const SHORT_MESSAGE_WORDS: usize = 2;

/// A turn the router can answer without persona reasoning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastPath {
    /// First page of slots for a postcode.
    Lookup { postcode: String },
    /// Next page for the postcode already on the session.
    More { postcode: String },
}

/// Decide whether an utterance takes the fast path.
///
/// Text with digits outside the postcode (house numbers, dates, times,
/// phone numbers) is left to the personas: it is usually booking detail.
pub fn classify(utterance: &str, last_postcode: Option<&str>) -> Option<FastPath> {
    if let Some(postcode) = extract_postcode(utterance) {
        let rest = strip_postcode(utterance);
        if rest.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let short = rest.split_whitespace().count() <= SHORT_MESSAGE_WORDS;
        if short || TUNING_RE.is_match(&rest) {
            return Some(FastPath::Lookup { postcode });
        }
        return None;
    }

    let postcode = last_postcode?;
    if utterance.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    MORE_RE.is_match(utterance).then(|| FastPath::More {
        postcode: postcode.to_string(),
    })
}

//! UK postcode extraction and sanitizing.

use std::sync::LazyLock;

use regex::Regex;

static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{1,2}\d[a-z\d]?)\s*(\d[a-z]{2})\b").expect("Invalid postcode regex")
});

/// Find the first UK-postcode-shaped token and return it as `OUT IN`
/// (upper case, single space).
pub fn extract_postcode(text: &str) -> Option<String> {
    POSTCODE_RE
        .captures(text)
        .map(|caps| format!("{} {}", caps[1].to_uppercase(), caps[2].to_uppercase()))
}

/// Remove the postcode from the text, leaving whatever else was said.
pub fn strip_postcode(text: &str) -> String {
    POSTCODE_RE.replace_all(text, " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep only ASCII letters, digits and spaces; trim the result.
pub fn sanitize_postcode(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_full_address() {
        assert_eq!(
            extract_postcode("53 High Street, Northchurch, Herts, HP4 3QH").as_deref(),
            Some("HP4 3QH")
        );
    }

    #[test]
    fn extracts_without_space_and_lowercase() {
        assert_eq!(extract_postcode("hp43qh").as_deref(), Some("HP4 3QH"));
        assert_eq!(extract_postcode("London sw1a1aa please").as_deref(), Some("SW1A 1AA"));
    }

    #[test]
    fn no_postcode_in_plain_address() {
        assert_eq!(extract_postcode("12 Acacia Avenue, Berkhamsted"), None);
        assert_eq!(extract_postcode("can I book a tuning?"), None);
    }

    #[test]
    fn strip_leaves_the_rest() {
        assert_eq!(strip_postcode("tuning for HP4 3QH please"), "tuning for please");
        assert_eq!(strip_postcode("HP4 3QH"), "");
    }

    #[test]
    fn sanitize_drops_punctuation() {
        assert_eq!(sanitize_postcode(" HP4-3QH!; "), "HP43QH");
        assert_eq!(sanitize_postcode("HP4 3QH"), "HP4 3QH");
        assert_eq!(sanitize_postcode("<script>"), "script");
    }
}

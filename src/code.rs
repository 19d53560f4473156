//! Verification-code extraction.
//!
//! Verification emails carry exactly one 6-digit numeric code. The extractor
//! finds the first standalone run of 6 digits; runs embedded in longer digit
//! sequences (order numbers, phone numbers) never match.
//!
//! # Example
//!
//! ```
//! assert_eq!(otp_inbox::code::find_code("your code is 482910 today"), Some("482910"));
//! assert_eq!(otp_inbox::code::find_code("order 12345678"), None);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Word-bounded so a 6-digit window inside a longer run never matches.
static SIX_DIGIT_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6}\b").expect("valid regex"));

/// Finds the first standalone 6-digit code in `text`.
///
/// Returns a slice borrowed from the input, or `None` when no standalone
/// 6-digit run exists.
#[must_use]
pub fn find_code(text: &str) -> Option<&str> {
    SIX_DIGIT_CODE.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_standalone_code() {
        assert_eq!(find_code("Your code is 482910."), Some("482910"));
        assert_eq!(find_code("482910"), Some("482910"));
        assert_eq!(find_code("code: 482910\n"), Some("482910"));
    }

    #[test]
    fn test_rejects_longer_digit_runs() {
        assert_eq!(find_code("1234567"), None);
        assert_eq!(find_code("order 12345678 confirmed"), None);
    }

    #[test]
    fn test_rejects_shorter_digit_runs() {
        assert_eq!(find_code("12345"), None);
        assert_eq!(find_code("pin 1234"), None);
    }

    #[test]
    fn test_word_boundary_excludes_glued_text() {
        // Letters are word characters too, so a glued prefix breaks the boundary
        assert_eq!(find_code("ref a123456"), None);
        assert_eq!(find_code("123456px"), None);
    }

    #[test]
    fn test_first_standalone_run_wins() {
        assert_eq!(find_code("12345 then 654321 then 111111"), Some("654321"));
        assert_eq!(find_code("111111 and 222222"), Some("111111"));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(find_code(""), None);
        assert_eq!(find_code("no code here"), None);
    }

    #[test]
    fn test_punctuation_is_a_boundary() {
        assert_eq!(find_code("(482910)"), Some("482910"));
        assert_eq!(find_code("code:482910."), Some("482910"));
    }
}

//! String normalization shared by the duplicate matchers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not a letter, digit, or whitespace. Underscore is a word
/// character for the regex engine, so it is listed explicitly.
static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]|_").expect("valid punctuation regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Lower-cases, strips punctuation and collapses whitespace runs.
///
/// The input is trimmed before punctuation is removed, so `"- john"` keeps a
/// leading space (`" john"`).
pub fn normalize_string(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let lowered = s.to_lowercase();
    let stripped = NON_ALNUM.replace_all(lowered.trim(), "");
    WHITESPACE_RUN.replace_all(&stripped, " ").into_owned()
}

/// Lower-cased, trimmed key used by the exact-match passes (email, domain).
pub fn normalize_key(s: &str) -> String {
    s.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_string("  ACME, Inc.  "), "acme inc");
        assert_eq!(normalize_string("John   O'Neil"), "john oneil");
        assert_eq!(normalize_string("snake_case"), "snakecase");
        assert_eq!(normalize_string("Tab\tand\nnewline"), "tab and newline");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_string(""), "");
        assert_eq!(normalize_string("   "), "");
        assert_eq!(normalize_string("!!!"), "");
    }

    #[test]
    fn test_normalize_keeps_unicode_letters() {
        assert_eq!(normalize_string("José  Müller"), "josé müller");
    }

    #[test]
    fn test_normalize_trims_before_stripping() {
        assert_eq!(normalize_string("- John"), " john");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  A@X.com "), "a@x.com");
    }
}

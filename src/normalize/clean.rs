//! Text cleaning: reduce a decoded body to single-line printable ASCII.

use std::sync::OnceLock;

use quoted_printable::ParseMode;
use regex::Regex;
use tracing::debug;

use crate::error::DecodeError;

use super::body::decode_utf8_ignore;

/// Invisible or non-breaking characters that become a plain space.
const INVISIBLE_SPACES: [char; 5] = ['\u{00A0}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Run the full cleaning pipeline over `text`.
///
/// The quoted-printable stage is the only one that can fail; on failure its
/// input passes through unchanged.
pub fn clean_text(text: &str) -> String {
    let decoded = decode_quoted_printable(text).unwrap_or_else(|e| {
        debug!(error = %e, "Keeping text as-is");
        text.to_string()
    });
    let text = strip_escape_artifacts(&decoded);
    let text = replace_invisible_spaces(&text);
    let text = strip_non_ascii(&text);
    collapse_whitespace(&text)
}

/// [`clean_text`] for raw bytes, decoded as UTF-8 with invalid bytes dropped.
pub fn clean_bytes(bytes: &[u8]) -> String {
    clean_text(&decode_utf8_ignore(bytes))
}

/// Quoted-printable decode the whole string, then re-read it as UTF-8.
///
/// Decoding is lenient: `=XX` escapes and soft line breaks are resolved and
/// any other `=` is kept literally. Text that is not pure ASCII cannot be
/// quoted-printable and is rejected.
pub fn decode_quoted_printable(text: &str) -> Result<String, DecodeError> {
    if !text.is_ascii() {
        return Err(DecodeError::QuotedPrintable(
            "input contains non-ASCII characters".to_string(),
        ));
    }
    let decoded = quoted_printable::decode(text, ParseMode::Robust)
        .map_err(|e| DecodeError::QuotedPrintable(e.to_string()))?;
    Ok(decode_utf8_ignore(&decoded))
}

/// Replace literal `\uXXXX` and `\xXX` escapes with a space.
///
/// The escapes are not interpreted: `\u00e9` turns into a space, not `é`.
pub fn strip_escape_artifacts(text: &str) -> String {
    escape_regex().replace_all(text, " ").into_owned()
}

fn escape_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\\u[0-9a-fA-F]{4}|\\x[0-9a-fA-F]{2}").expect("valid escape regex")
    })
}

/// NBSP, zero-width space/non-joiner/joiner and BOM become a space.
pub fn replace_invisible_spaces(text: &str) -> String {
    text.replace(INVISIBLE_SPACES, " ")
}

/// Everything outside printable ASCII, except `\n`, becomes a space.
pub fn strip_non_ascii(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || (' '..='~').contains(&c) { c } else { ' ' })
        .collect()
}

/// Collapse every whitespace run, newlines included, into one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_clean(text: &str) -> bool {
        text.chars().all(|c| c == '\n' || (' '..='~').contains(&c))
            && !text.contains("  ")
            && !text.contains('\n')
            && text.trim() == text
    }

    #[test]
    fn test_nbsp_becomes_space() {
        assert_eq!(clean_text("Hello\u{00A0}World"), "Hello World");
    }

    #[test]
    fn test_zero_width_and_bom() {
        assert_eq!(clean_text("\u{FEFF}a\u{200B}b\u{200C}c\u{200D}d"), "a b c d");
    }

    #[test]
    fn test_quoted_printable_is_decoded() {
        assert_eq!(clean_text("caf=C3=A9 au lait"), "caf au lait");
        assert_eq!(clean_text("one=3Dtwo"), "one=two");
        assert_eq!(clean_text("soft=\r\nbreak"), "softbreak");
    }

    #[test]
    fn test_quoted_printable_leaves_plain_text_alone() {
        assert_eq!(
            decode_quoted_printable("no escapes here").unwrap(),
            "no escapes here"
        );
        assert_eq!(decode_quoted_printable("trailing =").unwrap(), "trailing ");
        assert_eq!(decode_quoted_printable("lower=3d").unwrap(), "lower=");
    }

    #[test]
    fn test_malformed_quoted_printable_is_kept_literally() {
        assert_eq!(decode_quoted_printable("a=3Db x=y").unwrap(), "a=b x=y");
        assert_eq!(clean_text("a=3Db x=y"), "a=b x=y");
        assert_eq!(
            clean_text("https://example.com/?q=rust&page=2"),
            "https://example.com/?q=rust&page=2"
        );
    }

    #[test]
    fn test_non_ascii_input_skips_quoted_printable() {
        assert!(decode_quoted_printable("caf\u{e9} one=3Dtwo").is_err());
        assert_eq!(clean_text("caf\u{e9} one=3Dtwo"), "caf one=3Dtwo");
        assert_eq!(clean_text("Hello\u{00A0}World=20"), "Hello World=20");
    }

    #[test]
    fn test_escape_artifacts_replaced_not_interpreted() {
        assert_eq!(strip_escape_artifacts(r"caf\u00e9!"), "caf !");
        assert_eq!(strip_escape_artifacts(r"a\x20b"), "a b");
        assert_eq!(strip_escape_artifacts(r"\u12 stays"), r"\u12 stays");
        assert_eq!(clean_text(r"Price is\x2010"), "Price is 10");
    }

    #[test]
    fn test_non_ascii_removed() {
        assert_eq!(strip_non_ascii("na\u{ef}ve\tcaf\u{e9}\n"), "na ve caf \n");
        assert_eq!(clean_text("\u{1F600} smile"), "smile");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(collapse_whitespace("  a \n\n b\t\tc  "), "a b c");
        assert_eq!(clean_text("\r\n  Line one\r\n\r\nLine two  \r\n"), "Line one Line two");
    }

    #[test]
    fn test_clean_bytes_ignores_invalid_utf8() {
        assert_eq!(clean_bytes(b"ok\xFF\xFEok"), "okok");
    }

    #[test]
    fn test_output_invariant() {
        let samples = [
            "",
            "   ",
            "Tab\tseparated\u{0007}bell",
            "Mixed \u{00A0}\u{200B} \u{2028} separators\r\n\r\n",
            "=E2=80=94 dash and \\u2014 escape",
            "\u{0000}\u{001F}\u{007F}\u{0080}",
        ];
        for sample in samples {
            let cleaned = clean_text(sample);
            assert!(is_clean(&cleaned), "not clean: {cleaned:?} from {sample:?}");
        }
    }

    #[test]
    fn test_idempotent_on_plain_text() {
        let once = clean_text("  Hello,\u{00A0}\n world!  ");
        assert_eq!(clean_text(&once), once);
    }
}

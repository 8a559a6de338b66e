use crate::compat::{Cow, String};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// Escape sets for URL components. A code point passes through unchanged
// only when its scalar value lies strictly between 0x20 and 0x7F and it is
// not in the forbidden list; everything else is UTF-8 encoded and emitted
// as uppercase %HH per byte. CONTROLS covers C0 (0x00-0x1F) and DEL (0x7F);
// the crate encodes all non-ASCII code points unconditionally.

/// Body percent-encode set, used for paths, userinfo, fragments, and
/// opaque hosts. Forbids `"` `#` `<` `>` `?` and backtick.
pub const BODY_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Query percent-encode set. Narrower than [`BODY_SET`]: `?` survives, so
/// question marks embedded in a query round-trip through serialization.
pub const QUERY_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Percent-encode a single code point into `buffer` using `set`.
pub fn percent_encode_char(buffer: &mut String, c: char, set: &'static AsciiSet) {
    let mut utf8 = [0u8; 4];
    for piece in utf8_percent_encode(c.encode_utf8(&mut utf8), set) {
        buffer.push_str(piece);
    }
}

/// Percent-encode a whole string into `buffer` using `set`.
pub fn percent_encode_into(buffer: &mut String, input: &str, set: &'static AsciiSet) {
    buffer.reserve(input.len());
    for piece in utf8_percent_encode(input, set) {
        buffer.push_str(piece);
    }
}

/// Percent-decode a string, replacing invalid UTF-8 with U+FFFD.
pub fn percent_decode_lossy(input: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(input).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::ToString;

    fn encode(input: &str, set: &'static AsciiSet) -> String {
        let mut out = String::new();
        percent_encode_into(&mut out, input, set);
        out
    }

    #[test]
    fn test_body_set() {
        assert_eq!(encode("a b", BODY_SET), "a%20b");
        assert_eq!(encode("a?b", BODY_SET), "a%3Fb");
        assert_eq!(encode("<`>", BODY_SET), "%3C%60%3E");
        // Already-escaped text is stable
        assert_eq!(encode("a%20b", BODY_SET), "a%20b");
    }

    #[test]
    fn test_query_set_keeps_question_mark() {
        assert_eq!(encode("a?b", QUERY_SET), "a?b");
        assert_eq!(encode("a\"b", QUERY_SET), "a%22b");
    }

    #[test]
    fn test_non_ascii_is_utf8_encoded_uppercase() {
        let mut out = String::new();
        percent_encode_char(&mut out, 'é', BODY_SET);
        assert_eq!(out, "%C3%A9");
    }

    #[test]
    fn test_percent_decode_lossy() {
        assert_eq!(percent_decode_lossy("hello%20world"), "hello world");
        assert_eq!(percent_decode_lossy("%C3%A9").to_string(), "é");
        // Malformed escapes pass through
        assert_eq!(percent_decode_lossy("%zz"), "%zz");
    }
}

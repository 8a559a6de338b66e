//! Parser and serializer for the `application/x-www-form-urlencoded`
//! format, as used by URL query strings and HTML forms.
use crate::compat::{String, Vec};
use core::fmt::Write;

/// Parse an urlencoded string into an ordered list of name/value pairs.
///
/// Pieces are split on `&` (empty pieces are dropped) and each piece at its
/// first `=`; a piece without `=` becomes a name with an empty value. `+`
/// decodes to a space, percent escapes decode to bytes, and the result is
/// interpreted as UTF-8 with U+FFFD for invalid sequences.
pub fn parse(input: &str) -> Vec<(String, String)> {
    input
        .split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.split_once('=') {
            Some((name, value)) => (decode(name), decode(value)),
            None => (decode(piece), String::new()),
        })
        .collect()
}

/// Serialize name/value pairs as `name=value` joined with `&`.
pub fn serialize(pairs: &[(String, String)]) -> String {
    let mut output = String::new();
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            output.push('&');
        }
        encode_into(&mut output, name);
        output.push('=');
        encode_into(&mut output, value);
    }
    output
}

// Bytewise serializer: space becomes `+` (unlike the %20 the URL body
// encoder emits), alphanumerics and `*-._` stay literal, everything else
// is a percent-encoded UTF-8 byte.
fn encode_into(output: &mut String, input: &str) {
    for byte in input.bytes() {
        match byte {
            b' ' => output.push('+'),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                output.push(byte as char);
            }
            _ => {
                let _ = write!(output, "%{byte:02X}");
            }
        }
    }
}

fn decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    // Works on bytes only; slicing the &str here could land inside a
    // multi-byte character when a % is followed by non-ASCII text.
    while i < bytes.len() {
        match bytes[i] {
            b'+' => result.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    result.push((hi * 16 + lo) as u8);
                    i += 2;
                } else {
                    result.push(b'%');
                }
            }
            b => result.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&result).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compat::ToString;

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_basic() {
        assert_eq!(parse("a=1&b=2"), pairs(&[("a", "1"), ("b", "2")]));
        assert_eq!(parse(""), pairs(&[]));
    }

    #[test]
    fn test_parse_empty_pieces_dropped() {
        assert_eq!(parse("&&a=1&&"), pairs(&[("a", "1")]));
    }

    #[test]
    fn test_parse_missing_equals() {
        assert_eq!(parse("flag&a=1"), pairs(&[("flag", ""), ("a", "1")]));
    }

    #[test]
    fn test_parse_splits_at_first_equals() {
        assert_eq!(parse("a=b=c"), pairs(&[("a", "b=c")]));
    }

    #[test]
    fn test_parse_plus_and_percent() {
        assert_eq!(parse("a+b=c+d"), pairs(&[("a b", "c d")]));
        assert_eq!(parse("k=%C3%A9"), pairs(&[("k", "é")]));
        // Malformed escapes stay literal
        assert_eq!(parse("k=%zz"), pairs(&[("k", "%zz")]));
    }

    #[test]
    fn test_parse_percent_before_multibyte() {
        // A % directly followed by non-ASCII text must not be treated as
        // an escape (and must not panic on the char boundary)
        assert_eq!(parse("k=%€"), pairs(&[("k", "%€")]));
        assert_eq!(parse("k=%é"), pairs(&[("k", "%é")]));
        assert_eq!(parse("%€=v"), pairs(&[("%€", "v")]));
    }

    #[test]
    fn test_serialize_basic() {
        assert_eq!(serialize(&pairs(&[("a", "1"), ("b", "2")])), "a=1&b=2");
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn test_serialize_space_as_plus() {
        assert_eq!(serialize(&pairs(&[("k", "a b")])), "k=a+b");
    }

    #[test]
    fn test_serialize_reserved_characters() {
        assert_eq!(serialize(&pairs(&[("k", "a&b=c")])), "k=a%26b%3Dc");
        // * - . _ stay literal, ~ does not
        assert_eq!(serialize(&pairs(&[("k", "*-._~")])), "k=*-._%7E");
    }

    #[test]
    fn test_serialize_utf8() {
        assert_eq!(serialize(&pairs(&[("k", "é")])), "k=%C3%A9");
    }

    #[test]
    fn test_roundtrip() {
        let list = pairs(&[("a b", "c&d"), ("é", "+"), ("", "")]);
        assert_eq!(parse(&serialize(&list)), list);
    }
}

/// IPv6 address parsing and serialization per the WHATWG URL host parser.
use crate::compat::{String, Vec};
use crate::error::{ParseError, Result};
use core::fmt::Write;

/// Parse an IPv6 address without brackets (e.g. `::1` or `2001:db8::1`).
/// Returns the 8 u16 pieces if valid.
pub fn parse_ipv6(input: &str) -> Result<[u16; 8]> {
    let input = input
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(input);

    if input.is_empty() {
        return Err(ParseError::InvalidIpv6);
    }

    // Zone identifiers are not allowed in URLs
    if input.contains('%') {
        return Err(ParseError::InvalidIpv6);
    }

    let has_embedded_ipv4 = input
        .rfind(':')
        .is_some_and(|pos| input[pos + 1..].contains('.'));

    if has_embedded_ipv4 {
        parse_with_embedded_ipv4(input)
    } else {
        parse_pieces_only(input)
    }
}

fn parse_pieces_only(input: &str) -> Result<[u16; 8]> {
    let mut pieces = [0u16; 8];

    let Some(compress) = input.find("::") else {
        // No compression: exactly 8 pieces required
        let parsed = parse_piece_list(input)?;
        if parsed.len() != 8 {
            return Err(ParseError::InvalidIpv6);
        }
        pieces.copy_from_slice(&parsed);
        return Ok(pieces);
    };

    let before = parse_piece_list(&input[..compress])?;
    let after = parse_piece_list(&input[compress + 2..])?;

    let total = before.len() + after.len();
    if total > 7 {
        return Err(ParseError::InvalidIpv6);
    }

    for (i, &piece) in before.iter().enumerate() {
        pieces[i] = piece;
    }
    let after_start = before.len() + (8 - total);
    for (i, &piece) in after.iter().enumerate() {
        pieces[after_start + i] = piece;
    }

    Ok(pieces)
}

/// Parse an address whose tail is dotted IPv4 (e.g. `::ffff:192.168.1.1`).
fn parse_with_embedded_ipv4(input: &str) -> Result<[u16; 8]> {
    let last_colon = input.rfind(':').ok_or(ParseError::InvalidIpv6)?;
    let head = &input[..last_colon];
    let tail = &input[last_colon + 1..];

    let ipv4 = parse_dotted_quad(tail)?;
    let ipv4_high = (ipv4 >> 16) as u16;
    let ipv4_low = (ipv4 & 0xFFFF) as u16;

    let mut pieces = [0u16; 8];

    if head.is_empty() || head == ":" {
        pieces[6] = ipv4_high;
        pieces[7] = ipv4_low;
        return Ok(pieces);
    }

    if let Some(compress) = head.find("::") {
        let before = parse_piece_list(&head[..compress])?;
        let after = parse_piece_list(&head[compress + 2..])?;

        let total = before.len() + after.len();
        if total > 6 {
            return Err(ParseError::InvalidIpv6);
        }

        for (i, &piece) in before.iter().enumerate() {
            pieces[i] = piece;
        }
        let after_start = before.len() + (6 - total);
        for (i, &piece) in after.iter().enumerate() {
            pieces[after_start + i] = piece;
        }
    } else {
        let parsed = parse_piece_list(head)?;
        if parsed.len() != 6 {
            return Err(ParseError::InvalidIpv6);
        }
        pieces[..6].copy_from_slice(&parsed);
    }

    pieces[6] = ipv4_high;
    pieces[7] = ipv4_low;

    Ok(pieces)
}

/// Parse a single hex piece (0-ffff).
fn parse_piece(s: &str) -> Result<u16> {
    if s.is_empty() || s.len() > 4 {
        return Err(ParseError::InvalidIpv6);
    }
    u16::from_str_radix(s, 16).map_err(|_| ParseError::InvalidIpv6)
}

fn parse_piece_list(s: &str) -> Result<Vec<u16>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(':').map(parse_piece).collect()
}

/// Strict dotted-quad IPv4 for embedding inside IPv6 (no octal/hex labels).
fn parse_dotted_quad(s: &str) -> Result<u32> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return Err(ParseError::InvalidIpv4);
    }

    parts.iter().try_fold(0u32, |acc, part| {
        if part.len() > 1 && part.starts_with('0') {
            return Err(ParseError::InvalidIpv4);
        }
        let byte: u8 = part.parse().map_err(|_| ParseError::InvalidIpv4)?;
        Ok((acc << 8) | u32::from(byte))
    })
}

/// Serialize IPv6 pieces to canonical form, compressing the longest run of
/// zero pieces with `::`. Brackets are the host serializer's concern.
pub fn serialize_ipv6(pieces: &[u16; 8]) -> String {
    let (compress_start, compress_len) = find_longest_zero_run(pieces);

    let mut result = String::with_capacity(39);

    // Only runs of 2+ zero pieces are compressed
    let compress = compress_start
        .filter(|_| compress_len > 1)
        .map(|start| start..start + compress_len);

    let mut i = 0;
    while i < 8 {
        if let Some(ref range) = compress
            && range.start == i
        {
            result.push_str("::");
            i = range.end;
            continue;
        }

        if i > 0 && !result.ends_with("::") {
            result.push(':');
        }

        let _ = write!(&mut result, "{:x}", pieces[i]);
        i += 1;
    }

    result
}

fn find_longest_zero_run(pieces: &[u16; 8]) -> (Option<usize>, usize) {
    let mut best_start: Option<usize> = None;
    let mut best_len = 0;
    let mut current_start: Option<usize> = None;
    let mut current_len = 0;

    for (i, &piece) in pieces.iter().enumerate() {
        if piece == 0 {
            if current_start.is_none() {
                current_start = Some(i);
            }
            current_len += 1;
            if current_len > best_len {
                best_start = current_start;
                best_len = current_len;
            }
        } else {
            current_start = None;
            current_len = 0;
        }
    }

    (best_start, best_len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let pieces = parse_ipv6("2001:db8:0:0:0:0:0:1").unwrap();
        assert_eq!(pieces[0], 0x2001);
        assert_eq!(pieces[1], 0x0db8);
        assert_eq!(pieces[7], 1);
    }

    #[test]
    fn test_parse_compressed() {
        assert_eq!(parse_ipv6("::1").unwrap(), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(parse_ipv6("1::").unwrap(), [1, 0, 0, 0, 0, 0, 0, 0]);
        let pieces = parse_ipv6("2001:db8::1").unwrap();
        assert_eq!(pieces[1], 0x0db8);
        assert_eq!(pieces[7], 1);
    }

    #[test]
    fn test_parse_embedded_ipv4() {
        let pieces = parse_ipv6("::ffff:192.168.1.1").unwrap();
        assert_eq!(pieces[5], 0xffff);
        assert_eq!(pieces[6], 0xC0A8);
        assert_eq!(pieces[7], 0x0101);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_ipv6("").is_err());
        assert!(parse_ipv6("1:2:3").is_err());
        assert!(parse_ipv6("1:2:3:4:5:6:7:8:9").is_err());
        assert!(parse_ipv6("fe80::1%eth0").is_err());
        assert!(parse_ipv6("12345::").is_err());
        assert!(parse_ipv6("::192.168.1").is_err());
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serialize_ipv6(&[0, 0, 0, 0, 0, 0, 0, 1]), "::1");
        assert_eq!(serialize_ipv6(&[1, 0, 0, 0, 0, 0, 0, 0]), "1::");
        assert_eq!(
            serialize_ipv6(&[0x2001, 0xdb8, 0, 0, 0, 0, 0, 1]),
            "2001:db8::1"
        );
        // A single zero piece is not compressed
        assert_eq!(
            serialize_ipv6(&[1, 0, 2, 3, 4, 5, 6, 7]),
            "1:0:2:3:4:5:6:7"
        );
    }

    #[test]
    fn test_roundtrip() {
        for addr in ["::1", "2001:db8::1", "1:2:3:4:5:6:7:8", "fe80::"] {
            let pieces = parse_ipv6(addr).unwrap();
            assert_eq!(serialize_ipv6(&pieces), addr);
        }
    }
}

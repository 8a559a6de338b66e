/// IPv4 address parser supporting decimal, octal, and hexadecimal labels,
/// per the WHATWG URL host parser.
use crate::compat::{String, Vec, format};
use crate::error::{ParseError, Result};

/// Parse an IPv4 address string into a u32.
///
/// Accepts up to four dot-separated labels, each decimal (`192`), octal
/// (`0300`), or hexadecimal (`0xC0`); a trailing dot is ignored. The last
/// label fills all remaining bytes.
pub fn parse_ipv4(input: &str) -> Result<u32> {
    if input.is_empty() {
        return Err(ParseError::InvalidIpv4);
    }

    let input = input.strip_suffix('.').unwrap_or(input);

    let labels: Vec<&str> = input.split('.').collect();
    if labels.is_empty() || labels.len() > 4 {
        return Err(ParseError::InvalidIpv4);
    }

    let numbers: Vec<u64> = labels
        .iter()
        .map(|label| parse_ipv4_number(label))
        .collect::<Result<Vec<_>>>()?;

    // The last number must fit in the bytes it covers
    let count = numbers.len();
    let last = numbers[count - 1];
    if last >= 256u64.pow((5 - count) as u32) {
        return Err(ParseError::InvalidIpv4);
    }

    // All leading numbers are single bytes
    if numbers.iter().take(count - 1).any(|&n| n >= 256) {
        return Err(ParseError::InvalidIpv4);
    }

    let mut address: u32 = 0;
    for (i, &number) in numbers.iter().enumerate().take(count - 1) {
        address |= (number as u32) << ((3 - i) * 8);
    }
    address |= numbers[count - 1] as u32;

    Ok(address)
}

/// Parse a single IPv4 label (decimal, hex, or octal).
fn parse_ipv4_number(input: &str) -> Result<u64> {
    if input.is_empty() {
        return Err(ParseError::InvalidIpv4);
    }

    if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        // A bare "0x" label counts as zero
        return if hex.is_empty() {
            Ok(0)
        } else {
            u64::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidIpv4)
        };
    }

    if input.len() >= 2 && input.starts_with('0') {
        return u64::from_str_radix(input, 8).map_err(|_| ParseError::InvalidIpv4);
    }

    input.parse::<u64>().map_err(|_| ParseError::InvalidIpv4)
}

/// Serialize an IPv4 address to dotted decimal notation
pub fn serialize_ipv4(address: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (address >> 24) & 0xFF,
        (address >> 16) & 0xFF,
        (address >> 8) & 0xFF,
        address & 0xFF
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreadable_literal)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_ipv4("192.168.1.1").unwrap(), 0xC0A80101);
        assert_eq!(parse_ipv4("127.0.0.1").unwrap(), 0x7F000001);
        assert_eq!(parse_ipv4("127.0.0.1.").unwrap(), 0x7F000001);
    }

    #[test]
    fn test_parse_hex_and_octal() {
        assert_eq!(parse_ipv4("0xC0A80101").unwrap(), 0xC0A80101);
        assert_eq!(parse_ipv4("192.0x00A80001").unwrap(), 0xC0A80001);
        assert_eq!(parse_ipv4("0300.0250.01.01").unwrap(), 0xC0A80101);
    }

    #[test]
    fn test_parse_short_forms() {
        // Fewer than four labels: the last one fills the rest
        assert_eq!(parse_ipv4("127.1").unwrap(), 0x7F000001);
        assert_eq!(parse_ipv4("2130706433").unwrap(), 0x7F000001);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_ipv4("").is_err());
        assert!(parse_ipv4("1.2.3.4.5").is_err());
        assert!(parse_ipv4("256.1.1.1").is_err());
        assert!(parse_ipv4("1.2.3.4294967296").is_err());
        assert!(parse_ipv4("1..2").is_err());
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serialize_ipv4(0xC0A80101), "192.168.1.1");
        assert_eq!(serialize_ipv4(0x7F000001), "127.0.0.1");
        assert_eq!(serialize_ipv4(0), "0.0.0.0");
    }
}

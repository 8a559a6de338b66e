use crate::checkers::looks_like_ipv4;
use crate::compat::String;
use crate::error::{ParseError, Result};
use crate::ipv4::{parse_ipv4, serialize_ipv4};
use crate::ipv6::{parse_ipv6, serialize_ipv6};
use crate::unicode::idna::domain_to_ascii;
use crate::unicode::percent_encode::{BODY_SET, percent_decode_lossy, percent_encode_into};

/// A parsed host value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    /// An ASCII domain or a serialized IPv4 address
    Domain(String),
    /// A serialized IPv6 address, stored without brackets
    Ipv6(String),
    /// An opaque host (non-special schemes), stored percent-encoded
    Opaque(String),
    /// The empty host
    Empty,
}

impl Host {
    /// True for the empty host.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl core::fmt::Display for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Domain(payload) | Self::Opaque(payload) => f.write_str(payload),
            Self::Ipv6(payload) => write!(f, "[{payload}]"),
            Self::Empty => Ok(()),
        }
    }
}

// Code points that may never appear in a domain or opaque host. The opaque
// check skips `%` so percent escapes survive.
fn is_forbidden_host_code_point(c: char, allow_percent: bool) -> bool {
    match c {
        '\0' | '\t' | '\n' | '\r' | ' ' | '#' | '/' | ':' | '<' | '>' | '?' | '@' | '[' | '\\'
        | ']' | '^' | '|' => true,
        '%' => !allow_percent,
        _ => false,
    }
}

/// Parse a host string.
///
/// Special schemes get domain-to-ASCII plus IPv4 recognition; non-special
/// schemes keep the host opaque, percent-encoded. A `[`-prefixed input must
/// close its bracket and parse as IPv6 either way.
pub fn parse_host(input: &str, is_special: bool) -> Result<Host> {
    if let Some(rest) = input.strip_prefix('[') {
        let Some(inner) = rest.strip_suffix(']') else {
            return Err(ParseError::InvalidIpv6);
        };
        let pieces = parse_ipv6(inner)?;
        return Ok(Host::Ipv6(serialize_ipv6(&pieces)));
    }

    if input.is_empty() {
        return Ok(Host::Empty);
    }

    if !is_special {
        return parse_opaque_host(input);
    }

    let decoded = percent_decode_lossy(input);
    let ascii = domain_to_ascii(&decoded)?;
    if ascii.is_empty() {
        return Ok(Host::Empty);
    }
    if ascii.chars().any(|c| is_forbidden_host_code_point(c, false)) {
        return Err(ParseError::InvalidHost);
    }

    if looks_like_ipv4(&ascii) {
        let address = parse_ipv4(&ascii)?;
        return Ok(Host::Domain(serialize_ipv4(address)));
    }

    Ok(Host::Domain(ascii))
}

fn parse_opaque_host(input: &str) -> Result<Host> {
    if input.chars().any(|c| is_forbidden_host_code_point(c, true)) {
        return Err(ParseError::InvalidHost);
    }

    let mut encoded = String::with_capacity(input.len());
    percent_encode_into(&mut encoded, input, BODY_SET);
    Ok(Host::Opaque(encoded))
}

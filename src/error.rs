/// Errors that can occur while parsing a URL or building search params
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid scheme format
    InvalidScheme,
    /// Invalid host format
    InvalidHost,
    /// Invalid port number
    InvalidPort,
    /// Invalid IPv4 address
    InvalidIpv4,
    /// Invalid IPv6 address
    InvalidIpv6,
    /// IDNA processing error
    IdnaError,
    /// Relative URL without a base
    RelativeUrlWithoutBase,
    /// Name/value pair that is not exactly two elements long
    InvalidPair,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::InvalidScheme => "Invalid scheme",
            Self::InvalidHost => "Invalid host",
            Self::InvalidPort => "Invalid port",
            Self::InvalidIpv4 => "Invalid IPv4 address",
            Self::InvalidIpv6 => "Invalid IPv6 address",
            Self::IdnaError => "IDNA processing error",
            Self::RelativeUrlWithoutBase => "Relative URL without a base",
            Self::InvalidPair => "Name/value pair must have exactly two elements",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Result type for URL parsing operations
pub type Result<T> = core::result::Result<T, ParseError>;

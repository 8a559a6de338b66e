/// Special URL scheme classification.
///
/// `Gopher` is kept in the table for compatibility with older user agents
/// even though the living standard no longer treats it as special.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeType {
    Ftp,
    File,
    Gopher,
    Http,
    Https,
    Ws,
    Wss,
    #[default]
    NotSpecial,
}

impl SchemeType {
    /// Check if this is a special scheme
    pub fn is_special(self) -> bool {
        self != Self::NotSpecial
    }

    /// Get the default port for this scheme.
    /// `file:` carries 0 in the relative-scheme table.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Self::Ftp => Some(21),
            Self::File => Some(0),
            Self::Gopher => Some(70),
            Self::Http | Self::Ws => Some(80),
            Self::Https | Self::Wss => Some(443),
            Self::NotSpecial => None,
        }
    }
}

/// Get the scheme type from a scheme string.
/// Filters by length and first byte to minimize full comparisons.
pub fn get_scheme_type(scheme: &str) -> SchemeType {
    let bytes = scheme.as_bytes();

    match (bytes.len(), bytes.first()) {
        (2, Some(b'w')) if bytes == b"ws" => SchemeType::Ws,
        (3, Some(b'w')) if bytes == b"wss" => SchemeType::Wss,
        (3, Some(b'f')) if bytes == b"ftp" => SchemeType::Ftp,
        (4, Some(b'h')) if bytes == b"http" => SchemeType::Http,
        (4, Some(b'f')) if bytes == b"file" => SchemeType::File,
        (5, Some(b'h')) if bytes == b"https" => SchemeType::Https,
        (6, Some(b'g')) if bytes == b"gopher" => SchemeType::Gopher,
        _ => SchemeType::NotSpecial,
    }
}

/// Default port for a scheme string, if it is a special scheme.
pub fn default_port(scheme: &str) -> Option<u16> {
    get_scheme_type(scheme).default_port()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_type() {
        assert_eq!(get_scheme_type("http"), SchemeType::Http);
        assert_eq!(get_scheme_type("https"), SchemeType::Https);
        assert_eq!(get_scheme_type("gopher"), SchemeType::Gopher);
        assert_eq!(get_scheme_type("custom"), SchemeType::NotSpecial);
        assert!(!get_scheme_type("HTTP").is_special());
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(default_port("http"), Some(80));
        assert_eq!(default_port("wss"), Some(443));
        assert_eq!(default_port("ftp"), Some(21));
        assert_eq!(default_port("gopher"), Some(70));
        assert_eq!(default_port("file"), Some(0));
        assert_eq!(default_port("mailto"), None);
    }
}

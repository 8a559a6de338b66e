use crate::compat::Cow;

/// Check if a character is an ASCII tab or newline
pub fn is_ascii_tab_or_newline(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
}

/// Fast check if string contains tabs or newlines
pub fn has_tabs_or_newline(input: &str) -> bool {
    memchr::memchr3(b'\t', b'\n', b'\r', input.as_bytes()).is_some()
}

/// Trim leading and trailing C0 controls and spaces per the WHATWG URL spec.
pub fn trim_c0_controls_and_space(input: &str) -> &str {
    input.trim_matches(|c: char| c as u32 <= 0x20)
}

/// Remove internal ASCII tabs and newlines.
/// Returns a Cow to avoid allocation for the common clean case.
pub fn remove_tabs_and_newlines(input: &str) -> Cow<'_, str> {
    if !has_tabs_or_newline(input) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .chars()
            .filter(|&c| !is_ascii_tab_or_newline(c))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_c0_controls_and_space() {
        assert_eq!(trim_c0_controls_and_space("  http://a  "), "http://a");
        assert_eq!(trim_c0_controls_and_space("\t\nhello\r\n"), "hello");
        assert_eq!(trim_c0_controls_and_space("\x00url\x1f"), "url");
        assert_eq!(trim_c0_controls_and_space("\t\n\r"), "");
    }

    #[test]
    fn test_remove_tabs_and_newlines() {
        assert_eq!(remove_tabs_and_newlines("hel\tlo\nworld"), "helloworld");
        assert_eq!(remove_tabs_and_newlines("hello"), "hello");
        // Spaces survive, only tabs and newlines are stripped
        assert_eq!(remove_tabs_and_newlines("a b\rc"), "a bc");
    }
}

use core::mem;

use super::State;
use crate::checkers::{
    is_double_dot_segment, is_normalized_windows_drive_letter, is_single_dot_segment,
    is_windows_drive_letter, starts_with_windows_drive_letter,
};
use crate::compat::{String, ToString, Vec, format};
use crate::error::{ParseError, Result};
use crate::helpers;
use crate::host::{Host, parse_host};
use crate::record::UrlRecord;
use crate::scheme::{default_port, get_scheme_type};
use crate::unicode::percent_encode::{BODY_SET, QUERY_SET, percent_encode_char};

/// Parse a complete URL string, optionally against a base record.
///
/// Leading/trailing C0 controls and spaces and all inner ASCII tabs and
/// newlines are stripped first; both are validation errors but never fatal.
///
/// # Errors
///
/// Returns an error when the input is not a valid URL per the WHATWG URL
/// Standard (missing scheme without a base, invalid host, port out of
/// range, and so on).
pub fn parse_url(input: &str, base: Option<&UrlRecord>) -> Result<UrlRecord> {
    let trimmed = helpers::trim_c0_controls_and_space(input);
    let cleaned = helpers::remove_tabs_and_newlines(trimmed);

    let mut url = UrlRecord::new();
    Machine::new(&cleaned, base, &mut url, None).run()?;
    Ok(url)
}

/// Re-parse one component of an existing record in place, starting in the
/// override state. This is the attribute-setter entry point: edge trimming
/// is skipped, only tabs and newlines are removed.
pub(crate) fn parse_into(
    input: &str,
    base: Option<&UrlRecord>,
    url: &mut UrlRecord,
    state_override: State,
) -> Result<()> {
    let cleaned = helpers::remove_tabs_and_newlines(input);
    Machine::new(&cleaned, base, url, Some(state_override)).run()
}

/// Outcome of one state-machine step: keep consuming, or an early return
/// requested by a state override.
enum Step {
    Continue,
    Return,
}

struct Machine<'a> {
    input: Vec<char>,
    base: Option<&'a UrlRecord>,
    url: &'a mut UrlRecord,
    state_override: Option<State>,
    state: State,
    buffer: String,
    at_sign_seen: bool,
    password_token_seen: bool,
    inside_brackets: bool,
    pointer: isize,
}

impl<'a> Machine<'a> {
    fn new(
        input: &str,
        base: Option<&'a UrlRecord>,
        url: &'a mut UrlRecord,
        state_override: Option<State>,
    ) -> Self {
        Self {
            input: input.chars().collect(),
            base,
            url,
            state_override,
            state: state_override.unwrap_or(State::SchemeStart),
            buffer: String::new(),
            at_sign_seen: false,
            password_token_seen: false,
            inside_brackets: false,
            pointer: 0,
        }
    }

    /// Run the machine until the EOF sentinel is processed without a
    /// cursor rewind, or a state requests an early return.
    ///
    /// States that need to re-read the current code point in a new state
    /// decrement the cursor; the increment at the bottom of the loop then
    /// lands on the same position again. The same trick replays the EOF
    /// sentinel for a successor state.
    fn run(mut self) -> Result<()> {
        let eof = self.input.len() as isize;
        loop {
            let c = if self.pointer >= 0 && self.pointer < eof {
                Some(self.input[self.pointer as usize])
            } else {
                None
            };
            if let Step::Return = self.step(c)? {
                return Ok(());
            }
            if self.pointer == eof {
                return Ok(());
            }
            self.pointer += 1;
        }
    }

    fn char_at(&self, index: isize) -> Option<char> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.input.get(i))
            .copied()
    }

    fn step(&mut self, c: Option<char>) -> Result<Step> {
        match self.state {
            State::SchemeStart => self.scheme_start_state(c),
            State::Scheme => self.scheme_state(c),
            State::NoScheme => self.no_scheme_state(c),
            State::SpecialRelativeOrAuthority => self.special_relative_or_authority_state(c),
            State::PathOrAuthority => self.path_or_authority_state(c),
            State::Relative => self.relative_state(c),
            State::RelativeSlash => self.relative_slash_state(c),
            State::SpecialAuthoritySlashes => self.special_authority_slashes_state(c),
            State::SpecialAuthorityIgnoreSlashes => self.special_authority_ignore_slashes_state(c),
            State::Authority => self.authority_state(c),
            State::Host | State::Hostname => self.host_state(c),
            State::Port => self.port_state(c),
            State::File => self.file_state(c),
            State::FileSlash => self.file_slash_state(c),
            State::FileHost => self.file_host_state(c),
            State::PathStart => self.path_start_state(c),
            State::Path => self.path_state(c),
            State::CannotBeABaseUrlPath => self.cannot_be_a_base_url_path_state(c),
            State::Query => self.query_state(c),
            State::Fragment => self.fragment_state(c),
        }
    }

    fn scheme_start_state(&mut self, c: Option<char>) -> Result<Step> {
        match c {
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.buffer.push(ch.to_ascii_lowercase());
                self.state = State::Scheme;
            }
            _ if self.state_override.is_none() => {
                self.state = State::NoScheme;
                self.pointer -= 1;
            }
            _ => return Err(ParseError::InvalidScheme),
        }
        Ok(Step::Continue)
    }

    fn scheme_state(&mut self, c: Option<char>) -> Result<Step> {
        match c {
            Some(ch) if ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.') => {
                self.buffer.push(ch.to_ascii_lowercase());
            }
            Some(':') => {
                if self.state_override.is_some() {
                    let buffer_is_special = get_scheme_type(&self.buffer).is_special();
                    if self.url.is_special() != buffer_is_special {
                        return Ok(Step::Return);
                    }
                    if (self.url.includes_credentials() || self.url.port.is_some())
                        && self.buffer == "file"
                    {
                        return Ok(Step::Return);
                    }
                    if self.url.scheme == "file"
                        && !matches!(&self.url.host, Some(host) if !host.is_empty())
                    {
                        return Ok(Step::Return);
                    }
                }
                self.url.scheme = mem::take(&mut self.buffer);
                if self.state_override.is_some() {
                    if self.url.port == default_port(&self.url.scheme) {
                        self.url.port = None;
                    }
                    return Ok(Step::Return);
                }
                if self.url.scheme == "file" {
                    self.state = State::File;
                } else if self.url.is_special()
                    && self.base.is_some_and(|base| base.scheme == self.url.scheme)
                {
                    self.state = State::SpecialRelativeOrAuthority;
                } else if self.url.is_special() {
                    self.state = State::SpecialAuthoritySlashes;
                } else if self.char_at(self.pointer + 1) == Some('/') {
                    self.state = State::PathOrAuthority;
                    self.pointer += 1;
                } else {
                    self.url.cannot_be_a_base = true;
                    self.url.path.push(String::new());
                    self.state = State::CannotBeABaseUrlPath;
                }
            }
            _ if self.state_override.is_none() => {
                // Not a scheme after all: start over in no-scheme state
                self.buffer.clear();
                self.state = State::NoScheme;
                self.pointer = -1;
            }
            _ => return Err(ParseError::InvalidScheme),
        }
        Ok(Step::Continue)
    }

    fn no_scheme_state(&mut self, c: Option<char>) -> Result<Step> {
        let Some(base) = self.base else {
            return Err(ParseError::RelativeUrlWithoutBase);
        };
        if base.cannot_be_a_base {
            if c != Some('#') {
                return Err(ParseError::RelativeUrlWithoutBase);
            }
            self.url.scheme = base.scheme.clone();
            self.url.path = base.path.clone();
            self.url.query = base.query.clone();
            self.url.fragment = Some(String::new());
            self.url.cannot_be_a_base = true;
            self.state = State::Fragment;
        } else if base.scheme != "file" {
            self.state = State::Relative;
            self.pointer -= 1;
        } else {
            self.state = State::File;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn special_relative_or_authority_state(&mut self, c: Option<char>) -> Result<Step> {
        if c == Some('/') && self.char_at(self.pointer + 1) == Some('/') {
            self.state = State::SpecialAuthorityIgnoreSlashes;
            self.pointer += 1;
        } else {
            self.state = State::Relative;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn path_or_authority_state(&mut self, c: Option<char>) -> Result<Step> {
        if c == Some('/') {
            self.state = State::Authority;
        } else {
            self.state = State::Path;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn relative_state(&mut self, c: Option<char>) -> Result<Step> {
        let Some(base) = self.base else {
            return Err(ParseError::RelativeUrlWithoutBase);
        };
        self.url.scheme = base.scheme.clone();
        match c {
            None => {
                self.url.username = base.username.clone();
                self.url.password = base.password.clone();
                self.url.host = base.host.clone();
                self.url.port = base.port;
                self.url.path = base.path.clone();
                self.url.query = base.query.clone();
            }
            Some('/') => self.state = State::RelativeSlash,
            Some('?') => {
                self.url.username = base.username.clone();
                self.url.password = base.password.clone();
                self.url.host = base.host.clone();
                self.url.port = base.port;
                self.url.path = base.path.clone();
                self.url.query = Some(String::new());
                self.state = State::Query;
            }
            Some('#') => {
                self.url.username = base.username.clone();
                self.url.password = base.password.clone();
                self.url.host = base.host.clone();
                self.url.port = base.port;
                self.url.path = base.path.clone();
                self.url.query = base.query.clone();
                self.url.fragment = Some(String::new());
                self.state = State::Fragment;
            }
            Some('\\') if self.url.is_special() => self.state = State::RelativeSlash,
            Some(_) => {
                self.url.username = base.username.clone();
                self.url.password = base.password.clone();
                self.url.host = base.host.clone();
                self.url.port = base.port;
                self.url.path = base.path.clone();
                self.url.path.pop();
                self.state = State::Path;
                self.pointer -= 1;
            }
        }
        Ok(Step::Continue)
    }

    fn relative_slash_state(&mut self, c: Option<char>) -> Result<Step> {
        if self.url.is_special() && matches!(c, Some('/') | Some('\\')) {
            self.state = State::SpecialAuthorityIgnoreSlashes;
        } else if c == Some('/') {
            self.state = State::Authority;
        } else {
            let Some(base) = self.base else {
                return Err(ParseError::RelativeUrlWithoutBase);
            };
            self.url.username = base.username.clone();
            self.url.password = base.password.clone();
            self.url.host = base.host.clone();
            self.url.port = base.port;
            self.state = State::Path;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn special_authority_slashes_state(&mut self, c: Option<char>) -> Result<Step> {
        if c == Some('/') && self.char_at(self.pointer + 1) == Some('/') {
            self.state = State::SpecialAuthorityIgnoreSlashes;
            self.pointer += 1;
        } else {
            self.state = State::SpecialAuthorityIgnoreSlashes;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn special_authority_ignore_slashes_state(&mut self, c: Option<char>) -> Result<Step> {
        if !matches!(c, Some('/') | Some('\\')) {
            self.state = State::Authority;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn authority_state(&mut self, c: Option<char>) -> Result<Step> {
        if c == Some('@') {
            if self.at_sign_seen {
                self.buffer.insert_str(0, "%40");
            }
            self.at_sign_seen = true;

            // Commit the buffered userinfo through the userinfo encoder
            let buffer = mem::take(&mut self.buffer);
            for ch in buffer.chars() {
                if ch == ':' && !self.password_token_seen {
                    self.password_token_seen = true;
                    continue;
                }
                let target = if self.password_token_seen {
                    &mut self.url.password
                } else {
                    &mut self.url.username
                };
                percent_encode_char(target, ch, BODY_SET);
            }
        } else if matches!(c, None | Some('/') | Some('?') | Some('#'))
            || (c == Some('\\') && self.url.is_special())
        {
            if self.at_sign_seen && self.buffer.is_empty() {
                return Err(ParseError::InvalidHost);
            }
            // Rewind past the buffered text and re-parse it as a host
            self.pointer -= self.buffer.chars().count() as isize + 1;
            self.buffer.clear();
            self.state = State::Host;
        } else if let Some(ch) = c {
            self.buffer.push(ch);
        }
        Ok(Step::Continue)
    }

    fn host_state(&mut self, c: Option<char>) -> Result<Step> {
        if self.state_override.is_some() && self.url.scheme == "file" {
            self.pointer -= 1;
            self.state = State::FileHost;
        } else if c == Some(':') && !self.inside_brackets {
            if self.buffer.is_empty() {
                return Err(ParseError::InvalidHost);
            }
            let host = parse_host(&self.buffer, self.url.is_special())?;
            self.url.host = Some(host);
            self.buffer.clear();
            self.state = State::Port;
            if self.state_override == Some(State::Hostname) {
                return Ok(Step::Return);
            }
        } else if matches!(c, None | Some('/') | Some('?') | Some('#'))
            || (c == Some('\\') && self.url.is_special())
        {
            self.pointer -= 1;
            if self.url.is_special() && self.buffer.is_empty() {
                return Err(ParseError::InvalidHost);
            }
            if self.state_override.is_some()
                && self.buffer.is_empty()
                && (self.url.includes_credentials() || self.url.port.is_some())
            {
                // Erasing the host would orphan credentials or a port
                return Ok(Step::Return);
            }
            let host = parse_host(&self.buffer, self.url.is_special())?;
            self.url.host = Some(host);
            self.buffer.clear();
            self.state = State::PathStart;
            if self.state_override.is_some() {
                return Ok(Step::Return);
            }
        } else if let Some(ch) = c {
            if ch == '[' {
                self.inside_brackets = true;
            } else if ch == ']' {
                self.inside_brackets = false;
            }
            self.buffer.push(ch);
        }
        Ok(Step::Continue)
    }

    fn port_state(&mut self, c: Option<char>) -> Result<Step> {
        if let Some(ch) = c
            && ch.is_ascii_digit()
        {
            self.buffer.push(ch);
        } else if matches!(c, None | Some('/') | Some('?') | Some('#'))
            || (c == Some('\\') && self.url.is_special())
            || self.state_override.is_some()
        {
            if !self.buffer.is_empty() {
                let port: u32 = self.buffer.parse().map_err(|_| ParseError::InvalidPort)?;
                if port > u32::from(u16::MAX) {
                    return Err(ParseError::InvalidPort);
                }
                let port = port as u16;
                self.url.port = if default_port(&self.url.scheme) == Some(port) {
                    None
                } else {
                    Some(port)
                };
                self.buffer.clear();
            }
            if self.state_override.is_some() {
                return Ok(Step::Return);
            }
            self.state = State::PathStart;
            self.pointer -= 1;
        } else {
            return Err(ParseError::InvalidPort);
        }
        Ok(Step::Continue)
    }

    fn file_state(&mut self, c: Option<char>) -> Result<Step> {
        self.url.scheme = "file".to_string();
        self.url.host = Some(Host::Empty);
        if matches!(c, Some('/') | Some('\\')) {
            self.state = State::FileSlash;
        } else if let Some(base) = self.base.filter(|base| base.scheme == "file") {
            match c {
                None => {
                    self.url.host = base.host.clone();
                    self.url.path = base.path.clone();
                    self.url.query = base.query.clone();
                }
                Some('?') => {
                    self.url.host = base.host.clone();
                    self.url.path = base.path.clone();
                    self.url.query = Some(String::new());
                    self.state = State::Query;
                }
                Some('#') => {
                    self.url.host = base.host.clone();
                    self.url.path = base.path.clone();
                    self.url.query = base.query.clone();
                    self.url.fragment = Some(String::new());
                    self.state = State::Fragment;
                }
                Some(_) => {
                    if !starts_with_windows_drive_letter(&self.input, self.pointer as usize) {
                        self.url.host = base.host.clone();
                        self.url.path = base.path.clone();
                        self.url.shorten_path();
                    }
                    self.state = State::Path;
                    self.pointer -= 1;
                }
            }
        } else {
            self.state = State::Path;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn file_slash_state(&mut self, c: Option<char>) -> Result<Step> {
        if matches!(c, Some('/') | Some('\\')) {
            self.state = State::FileHost;
        } else {
            if let Some(base) = self.base.filter(|base| base.scheme == "file")
                && !starts_with_windows_drive_letter(&self.input, self.pointer.max(0) as usize)
            {
                // Platform-independent Windows drive letter quirk
                if let Some(first) = base
                    .path
                    .first()
                    .filter(|segment| is_normalized_windows_drive_letter(segment))
                {
                    self.url.path.push(first.clone());
                } else {
                    self.url.host = base.host.clone();
                }
            }
            self.state = State::Path;
            self.pointer -= 1;
        }
        Ok(Step::Continue)
    }

    fn file_host_state(&mut self, c: Option<char>) -> Result<Step> {
        if matches!(c, None | Some('/') | Some('\\') | Some('?') | Some('#')) {
            self.pointer -= 1;
            if self.state_override.is_none() && is_windows_drive_letter(&self.buffer) {
                // Not a host: the buffer is carried into path state as-is
                self.state = State::Path;
            } else if self.buffer.is_empty() {
                self.url.host = Some(Host::Empty);
                if self.state_override.is_some() {
                    return Ok(Step::Return);
                }
                self.state = State::PathStart;
            } else {
                let mut host = parse_host(&self.buffer, self.url.is_special())?;
                if matches!(&host, Host::Domain(domain) if domain == "localhost") {
                    host = Host::Empty;
                }
                self.url.host = Some(host);
                if self.state_override.is_some() {
                    return Ok(Step::Return);
                }
                self.buffer.clear();
                self.state = State::PathStart;
            }
        } else if let Some(ch) = c {
            self.buffer.push(ch);
        }
        Ok(Step::Continue)
    }

    fn path_start_state(&mut self, c: Option<char>) -> Result<Step> {
        if self.url.is_special() {
            self.state = State::Path;
            if !matches!(c, Some('/') | Some('\\')) {
                self.pointer -= 1;
            }
        } else if self.state_override.is_none() && c == Some('?') {
            self.url.query = Some(String::new());
            self.state = State::Query;
        } else if self.state_override.is_none() && c == Some('#') {
            self.url.fragment = Some(String::new());
            self.state = State::Fragment;
        } else if c.is_some() {
            self.state = State::Path;
            if c != Some('/') {
                self.pointer -= 1;
            }
        }
        Ok(Step::Continue)
    }

    fn path_state(&mut self, c: Option<char>) -> Result<Step> {
        let special_backslash = c == Some('\\') && self.url.is_special();
        let at_terminator = matches!(c, None | Some('/'))
            || special_backslash
            || (self.state_override.is_none() && matches!(c, Some('?') | Some('#')));

        if at_terminator {
            let mut buffer = mem::take(&mut self.buffer);
            let segment_ended_without_slash = c != Some('/') && !special_backslash;

            if is_double_dot_segment(&buffer) {
                self.url.shorten_path();
                if segment_ended_without_slash {
                    self.url.path.push(String::new());
                }
            } else if is_single_dot_segment(&buffer) {
                if segment_ended_without_slash {
                    self.url.path.push(String::new());
                }
            } else {
                if self.url.scheme == "file"
                    && self.url.path.is_empty()
                    && is_windows_drive_letter(&buffer)
                {
                    if matches!(&self.url.host, Some(host) if !host.is_empty()) {
                        self.url.host = Some(Host::Empty);
                    }
                    // Normalize the drive letter separator to a colon
                    buffer = format!("{}:", &buffer[..1]);
                }
                self.url.path.push(buffer);
            }

            if self.url.scheme == "file" && matches!(c, None | Some('?') | Some('#')) {
                while self.url.path.len() > 1 && self.url.path[0].is_empty() {
                    self.url.path.remove(0);
                }
            }

            match c {
                Some('?') => {
                    self.url.query = Some(String::new());
                    self.state = State::Query;
                }
                Some('#') => {
                    self.url.fragment = Some(String::new());
                    self.state = State::Fragment;
                }
                _ => {}
            }
        } else if let Some(ch) = c {
            percent_encode_char(&mut self.buffer, ch, BODY_SET);
        }
        Ok(Step::Continue)
    }

    fn cannot_be_a_base_url_path_state(&mut self, c: Option<char>) -> Result<Step> {
        match c {
            Some('?') => {
                self.url.query = Some(String::new());
                self.state = State::Query;
            }
            Some('#') => {
                self.url.fragment = Some(String::new());
                self.state = State::Fragment;
            }
            Some(ch) => {
                if self.url.path.is_empty() {
                    self.url.path.push(String::new());
                }
                percent_encode_char(&mut self.url.path[0], ch, BODY_SET);
            }
            None => {}
        }
        Ok(Step::Continue)
    }

    fn query_state(&mut self, c: Option<char>) -> Result<Step> {
        match c {
            Some('#') if self.state_override.is_none() => {
                self.url.fragment = Some(String::new());
                self.state = State::Fragment;
            }
            Some(ch) => {
                let query = self.url.query.get_or_insert_with(String::new);
                percent_encode_char(query, ch, QUERY_SET);
            }
            None => {}
        }
        Ok(Step::Continue)
    }

    fn fragment_state(&mut self, c: Option<char>) -> Result<Step> {
        match c {
            // U+0000 is a validation error and is dropped
            Some('\0') | None => {}
            Some(ch) => {
                let fragment = self.url.fragment.get_or_insert_with(String::new);
                percent_encode_char(fragment, ch, BODY_SET);
            }
        }
        Ok(Step::Continue)
    }
}

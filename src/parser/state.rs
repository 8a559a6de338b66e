/// URL parser state machine states
/// Based on the WHATWG URL Standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Scheme start state
    SchemeStart,
    /// Scheme state
    Scheme,
    /// No scheme state
    NoScheme,
    /// Special relative or authority state
    SpecialRelativeOrAuthority,
    /// Path or authority state
    PathOrAuthority,
    /// Relative state
    Relative,
    /// Relative slash state
    RelativeSlash,
    /// Special authority slashes state
    SpecialAuthoritySlashes,
    /// Special authority ignore slashes state
    SpecialAuthorityIgnoreSlashes,
    /// Authority state
    Authority,
    /// Host state
    Host,
    /// Hostname state (host without port, used as a setter override)
    Hostname,
    /// Port state
    Port,
    /// File state
    File,
    /// File slash state
    FileSlash,
    /// File host state
    FileHost,
    /// Path start state
    PathStart,
    /// Path state
    Path,
    /// Cannot-be-a-base URL path state
    CannotBeABaseUrlPath,
    /// Query state
    Query,
    /// Fragment state
    Fragment,
}

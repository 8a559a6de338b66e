#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Compatibility layer for std/no_std
mod compat;

// Internal modules (not public API)
mod checkers;
mod error;
mod helpers;
mod host;
mod ipv4;
mod ipv6;
mod parser;
mod record;
mod scheme;
mod unicode;
mod url;
mod url_search_params;
mod urlencoded;

// Public API
pub use error::ParseError;
pub use host::Host;
pub use parser::parse_url;
pub use record::UrlRecord;
pub use scheme::SchemeType;
pub use url::{SearchParamsMut, Url};
pub use url_search_params::{Entries, Keys, UrlSearchParams, Values};

pub type Result<T> = core::result::Result<T, ParseError>;

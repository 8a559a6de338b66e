//! Imports that resolve to `std` or `alloc` depending on the build.

#[cfg(not(feature = "std"))]
pub use alloc::{
    borrow::Cow,
    format,
    string::{String, ToString},
    vec::Vec,
};
#[cfg(feature = "std")]
pub use std::{
    borrow::Cow,
    format,
    string::{String, ToString},
    vec::Vec,
};

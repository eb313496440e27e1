#![doc = include_str!("../README.md")]

pub mod error;
pub mod options;
pub mod value;
pub mod tags;
pub mod decode;

#[cfg(feature = "serde")]
pub mod de;

pub use crate::decode::parser::{Parser, parse_file, parse_str};
pub use crate::error::{Error, Result, SyntaxError};
pub use crate::options::Options;
pub use crate::tags::{Constructor, TagError, TagRegistry, local_tag};
pub use crate::value::Value;

#[cfg(feature = "serde")]
use serde::de::DeserializeOwned;

/// Parse `s` and deserialize the resulting tree into `T`.
#[cfg(feature = "serde")]
pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<T> {
    let v = parse_str(s)?;
    crate::de::from_value(v)
}

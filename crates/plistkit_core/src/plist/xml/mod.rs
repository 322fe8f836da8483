//! Apple XML property list reader and writer.
//!
//! Both directions use the same value model as the binary codec. `Uid` travels as a
//! single-key `CF$UID` dict, dates use second precision, and `Null` has no XML form.

mod reader;
mod writer;

pub use reader::{from_bytes, parse};
pub use writer::{to_vec, write};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const UID_KEY: &str = "CF$UID";
/// Nesting limit for the reader, matching the binary decoder's default.
const MAX_DEPTH: u32 = 512;

#[cfg(test)]
mod tests;

mod decode;
mod dispatch;
mod encode;
mod error;
mod marker;
mod source;
mod trailer;
mod value;
pub mod xml;

/// Binary decoding entry points and limits.
pub use decode::{BinaryDecoder, DecodeOptions, decode_bytes, decode_file, decode_reader};
/// Format detection, auto-detecting parse, and format-routed writes.
pub use dispatch::{Format, parse, parse_bytes, parse_file, parse_reader, parse_with_format, write, write_file};
/// Binary encoding entry points and layout options.
pub use encode::{BinaryEncoder, EncodeOptions, encode_file, encode_to_vec, encode_to_writer};
/// Error and result aliases.
pub use error::{PlistError, Result};
/// Random-access byte sources.
pub use source::{ByteSource, FileSource, MemorySource};
/// Binary trailer record.
pub use trailer::Trailer;
/// Property list value model.
pub use value::{Dict, PLIST_EPOCH_UNIX_MS, PLIST_EPOCH_UNIX_SECS, PlistValue};

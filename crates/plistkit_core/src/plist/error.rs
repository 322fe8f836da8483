use std::sync::Arc;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PlistError>;

/// Errors produced while reading, decoding, encoding, and converting property lists.
///
/// Errors are `Clone` so a decoder can hand out its memoized failure more than once.
#[derive(Debug, Clone, Error)]
pub enum PlistError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(Arc<std::io::Error>),
	/// Source is not a binary property list (bad magic or trailer).
	#[error("not a binary property list: {reason}")]
	Format {
		/// Which structural check failed.
		reason: &'static str,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	Truncated {
		/// Byte offset where the read was attempted.
		at: u64,
		/// Requested bytes.
		need: u64,
		/// Bytes still available.
		rem: u64,
	},
	/// Object header carries a type tag the decoder does not know.
	#[error("unknown object marker 0x{marker:02x} at offset {at}")]
	UnknownType {
		/// Full marker byte.
		marker: u8,
		/// Byte offset of the marker.
		at: u64,
	},
	/// Object graph references an object that is still being decoded.
	#[error("reference cycle through object {index}")]
	Cycle {
		/// Offset-table index that was re-entered.
		index: u64,
	},
	/// Every attempted format failed.
	#[error("no format could parse the input:\n\tbinary: {binary}\n\txml: {xml}")]
	Compound {
		/// Failure from the binary attempt.
		binary: Box<PlistError>,
		/// Failure from the XML attempt.
		xml: Box<PlistError>,
	},
	/// Extended length marker was not followed by an integer object.
	#[error("expected integer length object at offset {at}, found marker 0x{marker:02x}")]
	InvalidLength {
		/// Byte offset of the length object.
		at: u64,
		/// Marker byte found instead.
		marker: u8,
	},
	/// Object payload width is not supported for its kind.
	#[error("unsupported {kind} width {width} at offset {at}")]
	UnsupportedWidth {
		/// Logical object kind.
		kind: &'static str,
		/// Declared payload width in bytes.
		width: u64,
		/// Byte offset of the object marker.
		at: u64,
	},
	/// Object reference points past the end of the offset table.
	#[error("object reference {index} out of range (object count {count})")]
	InvalidObjectRef {
		/// Referenced offset-table index.
		index: u64,
		/// Number of entries in the offset table.
		count: u64,
	},
	/// Offset-table entry points outside the object area.
	#[error("object {index} has offset {offset} outside the object area")]
	InvalidOffset {
		/// Offset-table index.
		index: u64,
		/// Recorded byte offset.
		offset: u64,
	},
	/// Dictionary key object did not decode to a string.
	#[error("dictionary key object {index} is a {kind}, expected string")]
	InvalidDictKey {
		/// Offset-table index of the key object.
		index: u64,
		/// Decoded kind of the key object.
		kind: &'static str,
	},
	/// String payload is not valid in its declared encoding.
	#[error("invalid {encoding} string at offset {at}")]
	InvalidString {
		/// Declared string encoding.
		encoding: &'static str,
		/// Byte offset of the object marker.
		at: u64,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Trailer declares more objects than the configured limit.
	#[error("object count {count} exceeds limit {max}")]
	TooManyObjects {
		/// Declared object count.
		count: u64,
		/// Configured maximum.
		max: u64,
	},
	/// Decoding would materialize more objects than the configured budget.
	#[error("decoded object count exceeds budget {max}")]
	NodeBudgetExceeded {
		/// Configured budget.
		max: u64,
	},
	/// XML plist could not be read or written.
	#[error("xml: {reason}")]
	Xml {
		/// Human-readable failure description.
		reason: String,
	},
	/// Value has no representation in the target format.
	#[error("{kind} values cannot be written as {format}")]
	Unrepresentable {
		/// Logical value kind.
		kind: &'static str,
		/// Target format label.
		format: &'static str,
	},
	/// Host value cannot be converted into the value model.
	#[error("cannot convert {from} to a plist value: {reason}")]
	Unconvertible {
		/// Source type label.
		from: &'static str,
		/// Why the conversion failed.
		reason: String,
	},
}

impl PlistError {
	/// Return `true` for failures meaning "this is not a binary plist at all".
	pub fn is_format(&self) -> bool {
		matches!(self, Self::Format { .. })
	}

	/// Build an XML failure from any displayable cause.
	pub(crate) fn xml(reason: impl std::fmt::Display) -> Self {
		Self::Xml { reason: reason.to_string() }
	}
}

impl From<std::io::Error> for PlistError {
	fn from(err: std::io::Error) -> Self {
		Self::Io(Arc::new(err))
	}
}

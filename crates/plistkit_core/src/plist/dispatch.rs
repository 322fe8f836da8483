use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::plist::marker::MAGIC;
use crate::plist::{BinaryDecoder, BinaryEncoder, ByteSource, FileSource, MemorySource, PlistError, PlistValue, Result, xml};

/// Serialized property list flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	/// `bplist00` binary.
	Binary,
	/// Apple XML.
	Xml,
}

impl Format {
	/// Guess the format from leading bytes without parsing.
	pub fn detect(prefix: &[u8]) -> Self {
		if prefix.starts_with(MAGIC) { Self::Binary } else { Self::Xml }
	}

	/// Lowercase label.
	pub fn label(self) -> &'static str {
		match self {
			Self::Binary => "binary",
			Self::Xml => "xml",
		}
	}
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Parse a property list in either format.
pub fn parse<S: ByteSource>(source: S) -> Result<PlistValue> {
	parse_with_format(source).map(|(value, _)| value)
}

/// Parse a property list and report which format accepted it.
///
/// Binary is tried first. Only a [`PlistError::Format`] failure falls back to XML,
/// from the position the source had on entry; any other binary failure means the
/// input was recognized as binary and is returned unchanged. When XML fails too,
/// both errors come back in [`PlistError::Compound`].
pub fn parse_with_format<S: ByteSource>(mut source: S) -> Result<(PlistValue, Format)> {
	let start = source.pos();
	let binary = match BinaryDecoder::new(&mut source).decode() {
		Ok(value) => return Ok((value, Format::Binary)),
		Err(err) if err.is_format() => err,
		Err(err) => return Err(err),
	};

	source.seek(start)?;
	match xml::parse(&mut source) {
		Ok(value) => Ok((value, Format::Xml)),
		Err(xml) => Err(PlistError::Compound {
			binary: Box::new(binary),
			xml: Box::new(xml),
		}),
	}
}

/// Parse a property list held in memory.
pub fn parse_bytes(bytes: &[u8]) -> Result<PlistValue> {
	parse(MemorySource::new(bytes))
}

/// Parse a property list from a stream, buffering it first.
pub fn parse_reader<R: Read>(reader: R) -> Result<PlistValue> {
	parse(MemorySource::from_reader(reader)?)
}

/// Parse a property list file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<PlistValue> {
	parse(FileSource::open(path)?)
}

/// Serialize `value` in `format` to `sink`.
pub fn write<W: Write>(value: &PlistValue, mut sink: W, format: Format) -> Result<()> {
	match format {
		Format::Binary => BinaryEncoder::default().encode(value, &mut sink),
		Format::Xml => xml::write(value, sink),
	}
}

/// Serialize `value` in `format` into a new file at `path`.
///
/// The file is only created once the value has been rendered, so an unrepresentable
/// value leaves nothing behind.
pub fn write_file(value: &PlistValue, path: impl AsRef<Path>, format: Format) -> Result<()> {
	let bytes = match format {
		Format::Binary => BinaryEncoder::default().to_vec(value),
		Format::Xml => xml::to_vec(value)?,
	};
	let mut sink = BufWriter::new(File::create(path)?);
	sink.write_all(&bytes)?;
	sink.flush()?;
	Ok(())
}

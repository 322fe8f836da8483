use std::io::Read;
use std::path::Path;

use crate::plist::marker::{self, MAGIC};
use crate::plist::{ByteSource, Dict, FileSource, MemorySource, PlistError, PlistValue, Result, Trailer};

/// Runtime limits for binary decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum container nesting depth.
	pub max_depth: u32,
	/// Maximum object count accepted from the trailer.
	pub max_objects: u64,
	/// Maximum number of objects materialized, dict keys included.
	///
	/// Shared references are materialized once per use, so this bounds the output
	/// of documents that fan out through repeated references.
	pub max_nodes: u64,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 512,
			max_objects: 1 << 24,
			max_nodes: 1 << 24,
		}
	}
}

/// Stateful `bplist00` decoder over one source.
///
/// The first call to [`BinaryDecoder::decode`] does all the work; later calls return
/// the cached value or error without touching the source again.
pub struct BinaryDecoder<S> {
	source: S,
	options: DecodeOptions,
	trailer: Option<Trailer>,
	ref_width: usize,
	body_end: u64,
	offsets: Vec<u64>,
	active: Vec<bool>,
	nodes: u64,
	result: Option<Result<PlistValue>>,
}

impl<S: ByteSource> BinaryDecoder<S> {
	/// Create a decoder with default limits.
	pub fn new(source: S) -> Self {
		Self::with_options(source, DecodeOptions::default())
	}

	/// Create a decoder with explicit limits.
	pub fn with_options(source: S, options: DecodeOptions) -> Self {
		Self {
			source,
			options,
			trailer: None,
			ref_width: 1,
			body_end: 0,
			offsets: Vec::new(),
			active: Vec::new(),
			nodes: 0,
			result: None,
		}
	}

	/// Decode the whole document, memoizing the outcome.
	pub fn decode(&mut self) -> Result<PlistValue> {
		if let Some(result) = &self.result {
			return result.clone();
		}

		let result = self.decode_document();
		self.offsets = Vec::new();
		self.active = Vec::new();
		self.result = Some(result.clone());
		result
	}

	/// Trailer of the document, once it has been read.
	pub fn trailer(&self) -> Option<&Trailer> {
		self.trailer.as_ref()
	}

	/// Give the source back, e.g. to retry it as another format.
	pub fn into_inner(self) -> S {
		self.source
	}

	fn decode_document(&mut self) -> Result<PlistValue> {
		let len = self.source.len();
		if len < Trailer::MIN_FILE_SIZE {
			return Err(PlistError::Format {
				reason: "input shorter than magic and trailer",
			});
		}

		self.source.seek(0)?;
		if self.source.read(MAGIC.len() as u64)? != MAGIC {
			return Err(PlistError::Format {
				reason: "missing bplist00 magic",
			});
		}

		self.source.seek(len - Trailer::SIZE as u64)?;
		let trailer = Trailer::parse(&self.source.read(Trailer::SIZE as u64)?)?;
		trailer.validate(len)?;
		if trailer.object_count > self.options.max_objects {
			return Err(PlistError::TooManyObjects {
				count: trailer.object_count,
				max: self.options.max_objects,
			});
		}
		self.trailer = Some(trailer);

		let count = usize::try_from(trailer.object_count).map_err(|_| PlistError::TooManyObjects {
			count: trailer.object_count,
			max: self.options.max_objects,
		})?;
		self.source.seek(trailer.offset_table_offset)?;
		let width = usize::from(trailer.offset_width);
		let mut offsets = Vec::with_capacity(count);
		for _ in 0..count {
			offsets.push(self.source.read_be_uint(width)?);
		}

		self.offsets = offsets;
		self.active = vec![false; count];
		self.ref_width = usize::from(trailer.ref_width);
		self.body_end = trailer.offset_table_offset;

		self.decode_object(trailer.root_object, 0)
	}

	fn decode_object(&mut self, index: u64, depth: u32) -> Result<PlistValue> {
		let slot = usize::try_from(index)
			.ok()
			.filter(|slot| *slot < self.offsets.len())
			.ok_or(PlistError::InvalidObjectRef {
				index,
				count: self.offsets.len() as u64,
			})?;

		if self.active[slot] {
			return Err(PlistError::Cycle { index });
		}
		if depth >= self.options.max_depth {
			return Err(PlistError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		self.nodes += 1;
		if self.nodes > self.options.max_nodes {
			return Err(PlistError::NodeBudgetExceeded {
				max: self.options.max_nodes,
			});
		}

		let offset = self.offsets[slot];
		if offset < MAGIC.len() as u64 || offset >= self.body_end {
			return Err(PlistError::InvalidOffset { index, offset });
		}

		self.active[slot] = true;
		let result = self.decode_at(offset, depth);
		self.active[slot] = false;
		result
	}

	fn decode_at(&mut self, at: u64, depth: u32) -> Result<PlistValue> {
		self.source.seek(at)?;
		let marker_byte = self.source.read_u8()?;
		let (tag, nibble) = marker::split(marker_byte);

		match tag {
			marker::TAG_SIMPLE => match marker_byte {
				marker::NULL => Ok(PlistValue::Null),
				marker::FALSE => Ok(PlistValue::Bool(false)),
				marker::TRUE => Ok(PlistValue::Bool(true)),
				_ => Err(PlistError::UnknownType { marker: marker_byte, at }),
			},
			marker::TAG_INT => self.read_int_body(nibble, at).map(PlistValue::Int),
			marker::TAG_REAL => match 1_u64 << nibble {
				4 => Ok(PlistValue::Real(f64::from(f32::from_bits(self.source.read_be_uint(4)? as u32)))),
				8 => Ok(PlistValue::Real(f64::from_bits(self.source.read_be_uint(8)?))),
				width => Err(PlistError::UnsupportedWidth { kind: "real", width, at }),
			},
			marker::TAG_DATE => {
				if nibble != 3 {
					return Err(PlistError::UnsupportedWidth {
						kind: "date",
						width: 1_u64 << nibble,
						at,
					});
				}
				Ok(PlistValue::Date(f64::from_bits(self.source.read_be_uint(8)?)))
			}
			marker::TAG_DATA => {
				let len = self.read_len(nibble)?;
				Ok(PlistValue::Data(self.source.read(len)?))
			}
			marker::TAG_ASCII => {
				let len = self.read_len(nibble)?;
				let bytes = self.source.read(len)?;
				Ok(PlistValue::Str(bytes.iter().map(|byte| char::from(*byte)).collect()))
			}
			marker::TAG_UTF16 => {
				let units = self.read_len(nibble)?;
				let need = units.checked_mul(2).ok_or(PlistError::Truncated {
					at: self.source.pos(),
					need: u64::MAX,
					rem: self.source.remaining(),
				})?;
				let bytes = self.source.read(need)?;
				let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
				String::from_utf16(&units)
					.map(PlistValue::Str)
					.map_err(|_| PlistError::InvalidString { encoding: "utf-16", at })
			}
			marker::TAG_UID => {
				let width = u64::from(nibble) + 1;
				if width > 8 {
					return Err(PlistError::UnsupportedWidth { kind: "uid", width, at });
				}
				let raw = self.source.read_be_uint(width as usize)?;
				u32::try_from(raw)
					.map(PlistValue::Uid)
					.map_err(|_| PlistError::UnsupportedWidth { kind: "uid", width, at })
			}
			marker::TAG_ARRAY | marker::TAG_SET => {
				let count = self.read_len(nibble)?;
				let refs = self.read_refs(count)?;
				let mut items = Vec::with_capacity(refs.len());
				for index in refs {
					items.push(self.decode_object(index, depth + 1)?);
				}
				Ok(PlistValue::Array(items))
			}
			marker::TAG_DICT => {
				let count = self.read_len(nibble)?;
				let keys = self.read_refs(count)?;
				let values = self.read_refs(count)?;
				let mut entries = Dict::new();
				for (key_index, value_index) in keys.into_iter().zip(values) {
					let key = match self.decode_object(key_index, depth + 1)? {
						PlistValue::Str(key) => key,
						other => {
							return Err(PlistError::InvalidDictKey {
								index: key_index,
								kind: other.kind(),
							});
						}
					};
					let value = self.decode_object(value_index, depth + 1)?;
					entries.insert(key, value);
				}
				Ok(PlistValue::Dict(entries))
			}
			_ => Err(PlistError::UnknownType { marker: marker_byte, at }),
		}
	}

	/// Integer payload after its marker: 1/2/4 bytes unsigned, 8 signed, 16 if it fits `i64`.
	fn read_int_body(&mut self, nibble: u8, at: u64) -> Result<i64> {
		match nibble {
			0..=2 => Ok(self.source.read_be_uint(1 << nibble)? as i64),
			3 => Ok(self.source.read_be_uint(8)? as i64),
			4 => {
				let high = self.source.read_be_uint(8)?;
				let low = self.source.read_be_uint(8)?;
				let wide = (i128::from(high as i64) << 64) | i128::from(low);
				i64::try_from(wide).map_err(|_| PlistError::UnsupportedWidth { kind: "int", width: 16, at })
			}
			_ => Err(PlistError::UnsupportedWidth {
				kind: "int",
				width: 1_u64 << nibble,
				at,
			}),
		}
	}

	fn read_len(&mut self, nibble: u8) -> Result<u64> {
		if nibble != marker::LEN_EXTENDED {
			return Ok(u64::from(nibble));
		}

		let at = self.source.pos();
		let marker_byte = self.source.read_u8()?;
		let (tag, int_nibble) = marker::split(marker_byte);
		if tag != marker::TAG_INT {
			return Err(PlistError::InvalidLength { at, marker: marker_byte });
		}

		let len = self.read_int_body(int_nibble, at)?;
		u64::try_from(len).map_err(|_| PlistError::InvalidLength { at, marker: marker_byte })
	}

	fn read_refs(&mut self, count: u64) -> Result<Vec<u64>> {
		let need = count.checked_mul(self.ref_width as u64).ok_or(PlistError::Truncated {
			at: self.source.pos(),
			need: u64::MAX,
			rem: self.source.remaining(),
		})?;
		let bytes = self.source.read(need)?;
		Ok(bytes
			.chunks_exact(self.ref_width)
			.map(|chunk| chunk.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte)))
			.collect())
	}
}

/// Decode a binary plist held in memory.
pub fn decode_bytes(bytes: &[u8]) -> Result<PlistValue> {
	BinaryDecoder::new(MemorySource::new(bytes)).decode()
}

/// Decode a binary plist from a stream, buffering it first.
pub fn decode_reader<R: Read>(reader: R) -> Result<PlistValue> {
	BinaryDecoder::new(MemorySource::from_reader(reader)?).decode()
}

/// Decode a binary plist file.
pub fn decode_file(path: impl AsRef<Path>) -> Result<PlistValue> {
	BinaryDecoder::new(FileSource::open(path)?).decode()
}

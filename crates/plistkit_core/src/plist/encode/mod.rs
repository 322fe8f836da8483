use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::plist::marker::{self, MAGIC};
use crate::plist::{PlistValue, Result, Trailer};

/// Layout knobs for binary encoding.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
	/// Share one object slot between structurally equal scalars (dict keys included).
	pub coalesce_scalars: bool,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		Self { coalesce_scalars: true }
	}
}

/// `bplist00` writer.
///
/// The tree is flattened in pre-order: a container takes its slot before its
/// children, and a dict's keys (ascending) take theirs before its value subtrees.
/// The root is always object 0.
#[derive(Debug, Clone, Default)]
pub struct BinaryEncoder {
	options: EncodeOptions,
}

impl BinaryEncoder {
	/// Create an encoder.
	pub fn new(options: EncodeOptions) -> Self {
		Self { options }
	}

	/// Encode `value` and write the complete document to `sink`.
	pub fn encode<W: Write>(&self, value: &PlistValue, sink: &mut W) -> Result<()> {
		sink.write_all(&self.to_vec(value))?;
		sink.flush()?;
		Ok(())
	}

	/// Encode `value` into a fresh buffer.
	pub fn to_vec(&self, value: &PlistValue) -> Vec<u8> {
		let mut table = ObjectTable::new(self.options.coalesce_scalars);
		table.flatten(value);
		table.serialize()
	}
}

/// Encode with default options into a buffer.
pub fn encode_to_vec(value: &PlistValue) -> Vec<u8> {
	BinaryEncoder::default().to_vec(value)
}

/// Encode with default options into a writer.
pub fn encode_to_writer<W: Write>(value: &PlistValue, mut sink: W) -> Result<()> {
	BinaryEncoder::default().encode(value, &mut sink)
}

/// Encode with default options into a new file at `path`.
pub fn encode_file(value: &PlistValue, path: impl AsRef<Path>) -> Result<()> {
	let mut sink = BufWriter::new(File::create(path)?);
	BinaryEncoder::default().encode(value, &mut sink)
}

/// Coalescing key: dict keys and string values share the `Str` space.
#[derive(PartialEq, Eq, Hash)]
enum ScalarKey<'v> {
	Str(&'v str),
	Other(&'v PlistValue),
}

/// Body of a scalar slot; containers are never leaves.
#[derive(Clone, Copy)]
enum Leaf<'v> {
	Null,
	Bool(bool),
	Int(i64),
	Real(f64),
	Date(f64),
	Data(&'v [u8]),
	Str(&'v str),
	Uid(u32),
}

enum Slot<'v> {
	Leaf(Leaf<'v>),
	Array(Vec<u64>),
	Dict { keys: Vec<u64>, values: Vec<u64> },
}

struct ObjectTable<'v> {
	slots: Vec<Slot<'v>>,
	seen: HashMap<ScalarKey<'v>, u64>,
	coalesce: bool,
}

impl<'v> ObjectTable<'v> {
	fn new(coalesce: bool) -> Self {
		Self {
			slots: Vec::new(),
			seen: HashMap::new(),
			coalesce,
		}
	}

	fn reserve(&mut self, slot: Slot<'v>) -> u64 {
		self.slots.push(slot);
		(self.slots.len() - 1) as u64
	}

	fn scalar(&mut self, key: ScalarKey<'v>, leaf: Leaf<'v>) -> u64 {
		if self.coalesce
			&& let Some(index) = self.seen.get(&key)
		{
			return *index;
		}

		let index = self.reserve(Slot::Leaf(leaf));
		if self.coalesce {
			self.seen.insert(key, index);
		}
		index
	}

	fn string(&mut self, text: &'v str) -> u64 {
		self.scalar(ScalarKey::Str(text), Leaf::Str(text))
	}

	fn flatten(&mut self, value: &'v PlistValue) -> u64 {
		let leaf = match value {
			PlistValue::Str(text) => return self.string(text),
			PlistValue::Array(items) => {
				let index = self.reserve(Slot::Array(Vec::new()));
				let refs = items.iter().map(|item| self.flatten(item)).collect();
				self.slots[index as usize] = Slot::Array(refs);
				return index;
			}
			PlistValue::Dict(entries) => {
				let index = self.reserve(Slot::Dict {
					keys: Vec::new(),
					values: Vec::new(),
				});
				let keys = entries.keys().map(|key| self.string(key)).collect();
				let values = entries.values().map(|value| self.flatten(value)).collect();
				self.slots[index as usize] = Slot::Dict { keys, values };
				return index;
			}
			PlistValue::Null => Leaf::Null,
			PlistValue::Bool(flag) => Leaf::Bool(*flag),
			PlistValue::Int(number) => Leaf::Int(*number),
			PlistValue::Real(number) => Leaf::Real(*number),
			PlistValue::Date(seconds) => Leaf::Date(*seconds),
			PlistValue::Data(bytes) => Leaf::Data(bytes),
			PlistValue::Uid(uid) => Leaf::Uid(*uid),
		};
		self.scalar(ScalarKey::Other(value), leaf)
	}

	fn serialize(&self) -> Vec<u8> {
		let count = self.slots.len() as u64;
		let ref_width = usize::from(marker::min_width(count.saturating_sub(1)));

		let mut out = MAGIC.to_vec();
		let mut offsets = Vec::with_capacity(self.slots.len());
		for slot in &self.slots {
			offsets.push(out.len() as u64);
			match slot {
				Slot::Leaf(leaf) => write_leaf(&mut out, *leaf),
				Slot::Array(refs) => {
					write_header(&mut out, marker::TAG_ARRAY, refs.len() as u64);
					write_refs(&mut out, refs, ref_width);
				}
				Slot::Dict { keys, values } => {
					write_header(&mut out, marker::TAG_DICT, keys.len() as u64);
					write_refs(&mut out, keys, ref_width);
					write_refs(&mut out, values, ref_width);
				}
			}
		}

		let offset_table_offset = out.len() as u64;
		let offset_width = marker::min_width(offset_table_offset);
		write_refs(&mut out, &offsets, usize::from(offset_width));

		let trailer = Trailer {
			offset_width,
			ref_width: ref_width as u8,
			object_count: count,
			root_object: 0,
			offset_table_offset,
		};
		out.extend_from_slice(&trailer.to_bytes());
		out
	}
}

fn write_leaf(out: &mut Vec<u8>, leaf: Leaf<'_>) {
	match leaf {
		Leaf::Null => out.push(marker::NULL),
		Leaf::Bool(false) => out.push(marker::FALSE),
		Leaf::Bool(true) => out.push(marker::TRUE),
		Leaf::Int(value) => write_int(out, value),
		Leaf::Real(value) => {
			out.push(marker::join(marker::TAG_REAL, 3));
			out.extend_from_slice(&value.to_bits().to_be_bytes());
		}
		Leaf::Date(value) => {
			out.push(marker::join(marker::TAG_DATE, 3));
			out.extend_from_slice(&value.to_bits().to_be_bytes());
		}
		Leaf::Data(bytes) => {
			write_header(out, marker::TAG_DATA, bytes.len() as u64);
			out.extend_from_slice(bytes);
		}
		Leaf::Str(text) => write_str(out, text),
		Leaf::Uid(value) => {
			let width = marker::min_width(u64::from(value));
			out.push(marker::join(marker::TAG_UID, width - 1));
			out.extend_from_slice(&value.to_be_bytes()[4 - usize::from(width)..]);
		}
	}
}

/// Non-negative values up to `u32::MAX` take 1, 2, or 4 bytes; everything else 8.
fn write_int(out: &mut Vec<u8>, value: i64) {
	match u32::try_from(value) {
		Ok(small) => {
			let width = marker::min_width(u64::from(small));
			out.push(marker::join(marker::TAG_INT, marker::width_nibble(width)));
			out.extend_from_slice(&small.to_be_bytes()[4 - usize::from(width)..]);
		}
		Err(_) => {
			out.push(marker::join(marker::TAG_INT, 3));
			out.extend_from_slice(&value.to_be_bytes());
		}
	}
}

fn write_str(out: &mut Vec<u8>, text: &str) {
	if text.is_ascii() {
		write_header(out, marker::TAG_ASCII, text.len() as u64);
		out.extend_from_slice(text.as_bytes());
		return;
	}

	let units: Vec<u16> = text.encode_utf16().collect();
	write_header(out, marker::TAG_UTF16, units.len() as u64);
	for unit in units {
		out.extend_from_slice(&unit.to_be_bytes());
	}
}

fn write_header(out: &mut Vec<u8>, tag: u8, len: u64) {
	if len < u64::from(marker::LEN_EXTENDED) {
		out.push(marker::join(tag, len as u8));
		return;
	}

	out.push(marker::join(tag, marker::LEN_EXTENDED));
	write_int(out, i64::try_from(len).unwrap_or(i64::MAX));
}

fn write_refs(out: &mut Vec<u8>, refs: &[u64], width: usize) {
	for index in refs {
		out.extend_from_slice(&index.to_be_bytes()[8 - width..]);
	}
}

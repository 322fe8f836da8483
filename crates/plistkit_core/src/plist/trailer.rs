use crate::plist::marker::MAGIC;
use crate::plist::{PlistError, Result};

/// Fixed 32-byte record at the end of every binary plist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
	/// Width in bytes of each offset-table entry.
	pub offset_width: u8,
	/// Width in bytes of each object reference.
	pub ref_width: u8,
	/// Number of objects (and offset-table entries).
	pub object_count: u64,
	/// Offset-table index of the root object.
	pub root_object: u64,
	/// Absolute file offset of the offset table.
	pub offset_table_offset: u64,
}

impl Trailer {
	/// Encoded size in bytes.
	pub const SIZE: usize = 32;
	/// Smallest possible binary plist: magic plus trailer.
	pub const MIN_FILE_SIZE: u64 = (MAGIC.len() + Self::SIZE) as u64;

	/// Parse trailer fields from its 32 raw bytes.
	///
	/// Only the record itself is checked here; [`Trailer::validate`] checks it against
	/// the file it came from.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let raw = bytes.get(0..Self::SIZE).ok_or(PlistError::Format { reason: "trailer too short" })?;
		if raw[0..6].iter().any(|byte| *byte != 0) {
			return Err(PlistError::Format {
				reason: "trailer reserved bytes are not zero",
			});
		}

		let trailer = Self {
			offset_width: raw[6],
			ref_width: raw[7],
			object_count: be_u64(&raw[8..16]),
			root_object: be_u64(&raw[16..24]),
			offset_table_offset: be_u64(&raw[24..32]),
		};

		if !(1..=8).contains(&trailer.offset_width) {
			return Err(PlistError::Format {
				reason: "offset entry width out of range",
			});
		}
		if !(1..=8).contains(&trailer.ref_width) {
			return Err(PlistError::Format {
				reason: "object reference width out of range",
			});
		}

		Ok(trailer)
	}

	/// Check counts and the offset-table span against a file of `file_len` bytes.
	pub fn validate(&self, file_len: u64) -> Result<()> {
		if self.object_count == 0 {
			return Err(PlistError::Format { reason: "object count is zero" });
		}
		if self.root_object >= self.object_count {
			return Err(PlistError::Format {
				reason: "root object index out of range",
			});
		}

		let table_len = self
			.object_count
			.checked_mul(u64::from(self.offset_width))
			.ok_or(PlistError::Format { reason: "offset table too large" })?;
		let table_end = self
			.offset_table_offset
			.checked_add(table_len)
			.ok_or(PlistError::Format { reason: "offset table too large" })?;

		if self.offset_table_offset < MAGIC.len() as u64 || table_end > file_len.saturating_sub(Self::SIZE as u64) {
			return Err(PlistError::Format {
				reason: "offset table outside file body",
			});
		}

		Ok(())
	}

	/// Encode the trailer, including its six reserved zero bytes.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0_u8; Self::SIZE];
		out[6] = self.offset_width;
		out[7] = self.ref_width;
		out[8..16].copy_from_slice(&self.object_count.to_be_bytes());
		out[16..24].copy_from_slice(&self.root_object.to_be_bytes());
		out[24..32].copy_from_slice(&self.offset_table_offset.to_be_bytes());
		out
	}
}

fn be_u64(bytes: &[u8]) -> u64 {
	let mut buf = [0_u8; 8];
	buf.copy_from_slice(bytes);
	u64::from_be_bytes(buf)
}

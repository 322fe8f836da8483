//! Object marker layout: `tag << 4 | nibble`.

/// Leading file magic.
pub const MAGIC: &[u8; 8] = b"bplist00";

/// Null family; the nibble selects the singleton.
pub const TAG_SIMPLE: u8 = 0x0;
/// Big-endian integer, `2^nibble` bytes.
pub const TAG_INT: u8 = 0x1;
/// IEEE float, `2^nibble` bytes.
pub const TAG_REAL: u8 = 0x2;
/// 8-byte double, seconds since 2001.
pub const TAG_DATE: u8 = 0x3;
/// Raw bytes.
pub const TAG_DATA: u8 = 0x4;
/// One byte per character.
pub const TAG_ASCII: u8 = 0x5;
/// UTF-16BE code units.
pub const TAG_UTF16: u8 = 0x6;
/// CF$UID, `nibble + 1` bytes.
pub const TAG_UID: u8 = 0x8;
/// Ordered object references.
pub const TAG_ARRAY: u8 = 0xA;
/// Unordered object references.
pub const TAG_SET: u8 = 0xC;
/// Key references followed by value references.
pub const TAG_DICT: u8 = 0xD;

/// `Null` marker.
pub const NULL: u8 = 0x00;
/// `false` marker.
pub const FALSE: u8 = 0x08;
/// `true` marker.
pub const TRUE: u8 = 0x09;

/// Nibble meaning "length follows as an integer object".
pub const LEN_EXTENDED: u8 = 0x0F;

/// Split a marker byte into `(tag, nibble)`.
pub fn split(marker: u8) -> (u8, u8) {
	(marker >> 4, marker & 0x0F)
}

/// Join a tag and nibble into a marker byte.
pub fn join(tag: u8, nibble: u8) -> u8 {
	(tag << 4) | (nibble & 0x0F)
}

/// Smallest of 1, 2, 4, or 8 bytes that can hold `max` unsigned.
pub fn min_width(max: u64) -> u8 {
	if max <= u64::from(u8::MAX) {
		1
	} else if max <= u64::from(u16::MAX) {
		2
	} else if max <= u64::from(u32::MAX) {
		4
	} else {
		8
	}
}

/// `log2` of a power-of-two byte width, as stored in int/real nibbles.
pub fn width_nibble(width: u8) -> u8 {
	width.trailing_zeros() as u8
}

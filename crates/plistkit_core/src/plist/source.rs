use std::borrow::Cow;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::plist::{PlistError, Result};

/// Random-access byte input used by the decoders.
///
/// Every read either returns exactly the requested number of bytes and advances the
/// position by that amount, or fails with [`PlistError::Truncated`] and leaves the
/// position unchanged.
pub trait ByteSource {
	/// Total source length in bytes.
	fn len(&self) -> u64;

	/// Current absolute position.
	fn pos(&self) -> u64;

	/// Move to an absolute position; positions past the end fail.
	fn seek(&mut self, pos: u64) -> Result<()>;

	/// Fill `buf` completely from the current position.
	fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

	/// Return `true` when the source holds no bytes.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Bytes left after the current position.
	fn remaining(&self) -> u64 {
		self.len().saturating_sub(self.pos())
	}

	/// Fail with a truncation error unless `need` more bytes are available.
	fn ensure(&self, need: u64) -> Result<()> {
		if need > self.remaining() {
			return Err(PlistError::Truncated {
				at: self.pos(),
				need,
				rem: self.remaining(),
			});
		}
		Ok(())
	}

	/// Read exactly `n` bytes.
	fn read(&mut self, n: u64) -> Result<Vec<u8>> {
		self.ensure(n)?;
		let len = usize::try_from(n).map_err(|_| PlistError::Truncated {
			at: self.pos(),
			need: n,
			rem: self.remaining(),
		})?;
		let mut out = vec![0_u8; len];
		self.read_into(&mut out)?;
		Ok(out)
	}

	/// Read one byte.
	fn read_u8(&mut self) -> Result<u8> {
		let mut buf = [0_u8; 1];
		self.read_into(&mut buf)?;
		Ok(buf[0])
	}

	/// Read a big-endian unsigned integer of 1 to 8 bytes.
	fn read_be_uint(&mut self, width: usize) -> Result<u64> {
		debug_assert!((1..=8).contains(&width), "width {width} out of range");
		let mut buf = [0_u8; 8];
		self.read_into(&mut buf[8 - width..])?;
		Ok(u64::from_be_bytes(buf))
	}

	/// Read everything from the current position to the end.
	fn read_to_end(&mut self) -> Result<Vec<u8>> {
		let rem = self.remaining();
		self.read(rem)
	}
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
	fn len(&self) -> u64 {
		(**self).len()
	}

	fn pos(&self) -> u64 {
		(**self).pos()
	}

	fn seek(&mut self, pos: u64) -> Result<()> {
		(**self).seek(pos)
	}

	fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
		(**self).read_into(buf)
	}
}

/// In-memory source over borrowed or owned bytes.
pub struct MemorySource<'a> {
	bytes: Cow<'a, [u8]>,
	pos: u64,
}

impl<'a> MemorySource<'a> {
	/// Borrow a byte slice.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			bytes: Cow::Borrowed(bytes),
			pos: 0,
		}
	}

	/// Return the full backing buffer.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}
}

impl MemorySource<'static> {
	/// Buffer a non-seekable stream completely so it can be read out of order.
	pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
		let mut out = Vec::new();
		reader.read_to_end(&mut out)?;
		Ok(Self::from(out))
	}
}

impl From<Vec<u8>> for MemorySource<'static> {
	fn from(bytes: Vec<u8>) -> Self {
		Self {
			bytes: Cow::Owned(bytes),
			pos: 0,
		}
	}
}

impl ByteSource for MemorySource<'_> {
	fn len(&self) -> u64 {
		self.bytes.len() as u64
	}

	fn pos(&self) -> u64 {
		self.pos
	}

	fn seek(&mut self, pos: u64) -> Result<()> {
		if pos > self.len() {
			return Err(PlistError::Truncated {
				at: pos,
				need: 0,
				rem: 0,
			});
		}
		self.pos = pos;
		Ok(())
	}

	fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
		self.ensure(buf.len() as u64)?;
		let start = self.pos as usize;
		let end = start + buf.len();
		buf.copy_from_slice(&self.bytes[start..end]);
		self.pos = end as u64;
		Ok(())
	}
}

/// Read-only file source.
///
/// The file handle is owned by this value and closed when it is dropped.
pub struct FileSource {
	file: File,
	len: u64,
	pos: u64,
}

impl FileSource {
	/// Open a file for random-access reading.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let file = File::open(path)?;
		let len = file.metadata()?.len();
		Ok(Self { file, len, pos: 0 })
	}
}

impl ByteSource for FileSource {
	fn len(&self) -> u64 {
		self.len
	}

	fn pos(&self) -> u64 {
		self.pos
	}

	fn seek(&mut self, pos: u64) -> Result<()> {
		if pos > self.len {
			return Err(PlistError::Truncated {
				at: pos,
				need: 0,
				rem: 0,
			});
		}
		self.file.seek(SeekFrom::Start(pos))?;
		self.pos = pos;
		Ok(())
	}

	fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
		self.ensure(buf.len() as u64)?;
		match self.file.read_exact(buf) {
			Ok(()) => {
				self.pos += buf.len() as u64;
				Ok(())
			}
			Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
				// File shrank underneath us; resync the handle with our position.
				self.file.seek(SeekFrom::Start(self.pos))?;
				Err(PlistError::Truncated {
					at: self.pos,
					need: buf.len() as u64,
					rem: 0,
				})
			}
			Err(err) => Err(err.into()),
		}
	}
}

//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a fixture file into memory.
pub fn read_fixture(name: &str) -> Vec<u8> {
	let path = fixture_path(name);
	std::fs::read(&path).unwrap_or_else(|err| panic!("fixture {} should be readable: {err}", path.display()))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Per-test scratch directory under the target dir, emptied on creation.
pub fn scratch_dir(name: &str) -> PathBuf {
	let dir = target_dir().join("plistkit-scratch").join(name);
	let _ = std::fs::remove_dir_all(&dir);
	std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("scratch dir {} should be creatable: {err}", dir.display()));
	dir
}

/// Hand assembler for raw `bplist00` documents.
///
/// Object bodies are pushed verbatim (marker byte included) so tests can describe
/// layouts a well-behaved encoder would never produce: cycles, bad markers, short
/// payloads, out-of-range references.
#[derive(Debug, Clone)]
pub struct BplistBuilder {
	objects: Vec<Vec<u8>>,
	ref_width: u8,
	root: u64,
}

impl Default for BplistBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl BplistBuilder {
	/// Empty document with one-byte object references.
	pub fn new() -> Self {
		Self {
			objects: Vec::new(),
			ref_width: 1,
			root: 0,
		}
	}

	/// Override the object-reference width written to the trailer.
	pub fn with_ref_width(mut self, width: u8) -> Self {
		self.ref_width = width;
		self
	}

	/// Append one raw object body and return its offset-table index.
	pub fn push(&mut self, body: impl Into<Vec<u8>>) -> u64 {
		self.objects.push(body.into());
		(self.objects.len() - 1) as u64
	}

	/// Select the root object index.
	pub fn set_root(&mut self, index: u64) {
		self.root = index;
	}

	/// Encode object references at the configured width.
	pub fn refs(&self, indices: &[u64]) -> Vec<u8> {
		let width = usize::from(self.ref_width);
		indices.iter().flat_map(|index| index.to_be_bytes()[8 - width..].to_vec()).collect()
	}

	/// Marker byte followed by references, for array and dict bodies.
	pub fn container(&self, marker: u8, indices: &[u64]) -> Vec<u8> {
		let mut body = vec![marker];
		body.extend(self.refs(indices));
		body
	}

	/// Assemble magic, bodies, offset table, and trailer.
	pub fn build(&self) -> Vec<u8> {
		let mut out = b"bplist00".to_vec();
		let mut offsets = Vec::with_capacity(self.objects.len());
		for body in &self.objects {
			offsets.push(out.len() as u64);
			out.extend_from_slice(body);
		}

		let table_offset = out.len() as u64;
		let offset_width = if table_offset <= 0xFF { 1 } else if table_offset <= 0xFFFF { 2 } else { 4 };
		for offset in &offsets {
			out.extend_from_slice(&offset.to_be_bytes()[8 - offset_width..]);
		}

		out.extend_from_slice(&[0_u8; 6]);
		out.push(offset_width as u8);
		out.push(self.ref_width);
		out.extend_from_slice(&(self.objects.len() as u64).to_be_bytes());
		out.extend_from_slice(&self.root.to_be_bytes());
		out.extend_from_slice(&table_offset.to_be_bytes());
		out
	}
}

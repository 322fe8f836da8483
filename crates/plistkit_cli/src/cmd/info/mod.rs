use std::path::PathBuf;

use plistkit::plist::{Result, Trailer};

use crate::cmd::util::{emit_json, load};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print detected format, binary trailer fields, and tree statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let loaded = load(&path)?;
	let root_kind = loaded.value.kind();
	let node_count = loaded.value.node_count();

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			format: loaded.format.label(),
			size: loaded.size,
			trailer: loaded.trailer.map(TrailerJson::from),
			root_kind,
			node_count,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("format: {}", loaded.format);
	println!("size: {}", loaded.size);
	if let Some(trailer) = loaded.trailer {
		println!("offset_width: {}", trailer.offset_width);
		println!("ref_width: {}", trailer.ref_width);
		println!("object_count: {}", trailer.object_count);
		println!("root_object: {}", trailer.root_object);
		println!("offset_table_offset: {}", trailer.offset_table_offset);
	}
	println!("root_kind: {root_kind}");
	println!("node_count: {node_count}");

	Ok(())
}

#[derive(serde::Serialize)]
struct TrailerJson {
	offset_width: u8,
	ref_width: u8,
	object_count: u64,
	root_object: u64,
	offset_table_offset: u64,
}

impl From<Trailer> for TrailerJson {
	fn from(trailer: Trailer) -> Self {
		Self {
			offset_width: trailer.offset_width,
			ref_width: trailer.ref_width,
			object_count: trailer.object_count,
			root_object: trailer.root_object,
			offset_table_offset: trailer.offset_table_offset,
		}
	}
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	format: &'static str,
	size: u64,
	trailer: Option<TrailerJson>,
	root_kind: &'static str,
	node_count: usize,
}

use std::fmt::Write as _;
use std::path::PathBuf;

use plistkit::plist::{PlistValue, Result};

use crate::cmd::util::{date_label, emit_json, load, truncate, value_to_json};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long = "max-items")]
	pub max_items: Option<usize>,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Output truncation limits for printed value trees.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of children printed per array or dict.
	pub max_items: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of bytes shown as hex for data.
	pub max_data_bytes: usize,
	/// Maximum nesting depth before containers are summarized.
	pub max_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_items: 32,
			max_string_len: 200,
			max_data_bytes: 16,
			max_depth: 8,
		}
	}
}

/// Print a property list as an indented tree, or as tagged JSON.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		json,
		max_items,
		max_depth,
	} = args;

	let loaded = load(&path)?;

	if json {
		let payload = ShowJson {
			path: path.display().to_string(),
			format: loaded.format.label(),
			root: value_to_json(&loaded.value),
		};
		emit_json(&payload);
		return Ok(());
	}

	let defaults = PrintOptions::default();
	let options = PrintOptions {
		max_items: max_items.unwrap_or(defaults.max_items),
		max_depth: max_depth.unwrap_or(defaults.max_depth),
		..defaults
	};

	println!("path: {}", path.display());
	println!("format: {}", loaded.format);
	print!("{}", render_value(&loaded.value, options));
	Ok(())
}

/// Render one value tree, one node per line.
pub fn render_value(value: &PlistValue, options: PrintOptions) -> String {
	let mut out = String::new();
	write_value(&mut out, value, 0, 0, options);
	out
}

fn write_value(out: &mut String, value: &PlistValue, indent: usize, depth: u32, options: PrintOptions) {
	let pad = " ".repeat(indent);
	match value {
		PlistValue::Array(items) => {
			if depth >= options.max_depth {
				let _ = writeln!(out, "[... {} items]", items.len());
				return;
			}
			if items.is_empty() {
				let _ = writeln!(out, "[]");
				return;
			}
			let _ = writeln!(out, "[");
			for item in items.iter().take(options.max_items) {
				let _ = write!(out, "{pad}  ");
				write_value(out, item, indent + 2, depth + 1, options);
			}
			if items.len() > options.max_items {
				let _ = writeln!(out, "{pad}  ... {} more", items.len() - options.max_items);
			}
			let _ = writeln!(out, "{pad}]");
		}
		PlistValue::Dict(entries) => {
			if depth >= options.max_depth {
				let _ = writeln!(out, "{{... {} entries}}", entries.len());
				return;
			}
			if entries.is_empty() {
				let _ = writeln!(out, "{{}}");
				return;
			}
			let _ = writeln!(out, "{{");
			for (key, item) in entries.iter().take(options.max_items) {
				let _ = write!(out, "{pad}  {} = ", truncate(key, options.max_string_len));
				write_value(out, item, indent + 2, depth + 1, options);
			}
			if entries.len() > options.max_items {
				let _ = writeln!(out, "{pad}  ... {} more entries", entries.len() - options.max_items);
			}
			let _ = writeln!(out, "{pad}}}");
		}
		scalar => {
			let _ = writeln!(out, "{}", scalar_label(scalar, options));
		}
	}
}

fn scalar_label(value: &PlistValue, options: PrintOptions) -> String {
	match value {
		PlistValue::Null => "null".to_owned(),
		PlistValue::Bool(flag) => flag.to_string(),
		PlistValue::Int(number) => number.to_string(),
		PlistValue::Real(number) => format!("{number:?}"),
		PlistValue::Date(_) => format!("date({})", date_label(value)),
		PlistValue::Data(bytes) => {
			let hex: String = bytes.iter().take(options.max_data_bytes).map(|byte| format!("{byte:02x}")).collect();
			let more = if bytes.len() > options.max_data_bytes { "..." } else { "" };
			format!("data[{}] {hex}{more}", bytes.len())
		}
		PlistValue::Str(text) => format!("{:?}", truncate(text, options.max_string_len)),
		PlistValue::Uid(uid) => format!("uid({uid})"),
		PlistValue::Array(items) => format!("array[{}]", items.len()),
		PlistValue::Dict(entries) => format!("dict[{}]", entries.len()),
	}
}

#[derive(serde::Serialize)]
struct ShowJson {
	path: String,
	format: &'static str,
	root: serde_json::Value,
}

#[cfg(test)]
mod tests;

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use plistkit::plist::{BinaryDecoder, Format, MemorySource, PlistValue, Result, Trailer, parse_with_format};
use serde_json::{Map, Number, Value as JsonValue};

/// Parsed document plus what was learned about its container.
pub(crate) struct Loaded {
	pub value: PlistValue,
	pub format: Format,
	pub trailer: Option<Trailer>,
	pub size: u64,
}

/// Read and parse a property list file in either format.
///
/// The binary attempt is driven directly so its trailer can be reported; format
/// failures fall back to the dispatcher for the XML retry and compound error.
pub(crate) fn load(path: &Path) -> Result<Loaded> {
	let bytes = std::fs::read(path)?;
	let size = bytes.len() as u64;

	let mut decoder = BinaryDecoder::new(MemorySource::new(&bytes));
	match decoder.decode() {
		Ok(value) => Ok(Loaded {
			value,
			format: Format::Binary,
			trailer: decoder.trailer().copied(),
			size,
		}),
		Err(err) if err.is_format() => {
			let (value, format) = parse_with_format(MemorySource::new(&bytes))?;
			Ok(Loaded {
				value,
				format,
				trailer: None,
				size,
			})
		}
		Err(err) => Err(err),
	}
}

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to serialize json: {err}"),
	}
}

/// JSON form of a value; data, date, and uid use single-key tagged objects.
pub(crate) fn value_to_json(value: &PlistValue) -> JsonValue {
	match value {
		PlistValue::Null => JsonValue::Null,
		PlistValue::Bool(flag) => JsonValue::Bool(*flag),
		PlistValue::Int(number) => JsonValue::from(*number),
		PlistValue::Real(number) => Number::from_f64(*number).map(JsonValue::Number).unwrap_or_else(|| JsonValue::String(number.to_string())),
		PlistValue::Date(_) => tagged("$date", JsonValue::String(date_label(value))),
		PlistValue::Data(bytes) => tagged("$data", JsonValue::String(STANDARD.encode(bytes))),
		PlistValue::Str(text) => JsonValue::String(text.clone()),
		PlistValue::Uid(uid) => tagged("$uid", JsonValue::from(*uid)),
		PlistValue::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
		PlistValue::Dict(entries) => JsonValue::Object(entries.iter().map(|(key, item)| (key.clone(), value_to_json(item))).collect()),
	}
}

fn tagged(tag: &str, inner: JsonValue) -> JsonValue {
	let mut object = Map::new();
	object.insert(tag.to_owned(), inner);
	JsonValue::Object(object)
}

/// UTC timestamp for a date value, or raw seconds since 2001 when out of range.
pub(crate) fn date_label(value: &PlistValue) -> String {
	match value.as_datetime() {
		Some(date) => date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
		None => format!("{}s since 2001", value.as_date().unwrap_or(f64::NAN)),
	}
}

/// Cut `input` to `max_len` characters, marking the cut with `...`.
pub(crate) fn truncate(input: &str, max_len: usize) -> String {
	if input.chars().count() <= max_len {
		return input.to_owned();
	}
	let out: String = input.chars().take(max_len).collect();
	format!("{out}...")
}

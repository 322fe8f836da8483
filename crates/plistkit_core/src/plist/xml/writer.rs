use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::plist::xml::{DATE_FORMAT, UID_KEY};
use crate::plist::{PlistError, PlistValue, Result};

const DOCTYPE: &str = r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// Write `value` as a tab-indented Apple XML property list.
///
/// `Null` has no XML element and fails with [`PlistError::Unrepresentable`]; nothing
/// is written to `sink` in that case.
pub fn write<W: Write>(value: &PlistValue, mut sink: W) -> Result<()> {
	let bytes = to_vec(value)?;
	sink.write_all(&bytes)?;
	sink.flush()?;
	Ok(())
}

/// Render `value` as an XML property list document.
pub fn to_vec(value: &PlistValue) -> Result<Vec<u8>> {
	let mut out = XmlWriter {
		writer: Writer::new_with_indent(Vec::new(), b'\t', 1),
	};
	out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
	out.event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
	// The <plist> wrapper is written raw so the root value starts at column 0.
	out.writer.get_mut().extend_from_slice(b"\n<plist version=\"1.0\">");
	out.value(value)?;

	let mut bytes = out.writer.into_inner();
	bytes.extend_from_slice(b"\n</plist>\n");
	Ok(bytes)
}

struct XmlWriter {
	writer: Writer<Vec<u8>>,
}

impl XmlWriter {
	fn event(&mut self, event: Event<'_>) -> Result<()> {
		self.writer.write_event(event).map_err(PlistError::xml)
	}

	/// `<name>text</name>`, or `<name/>` when `text` is empty.
	fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
		if text.is_empty() {
			return self.event(Event::Empty(BytesStart::new(name)));
		}
		self.event(Event::Start(BytesStart::new(name)))?;
		self.event(Event::Text(BytesText::new(text)))?;
		self.event(Event::End(BytesEnd::new(name)))
	}

	fn value(&mut self, value: &PlistValue) -> Result<()> {
		match value {
			PlistValue::Null => Err(PlistError::Unrepresentable { kind: "null", format: "xml" }),
			PlistValue::Bool(flag) => self.event(Event::Empty(BytesStart::new(if *flag { "true" } else { "false" }))),
			PlistValue::Int(number) => self.text_element("integer", &number.to_string()),
			PlistValue::Real(number) => self.text_element("real", &format_real(*number)),
			PlistValue::Date(_) => {
				let date = value.as_datetime().ok_or_else(|| PlistError::xml("date outside the representable range"))?;
				self.text_element("date", &date.format(DATE_FORMAT).to_string())
			}
			PlistValue::Data(bytes) => self.text_element("data", &STANDARD.encode(bytes)),
			PlistValue::Str(text) => self.text_element("string", text),
			PlistValue::Uid(uid) => {
				self.event(Event::Start(BytesStart::new("dict")))?;
				self.text_element("key", UID_KEY)?;
				self.text_element("integer", &uid.to_string())?;
				self.event(Event::End(BytesEnd::new("dict")))
			}
			PlistValue::Array(items) => {
				if items.is_empty() {
					return self.event(Event::Empty(BytesStart::new("array")));
				}
				self.event(Event::Start(BytesStart::new("array")))?;
				for item in items {
					self.value(item)?;
				}
				self.event(Event::End(BytesEnd::new("array")))
			}
			PlistValue::Dict(entries) => {
				if entries.is_empty() {
					return self.event(Event::Empty(BytesStart::new("dict")));
				}
				self.event(Event::Start(BytesStart::new("dict")))?;
				for (key, item) in entries {
					self.text_element("key", key)?;
					self.value(item)?;
				}
				self.event(Event::End(BytesEnd::new("dict")))
			}
		}
	}
}

fn format_real(number: f64) -> String {
	if number.is_nan() {
		"nan".to_owned()
	} else if number.is_infinite() {
		if number > 0.0 { "+infinity" } else { "-infinity" }.to_owned()
	} else {
		number.to_string()
	}
}

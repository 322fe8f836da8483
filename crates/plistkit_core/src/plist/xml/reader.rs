use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::plist::xml::{DATE_FORMAT, MAX_DEPTH, UID_KEY};
use crate::plist::{ByteSource, Dict, PlistError, PlistValue, Result};

/// Parse an XML property list from the remaining bytes of `source`.
pub fn parse<S: ByteSource>(mut source: S) -> Result<PlistValue> {
	let bytes = source.read_to_end()?;
	from_bytes(&bytes)
}

/// Parse an XML property list held in memory.
pub fn from_bytes(bytes: &[u8]) -> Result<PlistValue> {
	let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
	XmlParser::new(bytes).document()
}

/// Element opened by a `Start` or self-closing `Empty` event.
struct Element<'a> {
	tag: BytesStart<'a>,
	empty: bool,
}

impl Element<'_> {
	fn name(&self) -> String {
		String::from_utf8_lossy(self.tag.name().as_ref()).into_owned()
	}
}

struct XmlParser<'a> {
	reader: Reader<&'a [u8]>,
	depth: u32,
}

impl<'a> XmlParser<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		Self {
			reader: Reader::from_reader(bytes),
			depth: 0,
		}
	}

	fn fail(&self, reason: impl std::fmt::Display) -> PlistError {
		PlistError::xml(format!("{reason} (byte {})", self.reader.buffer_position()))
	}

	fn raw_event(&mut self) -> Result<Event<'a>> {
		self.reader.read_event().map_err(|err| self.fail(err))
	}

	/// Next structural event; prolog items, comments, and inter-element whitespace are skipped.
	fn next_event(&mut self) -> Result<Event<'a>> {
		loop {
			match self.raw_event()? {
				Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
				Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
				event => return Ok(event),
			}
		}
	}

	/// Next element opener, or `None` when `closing` ends first.
	fn next_element(&mut self, closing: &str) -> Result<Option<Element<'a>>> {
		match self.next_event()? {
			Event::Start(tag) => Ok(Some(Element { tag, empty: false })),
			Event::Empty(tag) => Ok(Some(Element { tag, empty: true })),
			Event::End(end) if end.name().as_ref() == closing.as_bytes() => Ok(None),
			Event::Eof => Err(self.fail(format!("unexpected end of document inside <{closing}>"))),
			other => Err(self.fail(format!("unexpected {} inside <{closing}>", describe(&other)))),
		}
	}

	fn document(&mut self) -> Result<PlistValue> {
		let first = match self.next_event()? {
			Event::Start(tag) => Element { tag, empty: false },
			Event::Empty(tag) => Element { tag, empty: true },
			Event::Eof => return Err(self.fail("document is empty")),
			other => return Err(self.fail(format!("unexpected {} before root element", describe(&other)))),
		};

		let value = if first.name() == "plist" {
			if first.empty {
				return Err(self.fail("<plist> has no root value"));
			}
			let root = self.next_element("plist")?.ok_or_else(|| self.fail("<plist> has no root value"))?;
			let value = self.value(root)?;
			if let Some(extra) = self.next_element("plist")? {
				return Err(self.fail(format!("<plist> holds more than one root value (found <{}>)", extra.name())));
			}
			value
		} else {
			self.value(first)?
		};

		match self.next_event()? {
			Event::Eof => Ok(value),
			other => Err(self.fail(format!("unexpected {} after root element", describe(&other)))),
		}
	}

	fn value(&mut self, element: Element<'a>) -> Result<PlistValue> {
		if self.depth >= MAX_DEPTH {
			return Err(PlistError::DepthExceeded { max_depth: MAX_DEPTH });
		}

		let name = element.name();
		match name.as_str() {
			"dict" => self.nested(|parser| parser.dict(element)),
			"array" => self.nested(|parser| parser.array(element)),
			"string" => self.text(&element).map(PlistValue::Str),
			"integer" => {
				let text = self.text(&element)?;
				parse_integer(text.trim())
					.map(PlistValue::Int)
					.ok_or_else(|| self.fail(format!("invalid integer {text:?}")))
			}
			"real" => {
				let text = self.text(&element)?;
				text.trim()
					.parse::<f64>()
					.map(PlistValue::Real)
					.map_err(|_| self.fail(format!("invalid real {text:?}")))
			}
			"true" | "false" => {
				if !self.text(&element)?.trim().is_empty() {
					return Err(self.fail(format!("<{name}> must be empty")));
				}
				Ok(PlistValue::Bool(name == "true"))
			}
			"date" => {
				let text = self.text(&element)?;
				NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
					.map(|date| PlistValue::from(date.and_utc()))
					.map_err(|err| self.fail(format!("invalid date {text:?}: {err}")))
			}
			"data" => {
				let text = self.text(&element)?;
				let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
				STANDARD
					.decode(compact)
					.map(PlistValue::Data)
					.map_err(|err| self.fail(format!("invalid base64 data: {err}")))
			}
			"key" => Err(self.fail("<key> outside of <dict>")),
			other => Err(self.fail(format!("unknown element <{other}>"))),
		}
	}

	/// Run `body` one container level deeper.
	fn nested(&mut self, body: impl FnOnce(&mut Self) -> Result<PlistValue>) -> Result<PlistValue> {
		self.depth += 1;
		let result = body(self);
		self.depth -= 1;
		result
	}

	fn array(&mut self, element: Element<'a>) -> Result<PlistValue> {
		let mut items = Vec::new();
		if !element.empty {
			while let Some(child) = self.next_element("array")? {
				items.push(self.value(child)?);
			}
		}
		Ok(PlistValue::Array(items))
	}

	fn dict(&mut self, element: Element<'a>) -> Result<PlistValue> {
		let mut entries = Dict::new();
		if element.empty {
			return Ok(PlistValue::Dict(entries));
		}

		while let Some(key) = self.next_element("dict")? {
			if key.name() != "key" {
				return Err(self.fail(format!("expected <key> in <dict>, found <{}>", key.name())));
			}
			let key = self.text(&key)?;
			let child = self.next_element("dict")?.ok_or_else(|| self.fail(format!("key {key:?} has no value")))?;
			let value = self.value(child)?;
			entries.insert(key, value);
		}

		if entries.len() == 1
			&& let Some(PlistValue::Int(raw)) = entries.get(UID_KEY)
			&& let Ok(uid) = u32::try_from(*raw)
		{
			return Ok(PlistValue::Uid(uid));
		}
		Ok(PlistValue::Dict(entries))
	}

	/// Character content up to the matching end tag; nested elements are rejected.
	fn text(&mut self, element: &Element<'a>) -> Result<String> {
		let mut out = String::new();
		if element.empty {
			return Ok(out);
		}

		let name = element.name();
		loop {
			match self.raw_event()? {
				Event::Text(text) => {
					let unescaped = text.unescape().map_err(|err| self.fail(err))?;
					out.push_str(&unescaped);
				}
				Event::CData(data) => out.push_str(&String::from_utf8_lossy(&data)),
				Event::Comment(_) | Event::PI(_) => {}
				Event::End(end) if end.name().as_ref() == name.as_bytes() => return Ok(out),
				Event::Eof => return Err(self.fail(format!("unterminated <{name}>"))),
				other => return Err(self.fail(format!("unexpected {} inside <{name}>", describe(&other)))),
			}
		}
	}
}

/// Decimal with optional sign; `0x` hex is accepted as Apple's writer allows it.
fn parse_integer(text: &str) -> Option<i64> {
	let (negative, digits) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};
	let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
		Some(hex) => i128::from_str_radix(hex, 16).ok()?,
		None => digits.parse::<i128>().ok()?,
	};
	i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn describe(event: &Event<'_>) -> String {
	match event {
		Event::Start(tag) | Event::Empty(tag) => format!("<{}>", String::from_utf8_lossy(tag.name().as_ref())),
		Event::End(tag) => format!("</{}>", String::from_utf8_lossy(tag.name().as_ref())),
		Event::Text(_) | Event::CData(_) => "text".to_owned(),
		Event::Eof => "end of document".to_owned(),
		_ => "markup".to_owned(),
	}
}

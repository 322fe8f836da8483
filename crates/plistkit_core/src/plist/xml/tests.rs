use plistkit_testkit::read_fixture;

use crate::plist::{Dict, MemorySource, PlistError, PlistValue, decode_bytes, xml};

fn wrap(body: &str) -> Vec<u8> {
	format!(r#"<?xml version="1.0" encoding="UTF-8"?><plist version="1.0">{body}</plist>"#).into_bytes()
}

fn parse_body(body: &str) -> PlistValue {
	xml::from_bytes(&wrap(body)).unwrap_or_else(|err| panic!("{body} should parse: {err}"))
}

fn reject(body: &str) -> String {
	match xml::from_bytes(&wrap(body)) {
		Err(PlistError::Xml { reason }) => reason,
		other => panic!("{body} should fail with an xml error, got {other:?}"),
	}
}

fn minimal() -> PlistValue {
	let mut entries = Dict::new();
	entries.insert("Boolean".to_owned(), PlistValue::Bool(true));
	entries.insert("Integer".to_owned(), PlistValue::Int(42));
	entries.insert("String".to_owned(), PlistValue::from("String"));
	PlistValue::Dict(entries)
}

#[test]
fn parses_minimal_fixture() {
	assert_eq!(xml::from_bytes(&read_fixture("minimal.plist")).expect("fixture parses"), minimal());
}

#[test]
fn sample_fixture_matches_its_binary_twin() {
	let from_xml = xml::from_bytes(&read_fixture("sample.plist")).expect("xml fixture parses");
	let from_binary = decode_bytes(&read_fixture("sample.bplist")).expect("binary fixture decodes");
	assert_eq!(from_xml, from_binary);
	assert_eq!(from_xml.get("UID"), Some(&PlistValue::Uid(28)));
}

#[test]
fn parse_reads_the_rest_of_a_source() {
	let bytes = read_fixture("minimal.plist");
	assert_eq!(xml::parse(MemorySource::new(&bytes)).expect("source parses"), minimal());
}

#[test]
fn writes_apple_layout() {
	let written = xml::to_vec(&minimal()).expect("dict is representable");
	assert_eq!(String::from_utf8(written).expect("utf-8"), String::from_utf8(read_fixture("minimal.plist")).expect("utf-8"));
}

#[test]
fn scalars_parse() {
	assert_eq!(parse_body("<integer>-5</integer>"), PlistValue::Int(-5));
	assert_eq!(parse_body("<integer> +7 </integer>"), PlistValue::Int(7));
	assert_eq!(parse_body("<integer>0x10</integer>"), PlistValue::Int(16));
	assert_eq!(parse_body("<integer>-9223372036854775808</integer>"), PlistValue::Int(i64::MIN));
	assert_eq!(parse_body("<real>0.5</real>"), PlistValue::Real(0.5));
	assert_eq!(parse_body("<real>1e3</real>"), PlistValue::Real(1000.0));
	assert_eq!(parse_body("<real>-infinity</real>"), PlistValue::Real(f64::NEG_INFINITY));
	assert_eq!(parse_body("<real>+inf</real>"), PlistValue::Real(f64::INFINITY));
	assert_eq!(parse_body("<real>nan</real>"), PlistValue::Real(f64::NAN));
	assert_eq!(parse_body("<false/>"), PlistValue::Bool(false));
	assert_eq!(parse_body("<true></true>"), PlistValue::Bool(true));
	assert_eq!(parse_body("<date>2001-01-01T00:00:00Z</date>"), PlistValue::Date(0.0));
	assert_eq!(parse_body("<data>AAEC\n\t/w==</data>"), PlistValue::data(vec![0, 1, 2, 255]));
}

#[test]
fn string_content_is_kept_verbatim() {
	assert_eq!(parse_body("<string>  two  words </string>"), PlistValue::from("  two  words "));
	assert_eq!(parse_body("<string>a &amp; b &lt;c&gt;</string>"), PlistValue::from("a & b <c>"));
	assert_eq!(parse_body("<string>x<![CDATA[<raw>]]>y</string>"), PlistValue::from("x<raw>y"));
	assert_eq!(parse_body("<string/>"), PlistValue::from(""));
	assert_eq!(parse_body("<string></string>"), PlistValue::from(""));
}

#[test]
fn empty_containers_in_both_spellings() {
	assert_eq!(parse_body("<array/>"), PlistValue::Array(Vec::new()));
	assert_eq!(parse_body("<array>\n</array>"), PlistValue::Array(Vec::new()));
	assert_eq!(parse_body("<dict/>"), PlistValue::Dict(Dict::new()));
	assert_eq!(parse_body("<dict> </dict>"), PlistValue::Dict(Dict::new()));
}

#[test]
fn cf_uid_dict_becomes_uid() {
	assert_eq!(parse_body("<dict><key>CF$UID</key><integer>7</integer></dict>"), PlistValue::Uid(7));

	let negative = parse_body("<dict><key>CF$UID</key><integer>-1</integer></dict>");
	assert_eq!(negative.get("CF$UID"), Some(&PlistValue::Int(-1)));

	let extra = parse_body("<dict><key>CF$UID</key><integer>7</integer><key>x</key><true/></dict>");
	assert_eq!(extra.as_dict().map(Dict::len), Some(2));
}

#[test]
fn comments_and_whitespace_between_elements_are_ignored() {
	let value = parse_body("\n\t<!-- note -->\n\t<array>\n\t\t<integer>1</integer>\n\t\t<!-- two -->\n\t\t<integer>2</integer>\n\t</array>\n");
	assert_eq!(value, PlistValue::Array(vec![PlistValue::Int(1), PlistValue::Int(2)]));
}

#[test]
fn root_without_plist_wrapper_is_accepted() {
	assert_eq!(xml::from_bytes(b"<string>bare</string>").expect("bare root"), PlistValue::from("bare"));
}

#[test]
fn malformed_documents_are_rejected() {
	assert!(matches!(xml::from_bytes(b""), Err(PlistError::Xml { .. })));
	assert!(matches!(xml::from_bytes(b"   \n"), Err(PlistError::Xml { .. })));
	assert!(reject("").contains("no root value"));
	assert!(reject("<foo/>").contains("unknown element <foo>"));
	assert!(reject("<key>k</key>").contains("outside of <dict>"));
	assert!(reject("<dict><key>k</key></dict>").contains("has no value"));
	assert!(reject("<dict><string>k</string><true/></dict>").contains("expected <key>"));
	assert!(reject("<true/><false/>").contains("more than one root value"));
	assert!(reject("<integer>12abc</integer>").contains("invalid integer"));
	assert!(reject("<integer>9223372036854775808</integer>").contains("invalid integer"));
	assert!(reject("<real>fast</real>").contains("invalid real"));
	assert!(reject("<date>yesterday</date>").contains("invalid date"));
	assert!(reject("<data>!!!</data>").contains("invalid base64"));
	assert!(reject("<string><b/></string>").contains("inside <string>"));
	assert!(matches!(xml::from_bytes(b"<plist version=\"1.0\"><array></plist>"), Err(PlistError::Xml { .. })));
}

#[test]
fn nesting_depth_is_limited() {
	let levels = 200_000;
	let body = format!("{}{}", "<array>".repeat(levels), "</array>".repeat(levels));
	let err = xml::from_bytes(&wrap(&body)).expect_err("far too deep");
	assert!(matches!(err, PlistError::DepthExceeded { max_depth: 512 }));

	let body = format!("{}<true/>{}", "<array>".repeat(100), "</array>".repeat(100));
	let mut value = parse_body(&body);
	for _ in 0..100 {
		value = value.as_array().and_then(<[PlistValue]>::first).cloned().expect("one child per level");
	}
	assert_eq!(value, PlistValue::Bool(true));
}

#[test]
fn writer_round_trips_every_xml_kind() {
	let mut entries = Dict::new();
	entries.insert("".to_owned(), PlistValue::from(""));
	entries.insert("amp & <tag>".to_owned(), PlistValue::from("  spaced\ttext "));
	entries.insert("blob".to_owned(), PlistValue::data(vec![0, 1, 2, 255]));
	entries.insert("empty".to_owned(), PlistValue::Array(Vec::new()));
	entries.insert("nested".to_owned(), PlistValue::Dict(Dict::new()));
	entries.insert("numbers".to_owned(), PlistValue::Array(vec![PlistValue::Int(i64::MIN), PlistValue::Real(42.28), PlistValue::Real(f64::INFINITY)]));
	entries.insert("ref".to_owned(), PlistValue::Uid(28));
	entries.insert("utf".to_owned(), PlistValue::from("⌘⇧⇪⌥"));
	entries.insert("when".to_owned(), PlistValue::Date(-423_597_600.0));
	let value = PlistValue::Dict(entries);

	let written = xml::to_vec(&value).expect("representable");
	assert_eq!(xml::from_bytes(&written).expect("reparses"), value);
}

#[test]
fn writer_spells_special_reals_like_apple() {
	let written = String::from_utf8(xml::to_vec(&PlistValue::Real(f64::NEG_INFINITY)).expect("real")).expect("utf-8");
	assert!(written.contains("<real>-infinity</real>"), "{written}");
	let written = String::from_utf8(xml::to_vec(&PlistValue::Real(f64::NAN)).expect("real")).expect("utf-8");
	assert!(written.contains("<real>nan</real>"), "{written}");
}

#[test]
fn null_has_no_xml_form() {
	let value = PlistValue::Array(vec![PlistValue::Int(1), PlistValue::Null]);
	let err = xml::to_vec(&value).expect_err("null is unrepresentable");
	assert!(matches!(err, PlistError::Unrepresentable { kind: "null", format: "xml" }));

	let mut sink = Vec::new();
	xml::write(&value, &mut sink).expect_err("null is unrepresentable");
	assert!(sink.is_empty());
}

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use plistkit::plist::{BinaryDecoder, Dict, FileSource, Format, PlistValue, decode_file, encode_to_vec, parse_with_format, xml};
use plistkit_testkit::{fixture_path, read_fixture};

const STORY: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Aliquam turpis purus, tempor et luctus vel, mattis eget elit. Nullam sit amet mattis eros. Aliquam felis est, feugiat sed tincidunt tincidunt, malesuada viverra velit. In ut lorem id arcu cras amet.";

fn leaves() -> Vec<(&'static str, PlistValue)> {
	let date = Utc.with_ymd_and_hms(1987, 7, 31, 6, 0, 0).single().expect("valid date");
	vec![
		("Boolean", PlistValue::Bool(true)),
		("Date", PlistValue::from(date)),
		("Float", PlistValue::Real(42.28)),
		("Integer", PlistValue::Int(42)),
		("Min", PlistValue::Int(-1)),
		("Story", PlistValue::from(STORY)),
		("String", PlistValue::from("String")),
		("UID", PlistValue::Uid(28)),
		("UTF", PlistValue::from("⌘⇧⇪⌥")),
	]
}

fn expected_sample() -> PlistValue {
	let mut root: Dict = leaves().into_iter().map(|(key, value)| (key.to_owned(), value)).collect();
	root.insert("Array".to_owned(), leaves().into_iter().map(|(_, value)| value).collect());
	root.insert("Dictionary".to_owned(), leaves().into_iter().map(|(key, value)| (key.to_owned(), value)).collect());
	PlistValue::Dict(root)
}

#[test]
fn sample_binary_decodes_to_known_tree() {
	let value = decode_file(fixture_path("sample.bplist")).expect("fixture decodes");
	assert_eq!(value, expected_sample());
	assert_eq!(value.get("Date").and_then(PlistValue::as_date), Some(-423_597_600.0));
	assert_eq!(value.get("Story").and_then(PlistValue::as_str).map(str::len), Some(255));
	assert_eq!(value.node_count(), 1 + 9 + 10 + 10);
}

#[test]
fn sample_trailer_is_reported() {
	let mut decoder = BinaryDecoder::new(FileSource::open(fixture_path("sample.bplist")).expect("fixture opens"));
	decoder.decode().expect("fixture decodes");

	let trailer = decoder.trailer().expect("trailer read");
	assert_eq!(trailer.offset_width, 2);
	assert_eq!(trailer.ref_width, 1);
	assert_eq!(trailer.object_count, 22);
	assert_eq!(trailer.root_object, 0);
	assert_eq!(trailer.offset_table_offset, 0x1AC);
}

#[test]
fn sample_xml_twin_is_equal() {
	let xml = xml::from_bytes(&read_fixture("sample.plist")).expect("xml fixture parses");
	assert_eq!(xml, expected_sample());
}

#[test]
fn sample_survives_format_conversion() {
	let value = expected_sample();

	let binary = encode_to_vec(&value);
	assert_eq!(binary, read_fixture("sample.bplist"));

	let xml = xml::to_vec(&value).expect("sample is representable");
	let (reparsed, format) = parse_with_format(plistkit::plist::MemorySource::new(&xml)).expect("xml reparses");
	assert_eq!(format, Format::Xml);
	assert_eq!(reparsed, value);
}

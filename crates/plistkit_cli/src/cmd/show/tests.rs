use plistkit::plist::{Dict, PlistValue};

use super::{PrintOptions, render_value};
use crate::cmd::test_support::{fixture_arg, run_plistkit_json, run_plistkit_stdout};

fn nested() -> PlistValue {
	let mut entries = Dict::new();
	entries.insert("list".to_owned(), PlistValue::Array(vec![PlistValue::Bool(true), PlistValue::Uid(3)]));
	entries.insert("name".to_owned(), PlistValue::from("plist \"kit\""));
	entries.insert("raw".to_owned(), PlistValue::data(vec![0xde, 0xad, 0xbe, 0xef]));
	entries.insert("when".to_owned(), PlistValue::Date(0.0));
	PlistValue::Dict(entries)
}

#[test]
fn render_indents_nested_containers() {
	let rendered = render_value(&nested(), PrintOptions::default());
	let expected = concat!(
		"{\n",
		"  list = [\n",
		"    true\n",
		"    uid(3)\n",
		"  ]\n",
		"  name = \"plist \\\"kit\\\"\"\n",
		"  raw = data[4] deadbeef\n",
		"  when = date(2001-01-01T00:00:00Z)\n",
		"}\n",
	);
	assert_eq!(rendered, expected);
}

#[test]
fn render_truncates_by_options() {
	let options = PrintOptions {
		max_items: 1,
		max_string_len: 3,
		max_data_bytes: 2,
		max_depth: 1,
	};
	let rendered = render_value(&nested(), options);
	assert_eq!(rendered, "{\n  list = [... 2 items]\n  ... 3 more entries\n}\n");

	let value = PlistValue::Array(vec![PlistValue::from("abcdef"), PlistValue::data(vec![1, 2, 3])]);
	let options = PrintOptions {
		max_items: 8,
		..options
	};
	assert_eq!(render_value(&value, options), "[\n  \"abc...\"\n  data[3] 0102...\n]\n");
}

#[test]
fn render_empty_containers_inline() {
	let value = PlistValue::Array(vec![PlistValue::Array(Vec::new()), PlistValue::Dict(Dict::new()), PlistValue::Null]);
	assert_eq!(render_value(&value, PrintOptions::default()), "[\n  []\n  {}\n  null\n]\n");
}

#[test]
fn show_json_tags_special_kinds() {
	let fixture = fixture_arg("sample.bplist");
	let json = run_plistkit_json(&["show", &fixture, "--json"]);

	assert_eq!(json["format"], "binary");
	let root = &json["root"];
	assert_eq!(root["Integer"], 42);
	assert_eq!(root["Min"], -1);
	assert_eq!(root["Float"], 42.28);
	assert_eq!(root["UTF"], "⌘⇧⇪⌥");
	assert_eq!(root["UID"]["$uid"], 28);
	assert_eq!(root["Date"]["$date"], "1987-07-31T06:00:00Z");
	assert_eq!(root["Array"].as_array().map(Vec::len), Some(9));
	assert_eq!(root["Dictionary"]["Boolean"], true);
}

#[test]
fn show_text_prints_tree() {
	let fixture = fixture_arg("minimal.plist");
	let stdout = run_plistkit_stdout(&["show", &fixture]);
	assert!(stdout.contains("format: xml"), "{stdout}");
	assert!(stdout.contains("  Integer = 42\n"), "{stdout}");
	assert!(stdout.contains("  String = \"String\"\n"), "{stdout}");
}

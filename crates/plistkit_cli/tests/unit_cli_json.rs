#![allow(missing_docs)]

use std::process::Command;

use plistkit_testkit::fixture_path;
use serde_json::Value;

#[test]
fn info_json_output_is_valid_and_structured() {
	let json = run_json(&["info", &fixture_path("minimal.bplist").display().to_string(), "--json"]);

	assert_eq!(json["format"], "binary");
	assert_eq!(json["size"], 79);
	assert_eq!(json["trailer"]["object_count"], 6);
	assert_eq!(json["root_kind"], "dict");
}

#[test]
fn show_json_matches_across_formats() {
	let binary = run_json(&["show", &fixture_path("sample.bplist").display().to_string(), "--json"]);
	let xml = run_json(&["show", &fixture_path("sample.plist").display().to_string(), "--json"]);

	assert_eq!(binary["format"], "binary");
	assert_eq!(xml["format"], "xml");
	assert_eq!(binary["root"], xml["root"]);
	assert_eq!(binary["root"]["Dictionary"]["UID"]["$uid"], 28);
}

#[test]
fn errors_go_to_stderr_with_exit_status_one() {
	let output = Command::new(env!("CARGO_BIN_EXE_plistkit"))
		.args(["show", "/nonexistent/plistkit/missing.bplist"])
		.output()
		.expect("command executes");

	assert_eq!(output.status.code(), Some(1));
	assert!(output.stdout.is_empty());
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: "));
}

fn run_json(args: &[&str]) -> Value {
	let output = Command::new(env!("CARGO_BIN_EXE_plistkit")).args(args).output().expect("command executes");

	assert!(output.status.success(), "command should succeed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

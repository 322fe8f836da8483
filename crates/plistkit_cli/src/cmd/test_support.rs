use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use plistkit_testkit::target_dir;

pub(crate) use plistkit_testkit::fixture_path;

static PLISTKIT_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Fixture path rendered as a command-line argument.
pub(crate) fn fixture_arg(name: &str) -> String {
	fixture_path(name).to_string_lossy().into_owned()
}

pub(crate) fn run_plistkit(args: &[&str]) -> Output {
	Command::new(plistkit_bin()).args(args).output().expect("plistkit command executes")
}

/// Run a command that must succeed and return its stdout.
pub(crate) fn run_plistkit_stdout(args: &[&str]) -> String {
	let output = run_plistkit(args);
	assert!(
		output.status.success(),
		"plistkit {args:?} failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout is utf-8")
}

pub(crate) fn run_plistkit_json(args: &[&str]) -> serde_json::Value {
	let stdout = run_plistkit_stdout(args);
	serde_json::from_str(&stdout).expect("stdout should be valid json")
}

/// Run a command that must fail the way `main` reports errors; returns stderr.
pub(crate) fn run_plistkit_failure(args: &[&str]) -> String {
	let output = run_plistkit(args);
	assert_eq!(output.status.code(), Some(1), "plistkit {args:?} should exit with status 1");
	assert!(output.stdout.is_empty(), "failed command printed to stdout");

	let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
	assert!(stderr.starts_with("error: "), "{stderr}");
	stderr
}

fn plistkit_bin() -> &'static PathBuf {
	PLISTKIT_BIN.get_or_init(|| match std::env::var_os("CARGO_BIN_EXE_plistkit") {
		Some(path) => PathBuf::from(path),
		None => build_plistkit_bin(),
	})
}

/// Unit tests do not get `CARGO_BIN_EXE_*`, so build the binary once on demand.
fn build_plistkit_bin() -> PathBuf {
	let bin = target_dir().join("debug").join(if cfg!(windows) { "plistkit.exe" } else { "plistkit" });

	let status = Command::new("cargo")
		.current_dir(env!("CARGO_MANIFEST_DIR"))
		.args(["build", "--quiet", "--bin", "plistkit"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build plistkit binary at {}", bin.display());

	bin
}

use std::path::PathBuf;

use plistkit::plist::{FileSource, Format, Result, parse_with_format, write_file};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub input: PathBuf,
	pub output: PathBuf,
	#[arg(long, value_enum)]
	pub to: TargetFormat,
	#[arg(long)]
	pub json: bool,
}

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetFormat {
	/// `bplist00` binary.
	Binary,
	/// Apple XML.
	Xml,
}

impl From<TargetFormat> for Format {
	fn from(target: TargetFormat) -> Self {
		match target {
			TargetFormat::Binary => Format::Binary,
			TargetFormat::Xml => Format::Xml,
		}
	}
}

/// Parse `input` in whichever format it is in and write it to `output` as `--to`.
pub fn run(args: Args) -> Result<()> {
	let Args { input, output, to, json } = args;
	let to = Format::from(to);

	let (value, from) = parse_with_format(FileSource::open(&input)?)?;
	write_file(&value, &output, to)?;
	let bytes = std::fs::metadata(&output)?.len();

	if json {
		let payload = ConvertJson {
			input: input.display().to_string(),
			output: output.display().to_string(),
			from: from.label(),
			to: to.label(),
			bytes,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("{} ({from}) -> {} ({to}, {bytes} bytes)", input.display(), output.display());
	Ok(())
}

#[derive(serde::Serialize)]
struct ConvertJson {
	input: String,
	output: String,
	from: &'static str,
	to: &'static str,
	bytes: u64,
}

#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "plistkit", about = "Property list inspection and conversion tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Report format, trailer, and tree statistics.
	Info(cmd::info::Args),
	/// Print the value tree.
	Show(cmd::show::Args),
	/// Rewrite a property list in another format.
	Convert(cmd::convert::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> plistkit::plist::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Show(args) => cmd::show::run(args),
		Commands::Convert(args) => cmd::convert::run(args),
	}
}

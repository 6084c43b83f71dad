mod args;

use std::process::ExitCode;

use args::Command;
use log::{error, info};
use rsgen_core::model::generator::Generator;

fn main() -> ExitCode {
	let argv: Vec<String> = std::env::args().skip(1).collect();
	let (config, verbose) = match args::from_args(&argv) {
		Ok(Command::Help) => {
			args::print_help();
			return ExitCode::SUCCESS;
		}
		Ok(Command::Run { config, verbose }) => (config, verbose),
		Err(message) => {
			eprintln!("rsgen: {message}");
			args::print_usage();
			return ExitCode::from(2);
		}
	};

	let level = if verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

	match Generator::new(config).run() {
		Ok(summary) => {
			info!(
				"done: {} codepoints, {} bytes, {} distinct characters",
				summary.codepoints_written, summary.bytes_written, summary.distinct
			);
			ExitCode::SUCCESS
		}
		Err(e) => {
			error!("{e}");
			ExitCode::FAILURE
		}
	}
}

//! Command-line parsing for `rsgen`.
//!
//! Produces a validated `rsgen_core::config::Config`. Usage errors are plain
//! strings; the binary prints them with the usage line and exits with 2.

use std::path::PathBuf;

use rsgen_core::config::{Config, Source};

/// What the command line asks for.
#[derive(Debug)]
pub enum Command {
	Help,
	Run { config: Config, verbose: bool },
}

/// Parses the arguments following the program name.
pub fn from_args(args: &[String]) -> Result<Command, String> {
	let mut sources: Vec<Source> = Vec::new();
	let mut range: Option<u32> = None;
	let mut range_start: Option<u32> = None;
	let mut length: Option<u64> = None;
	let mut output: Option<PathBuf> = None;
	let mut prng: Option<String> = None;
	let mut seed: Option<u64> = None;
	let mut input_encoding: Option<String> = None;
	let mut output_encoding: Option<String> = None;
	let mut internal_encoding: Option<String> = None;
	let mut save_table: Option<PathBuf> = None;
	let mut verbose = false;

	let mut i = 0;
	while i < args.len() {
		let flag = args[i].as_str();
		match flag {
			"--alphabet" => sources.push(Source::Alphabet(value(args, &mut i, "a string")?.to_string())),
			"--range" => {
				let size = value(args, &mut i, "a number")?;
				range = Some(size.parse().map_err(|_| format!("invalid range size: {size}"))?);
			}
			"--range-start" => range_start = Some(parse_codepoint(value(args, &mut i, "a codepoint")?)?),
			"--input" => sources.push(Source::File(PathBuf::from(value(args, &mut i, "a path")?))),
			"--table" => sources.push(Source::Table(PathBuf::from(value(args, &mut i, "a path")?))),
			"--length" => {
				let n = value(args, &mut i, "a number")?;
				length = Some(n.parse().map_err(|_| format!("invalid length: {n}"))?);
			}
			"--output" => output = Some(PathBuf::from(value(args, &mut i, "a path")?)),
			"--prng" => prng = Some(value(args, &mut i, "a backend")?.to_string()),
			"--seed" => {
				let n = value(args, &mut i, "a number")?;
				seed = Some(n.parse().map_err(|_| format!("invalid seed: {n}"))?);
			}
			"--input-encoding" => input_encoding = Some(value(args, &mut i, "an encoding")?.to_string()),
			"--output-encoding" => output_encoding = Some(value(args, &mut i, "an encoding")?.to_string()),
			"--internal-encoding" => internal_encoding = Some(value(args, &mut i, "an encoding")?.to_string()),
			"--save-table" => save_table = Some(PathBuf::from(value(args, &mut i, "a path")?)),
			"--verbose" | "-v" => verbose = true,
			"--help" | "-h" => return Ok(Command::Help),
			_ => return Err(format!("unknown argument: {flag}")),
		}
		i += 1;
	}

	if let Some(size) = range {
		sources.push(Source::Range { start: range_start.unwrap_or(0), size });
	} else if range_start.is_some() {
		return Err("--range-start requires --range".to_string());
	}
	let source = match sources.len() {
		0 => return Err("one of --alphabet, --range, --input or --table is required".to_string()),
		1 => sources.remove(0),
		_ => return Err("--alphabet, --range, --input and --table are mutually exclusive".to_string()),
	};
	let length = length.ok_or("--length is required")?;
	let output = output.ok_or("--output is required")?;

	let mut config = Config::new(source, length, output).map_err(|e| e.to_string())?;
	if let Some(selector) = prng {
		config.set_backend(&selector).map_err(|e| e.to_string())?;
	}
	config.seed = seed;
	if let Some(name) = input_encoding {
		config.set_input_encoding(&name).map_err(|e| e.to_string())?;
	}
	if let Some(name) = output_encoding {
		config.set_output_encoding(&name).map_err(|e| e.to_string())?;
	}
	if let Some(name) = internal_encoding {
		config.set_internal_encoding(&name).map_err(|e| e.to_string())?;
	}
	config.save_table = save_table;

	Ok(Command::Run { config, verbose })
}

/// Takes the value following the flag at `*i`.
fn value<'a>(args: &'a [String], i: &mut usize, what: &str) -> Result<&'a str, String> {
	let flag = &args[*i];
	*i += 1;
	args.get(*i).map(String::as_str).ok_or_else(|| format!("{flag} requires {what}"))
}

/// Accepts `U+XXXX`, `0xXXXX` or a decimal number.
fn parse_codepoint(text: &str) -> Result<u32, String> {
	let parsed = match text.strip_prefix("U+").or_else(|| text.strip_prefix("0x")) {
		Some(hex) => u32::from_str_radix(hex, 16),
		None => text.parse(),
	};
	parsed.map_err(|_| format!("invalid codepoint: {text}"))
}

pub fn print_usage() {
	eprintln!(
		"usage: rsgen (--alphabet <STR> | --range <N> [--range-start <U+XXXX>] | --input <PATH> | --table <PATH>) \
		 --length <N> --output <PATH> [OPTIONS]"
	);
	eprintln!("try 'rsgen --help' for more information");
}

pub fn print_help() {
	println!("rsgen: random text following a character distribution");
	println!();
	println!("USAGE:");
	println!("    rsgen <SOURCE> --length <N> --output <PATH> [OPTIONS]");
	println!();
	println!("SOURCE (exactly one):");
	println!("    --alphabet <STR>             Uniform over the distinct characters of STR");
	println!("    --range <N>                  Uniform over N consecutive codepoints");
	println!("    --range-start <CP>           First codepoint of the range (default: U+0000)");
	println!("    --input <PATH>               Character frequencies of a text file");
	println!("    --table <PATH>               Occurrence table saved with --save-table");
	println!();
	println!("OPTIONS:");
	println!("    --length <N>                 Number of characters to generate");
	println!("    --output <PATH>              Output file, created or truncated");
	println!("    --prng <1|2|3>               1 = seeded (mt), 2 = thread (libc), 3 = urandom (default: 1)");
	println!("    --seed <N>                   Seed of the seeded generator (default: current time)");
	println!("    --input-encoding <NAME>      Encoding of --input (default: UTF-8)");
	println!("    --output-encoding <NAME>     Encoding of the output, //TRANSLIT allowed (default: UTF-8)");
	println!("    --internal-encoding <NAME>   ASCII, UCS-2LE or UCS-4LE (default: platform)");
	println!("    --save-table <PATH>          Save the occurrence table");
	println!("    --verbose, -v                Debug logging (RUST_LOG overrides)");
	println!("    --help, -h                   Print this help");
	println!();
	println!("EXAMPLES:");
	println!("    rsgen --alphabet ACGT --length 1000 --output dna.txt");
	println!("    rsgen --range 26 --range-start U+0061 --length 80 --output lower.txt --seed 42");
	println!("    rsgen --input book.txt --input-encoding ISO-8859-1 --length 100000 --output fake.txt");
}

#[cfg(test)]
mod tests {
	use super::*;
	use rsgen_core::codec::{Encoding, InternalWidth};
	use rsgen_core::draw::Backend;

	fn parse(line: &str) -> Result<Command, String> {
		let args: Vec<String> = line.split_whitespace().map(String::from).collect();
		from_args(&args)
	}

	fn config(line: &str) -> Config {
		match parse(line) {
			Ok(Command::Run { config, .. }) => config,
			other => panic!("unexpected parse result: {other:?}"),
		}
	}

	#[test]
	fn alphabet_run() {
		let config = config("--alphabet xy --length 10 --output out.txt");
		assert_eq!(config.source, Source::Alphabet("xy".into()));
		assert_eq!(config.length(), 10);
		assert_eq!(config.output, PathBuf::from("out.txt"));
		assert_eq!(config.backend, Backend::Seeded);
	}

	#[test]
	fn range_start_forms() {
		for start in ["U+0061", "0x61", "97"] {
			let config = config(&format!("--range 26 --range-start {start} --length 1 --output o"));
			assert_eq!(config.source, Source::Range { start: 0x61, size: 26 });
		}
		assert_eq!(config("--range 5 --length 1 --output o").source, Source::Range { start: 0, size: 5 });
	}

	#[test]
	fn options_reach_the_config() {
		let config = config(
			"--input in.txt --length 3 --output o --prng 3 --seed 7 --input-encoding LATIN1 \
			 --output-encoding UTF-16BE --internal-encoding UCS-2LE --save-table t.bin",
		);
		assert_eq!(config.backend, Backend::Urandom);
		assert_eq!(config.seed, Some(7));
		assert_eq!(config.input_charset.encoding, Encoding::Latin1);
		assert_eq!(config.output_charset.encoding, Encoding::Utf16Be);
		assert_eq!(config.internal, InternalWidth::Wide16);
		assert_eq!(config.save_table, Some(PathBuf::from("t.bin")));
	}

	#[test]
	fn verbose_and_help() {
		assert!(matches!(parse("--table t --length 1 --output o -v"), Ok(Command::Run { verbose: true, .. })));
		assert!(matches!(parse("--length 1 --help"), Ok(Command::Help)));
	}

	#[test]
	fn usage_errors() {
		assert!(parse("--length 1 --output o").unwrap_err().contains("required"));
		assert!(parse("--alphabet a --input f --length 1 --output o").unwrap_err().contains("exclusive"));
		assert!(parse("--alphabet a --output o").unwrap_err().contains("--length"));
		assert!(parse("--alphabet a --length 1").unwrap_err().contains("--output"));
		assert!(parse("--alphabet a --length").unwrap_err().contains("requires"));
		assert!(parse("--alphabet a --length -3 --output o").is_err());
		assert!(parse("--alphabet a --length 0 --output o").is_err());
		assert!(parse("--range-start 5 --alphabet a --length 1 --output o").is_err());
		assert!(parse("--alphabet a --length 1 --output o --prng 4").is_err());
		assert!(parse("--alphabet a --length 1 --output o --frobnicate").unwrap_err().contains("unknown"));
	}
}

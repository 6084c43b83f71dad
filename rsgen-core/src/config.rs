use std::path::PathBuf;

use crate::codec::{Charset, InternalWidth};
use crate::draw::Backend;
use crate::error::{CodecError, ConfigError, DrawSourceError};
use crate::stream::BLOCK_SIZE;

/// Where the character distribution comes from.
///
/// # Variants
/// - `Alphabet(String)`: uniform over the distinct characters of the string
/// - `Range { start, size }`: uniform over `size` consecutive codepoints
///   starting at `start`
/// - `File(PathBuf)`: empirical character frequencies of a text file
/// - `Table(PathBuf)`: an occurrence table saved by an earlier run
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
	Alphabet(String),
	Range { start: u32, size: u32 },
	File(PathBuf),
	Table(PathBuf),
}

/// Parameters of one generation run.
///
/// # Responsibilities
/// - Hold the distribution source, output length and output path
/// - Hold the backend, encodings and internal width
/// - Validate values whose invalid forms cannot be expressed by the types
///
/// # Invariants
/// - `length >= 1`
/// - `block_size >= 1`
/// - An alphabet source is never empty, a range source never has size 0
#[derive(Debug, Clone)]
pub struct Config {
	/// Distribution source.
	pub source: Source,

	/// Output file, created or truncated.
	pub output: PathBuf,

	/// Pseudorandom backend.
	pub backend: Backend,

	/// Seed of the `Seeded` backend; wall-clock time when `None`.
	pub seed: Option<u64>,

	/// Encoding of the input file (alphabets are always UTF-8).
	pub input_charset: Charset,

	/// Encoding of the output file.
	pub output_charset: Charset,

	/// Width of the internal representation.
	pub internal: InternalWidth,

	/// Where to save the occurrence table, if anywhere.
	pub save_table: Option<PathBuf>,

	/// Number of codepoints to generate.
	length: u64,

	/// Codepoints (or input bytes) per block.
	block_size: usize,
}

impl Config {
	/// Creates a configuration with default backend and encodings.
	///
	/// # Errors
	/// - `ConfigError::ZeroLength` if `length` is zero
	/// - `ConfigError::EmptyAlphabet` / `ConfigError::EmptyRange` for an
	///   empty source
	pub fn new<P: Into<PathBuf>>(source: Source, length: u64, output: P) -> Result<Self, ConfigError> {
		match &source {
			Source::Alphabet(alphabet) if alphabet.is_empty() => return Err(ConfigError::EmptyAlphabet),
			Source::Range { size: 0, .. } => return Err(ConfigError::EmptyRange),
			_ => (),
		}

		let mut config = Self {
			source,
			output: output.into(),
			backend: Backend::default(),
			seed: None,
			input_charset: Charset::default(),
			output_charset: Charset::default(),
			internal: InternalWidth::platform(),
			save_table: None,
			length: 0,
			block_size: BLOCK_SIZE,
		};
		config.set_length(length)?;
		Ok(config)
	}

	/// Returns the number of codepoints to generate.
	pub fn length(&self) -> u64 {
		self.length
	}

	/// Sets the number of codepoints to generate.
	///
	/// # Errors
	/// Returns an error if `length` is zero.
	pub fn set_length(&mut self, length: u64) -> Result<(), ConfigError> {
		if length == 0 {
			return Err(ConfigError::ZeroLength);
		}
		self.length = length;
		Ok(())
	}

	/// Returns the block size.
	pub fn block_size(&self) -> usize {
		self.block_size
	}

	/// Sets the block size. Only tests need anything but the default.
	///
	/// # Errors
	/// Returns an error if `block_size` is zero.
	pub fn set_block_size(&mut self, block_size: usize) -> Result<(), ConfigError> {
		if block_size == 0 {
			return Err(ConfigError::ZeroBlockSize);
		}
		self.block_size = block_size;
		Ok(())
	}

	/// Selects the backend from a selector (`1`..`3` or a name).
	pub fn set_backend(&mut self, selector: &str) -> Result<(), DrawSourceError> {
		self.backend = selector.parse()?;
		Ok(())
	}

	/// Sets the input encoding from an iconv-style name.
	pub fn set_input_encoding(&mut self, name: &str) -> Result<(), CodecError> {
		self.input_charset = name.parse()?;
		Ok(())
	}

	/// Sets the output encoding from an iconv-style name.
	pub fn set_output_encoding(&mut self, name: &str) -> Result<(), CodecError> {
		self.output_charset = name.parse()?;
		Ok(())
	}

	/// Overrides the internal width with `ASCII`, `UCS-2LE` or `UCS-4LE`.
	pub fn set_internal_encoding(&mut self, name: &str) -> Result<(), ConfigError> {
		self.internal = name.parse()?;
		Ok(())
	}
}

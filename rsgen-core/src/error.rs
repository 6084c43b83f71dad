//! Error types for the generation pipeline.
//!
//! Every failure is terminal for the run: nothing is retried. The only
//! recoverable condition (an exhausted output buffer during conversion) is
//! not an error and is reported through `ConversionStatus::OutputFull`.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type returned by the public API.
#[derive(Debug, Error)]
pub enum Error {
	/// Invalid or incomplete run configuration
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	/// Pseudorandom backend construction or read failure
	#[error("draw source error: {0}")]
	DrawSource(#[from] DrawSourceError),

	/// Text conversion failure (malformed or unrepresentable input)
	#[error("conversion error: {0}")]
	Codec(#[from] CodecError),

	/// Internal invariant violation while sampling
	#[error("sampler error: {0}")]
	Sampler(#[from] SamplerError),

	/// I/O failure on a file we know the path of
	#[error("{}: {source}", path.display())]
	File {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// I/O failure on an anonymous stream
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Saved occurrence table could not be (de)serialized
	#[error("occurrence table error: {0}")]
	Table(#[from] postcard::Error),
}

impl Error {
	/// Wraps an I/O error with the path it happened on.
	pub fn file<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
		Error::File { path: path.into(), source }
	}
}

/// Errors in the run configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	/// The requested output length is zero
	#[error("output length must be at least 1")]
	ZeroLength,

	/// The alphabet string contains no character
	#[error("alphabet must contain at least one character")]
	EmptyAlphabet,

	/// The synthetic range is empty
	#[error("range size must be at least 1")]
	EmptyRange,

	/// The synthetic range leaves the internal representation
	#[error("range of {size} codepoints starting at U+{start:04X} does not fit in {width}")]
	RangeTooLarge { start: u32, size: u32, width: &'static str },

	/// The range start is not a Unicode scalar value
	#[error("invalid range start U+{0:04X}")]
	InvalidRangeStart(u32),

	/// The internal encoding is not one of the fixed-width representations
	#[error("unsupported internal encoding '{0}' (expected ASCII, UCS-2LE or UCS-4LE)")]
	InternalEncoding(String),

	/// The block size is zero
	#[error("block size must be at least 1")]
	ZeroBlockSize,
}

/// Errors of the uniform draw source.
#[derive(Debug, Error)]
pub enum DrawSourceError {
	/// The backend selector is not recognized
	#[error("unknown pseudorandom backend '{0}'")]
	UnknownBackend(String),

	/// The entropy device could not be opened
	#[error("cannot open entropy device {}: {source}", path.display())]
	Open {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Reading the entropy device failed
	#[error("cannot read entropy device: {0}")]
	Read(#[source] std::io::Error),

	/// The entropy device reported end of file
	#[error("entropy device reached end of file")]
	EndOfFile,

	/// The entropy device returned fewer bytes than requested
	#[error("short read from entropy device: expected {expected} bytes, got {actual}")]
	ShortRead { expected: usize, actual: usize },
}

/// Errors of the codec bridge.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
	/// The encoding name is not supported
	#[error("unknown encoding '{0}'")]
	UnknownEncoding(String),

	/// Malformed input for the declared source encoding
	#[error("invalid {encoding} sequence at byte offset {offset}")]
	InvalidSequence { encoding: &'static str, offset: usize },

	/// A character cannot be represented in the target encoding
	#[error("U+{codepoint:04X} cannot be represented in {encoding}")]
	Unrepresentable { codepoint: u32, encoding: &'static str },

	/// Input ended in the middle of a multi-byte sequence
	#[error("input ends with {leftover} bytes of an incomplete sequence")]
	TruncatedInput { leftover: usize },
}

/// Internal invariant violations of the sampler.
#[derive(Debug, Error, PartialEq)]
pub enum SamplerError {
	/// No codepoint to sample from
	#[error("cannot build a distribution from an empty occurrence table")]
	EmptyDistribution,

	/// The occurrence counts sum past `u64::MAX`
	#[error("total occurrence count does not fit in 64 bits")]
	WeightOverflow,

	/// The lower-bound lookup ran past the end of the table
	#[error("lookup of {scaled} ran past the end of the distribution (total {total})")]
	PastEnd { scaled: u64, total: u64 },

	/// Tallied and expected codepoint counts differ
	#[error("codepoint count mismatch: expected {expected}, got {actual}")]
	CountMismatch { expected: u64, actual: u64 },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

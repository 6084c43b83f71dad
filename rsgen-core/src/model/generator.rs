use log::info;

use super::distribution::CumulativeDistribution;
use super::occurrences::OccurrenceTable;
use super::sampler::Sampler;
use crate::codec::{Charset, CodecBridge};
use crate::config::{Config, Source};
use crate::draw::DrawSource;
use crate::error::{CodecError, Result, SamplerError};
use crate::io;
use crate::stream::reader::StreamingReader;
use crate::stream::writer::StreamingWriter;

/// Outcome of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
	/// Distinct codepoints in the distribution
	pub distinct: usize,
	/// Sum of all occurrence counts
	pub total_weight: u64,
	pub codepoints_written: u64,
	pub bytes_written: u64,
}

/// End-to-end generation pipeline.
///
/// # Responsibilities
/// - Build the occurrence table from the configured source
/// - Turn it into a cumulative distribution
/// - Sample, encode and write the requested number of codepoints
///
/// Reading and tallying finish before the output file is opened, so a
/// malformed input never leaves a partial output behind.
#[derive(Debug)]
pub struct Generator {
	config: Config,
}

impl Generator {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Builds the occurrence table of the configured source.
	///
	/// # Errors
	/// - I/O and conversion errors while reading an input file
	/// - `SamplerError::CountMismatch` if fewer or more codepoints were
	///   tallied than decoded
	/// - Configuration errors for a range that does not fit
	/// - `CodecError::Unrepresentable` for a saved table holding a codepoint
	///   outside the internal width
	pub fn build_table(&self) -> Result<OccurrenceTable> {
		let config = &self.config;
		let table = match &config.source {
			Source::Alphabet(alphabet) => {
				// Arguments are UTF-8 whatever the input encoding
				let bridge = CodecBridge::new(Charset::default(), config.internal);
				let mut table = OccurrenceTable::new();
				let read = StreamingReader::new(alphabet.as_bytes(), bridge)
					.with_block_size(config.block_size())
					.tally(&mut table)?;
				check_count(alphabet.chars().count() as u64, read)?;
				table.uniform()
			}
			Source::Range { start, size } => OccurrenceTable::from_range(*start, *size, config.internal)?,
			Source::File(path) => {
				let bridge = CodecBridge::new(config.input_charset, config.internal);
				let mut table = OccurrenceTable::new();
				let read = StreamingReader::new(io::open_input(path)?, bridge)
					.with_block_size(config.block_size())
					.with_path(path)
					.tally(&mut table)?;
				info!("read {read} codepoints from {}", path.display());
				check_count(read, table.total())?;
				table
			}
			Source::Table(path) => {
				let table = OccurrenceTable::load(path)?;
				if let Some((c, _)) = table.iter().find(|(c, _)| !config.internal.contains(*c)) {
					return Err(CodecError::Unrepresentable {
						codepoint: c as u32,
						encoding: config.internal.encoding().name(),
					}
					.into());
				}
				info!("loaded occurrence table from {}", path.display());
				table
			}
		};
		Ok(table)
	}

	/// Runs the pipeline with the configured draw source.
	pub fn run(&self) -> Result<RunSummary> {
		let source = DrawSource::new(self.config.backend, self.config.seed)?;
		self.run_with(source)
	}

	/// Runs the pipeline with an explicit draw source.
	///
	/// # Errors
	/// Any error of a stage aborts the run. Bytes already written to the
	/// output file stay there.
	pub fn run_with(&self, source: DrawSource) -> Result<RunSummary> {
		let config = &self.config;
		let table = self.build_table()?;
		if let Some(path) = &config.save_table {
			table.save(path)?;
			info!("saved occurrence table to {}", path.display());
		}

		let distribution = CumulativeDistribution::build(&table)?;
		let distinct = distribution.len();
		let total_weight = distribution.total();
		info!("distribution: {distinct} distinct codepoints, total weight {total_weight}");

		let mut sampler = Sampler::new(distribution, source);
		let output = io::create_output(&config.output)?;
		let bridge = CodecBridge::new(config.output_charset, config.internal);
		let mut writer = StreamingWriter::new(output, bridge)
			.with_block_size(config.block_size())
			.with_path(&config.output);
		let summary = writer.write(&mut sampler, config.length())?;
		io::close_output(writer.into_inner(), &config.output)?;
		check_count(config.length(), summary.codepoints)?;

		info!(
			"wrote {} codepoints ({} bytes, {}) to {}",
			summary.codepoints,
			summary.bytes,
			config.output_charset,
			config.output.display()
		);
		Ok(RunSummary {
			distinct,
			total_weight,
			codepoints_written: summary.codepoints,
			bytes_written: summary.bytes,
		})
	}
}

fn check_count(expected: u64, actual: u64) -> std::result::Result<(), SamplerError> {
	if expected != actual {
		return Err(SamplerError::CountMismatch { expected, actual });
	}
	Ok(())
}

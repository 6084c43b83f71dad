use std::io::Write;
use std::path::PathBuf;

use log::debug;

use super::BLOCK_SIZE;
use crate::codec::{CodecBridge, ConversionStatus};
use crate::error::{Error, Result};
use crate::model::sampler::Sampler;

/// Split of an output length into bounded blocks.
///
/// `length = full_blocks * block_size + remainder`, with a final block of
/// `remainder` codepoints only when it is nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
	pub block_size: usize,
	pub full_blocks: u64,
	pub remainder: usize,
}

impl BlockPlan {
	/// A `block_size` of zero is treated as 1.
	pub fn new(length: u64, block_size: usize) -> Self {
		let block_size = block_size.max(1);
		let size = block_size as u64;
		Self {
			block_size,
			full_blocks: length / size,
			remainder: (length % size) as usize,
		}
	}

	/// Sizes of all blocks, in order.
	pub fn blocks(&self) -> impl Iterator<Item = usize> {
		let remainder = (self.remainder > 0).then_some(self.remainder);
		std::iter::repeat_n(self.block_size, self.full_blocks as usize).chain(remainder)
	}

	/// Size of the largest block, which sizes the buffers.
	pub fn largest(&self) -> usize {
		if self.full_blocks > 0 { self.block_size } else { self.remainder }
	}
}

/// Totals of one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
	pub codepoints: u64,
	pub bytes: u64,
	pub blocks: u64,
}

/// Samples codepoints block by block, encodes them and writes the bytes.
///
/// The encode buffer holds `block_size` times the worst-case width of the
/// target encoding, so a freshly sampled block always fits. Bytes already
/// written are never rolled back when a later block fails.
pub struct StreamingWriter<W> {
	inner: W,
	bridge: CodecBridge,
	block_size: usize,
	/// Used in error messages only
	path: Option<PathBuf>,
}

impl<W: Write> StreamingWriter<W> {
	pub fn new(inner: W, bridge: CodecBridge) -> Self {
		Self { inner, bridge, block_size: BLOCK_SIZE, path: None }
	}

	/// Overrides the number of codepoints per block (at least 1).
	pub fn with_block_size(mut self, block_size: usize) -> Self {
		self.block_size = block_size.max(1);
		self
	}

	/// Names the stream in I/O errors.
	pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
		self.path = Some(path.into());
		self
	}

	/// Writes `length` sampled codepoints.
	///
	/// # Errors
	/// Any sampler, conversion or write error aborts the remaining blocks.
	pub fn write(&mut self, sampler: &mut Sampler, length: u64) -> Result<WriteSummary> {
		let plan = BlockPlan::new(length, self.block_size);
		let mut chars = vec!['\0'; plan.largest()];
		let mut bytes = vec![0u8; self.bridge.encoded_capacity(plan.largest())];
		let mut summary = WriteSummary::default();

		for size in plan.blocks() {
			let block = &mut chars[..size];
			sampler.fill(block)?;

			let mut start = 0;
			loop {
				let conversion = self.bridge.encode(&block[start..], &mut bytes)?;
				self.write_bytes(&bytes[..conversion.produced])?;
				summary.bytes += conversion.produced as u64;
				start += conversion.consumed;
				if conversion.status != ConversionStatus::OutputFull {
					break;
				}
			}

			summary.codepoints += size as u64;
			summary.blocks += 1;
			debug!("block {}: {size} codepoints, {} bytes so far", summary.blocks, summary.bytes);
		}

		self.inner.flush().map_err(|e| self.io_error(e))?;
		Ok(summary)
	}

	/// Gives the underlying writer back.
	pub fn into_inner(self) -> W {
		self.inner
	}

	fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
		self.inner.write_all(bytes).map_err(|e| self.io_error(e))
	}

	fn io_error(&self, e: std::io::Error) -> Error {
		match &self.path {
			Some(path) => Error::file(path, e),
			None => Error::Io(e),
		}
	}
}

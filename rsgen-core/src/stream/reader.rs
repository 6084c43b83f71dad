use std::io::{self, Read};
use std::path::PathBuf;

use log::debug;

use super::BLOCK_SIZE;
use crate::codec::{CodecBridge, ConversionStatus};
use crate::error::{Error, Result};
use crate::model::occurrences::OccurrenceTable;

/// Longest carry a decode call can leave behind (an unfinished character
/// or an undecided byte-order mark).
const MAX_CARRY: usize = 4;

/// Reads a byte stream in bounded blocks and decodes it into codepoints.
///
/// # Responsibilities
/// - Read up to `block_size` bytes per cycle
/// - Prepend the bytes the previous decode left unconsumed
/// - Hand every decoded block to a sink (usually an `OccurrenceTable`)
///
/// # Invariants
/// - After the last block the carry is empty, otherwise the input ended in
///   the middle of a sequence and reading fails
pub struct StreamingReader<R> {
	inner: R,
	bridge: CodecBridge,
	block_size: usize,
	/// Used in error messages only
	path: Option<PathBuf>,
}

impl<R: Read> StreamingReader<R> {
	pub fn new(inner: R, bridge: CodecBridge) -> Self {
		Self { inner, bridge, block_size: BLOCK_SIZE, path: None }
	}

	/// Overrides the number of bytes read per cycle (at least 1).
	pub fn with_block_size(mut self, block_size: usize) -> Self {
		self.block_size = block_size.max(1);
		self
	}

	/// Names the stream in I/O errors.
	pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
		self.path = Some(path.into());
		self
	}

	/// Tallies every decoded codepoint into `table`.
	///
	/// Returns the number of codepoints read.
	pub fn tally(self, table: &mut OccurrenceTable) -> Result<u64> {
		self.read_into(|block| table.accumulate(block))
	}

	/// Decodes the whole stream, passing each decoded block to `sink`.
	///
	/// Returns the number of codepoints passed to `sink`.
	///
	/// # Errors
	/// - I/O errors of the underlying reader
	/// - Hard conversion errors, including input that ends inside a sequence
	pub fn read_into<F: FnMut(&[char])>(mut self, mut sink: F) -> Result<u64> {
		let mut bytes = vec![0u8; self.block_size + MAX_CARRY];
		// Every codepoint takes at least one byte
		let mut chars = vec!['\0'; self.block_size + MAX_CARRY];
		let mut carry = 0;
		let mut total = 0u64;
		let mut blocks = 0u64;

		loop {
			let read = self.read_block(&mut bytes[carry..carry + self.block_size])?;
			if read == 0 {
				break;
			}
			let filled = carry + read;

			let mut start = 0;
			loop {
				let conversion = self.bridge.decode(&bytes[start..filled], &mut chars)?;
				if conversion.produced > 0 {
					sink(&chars[..conversion.produced]);
					total += conversion.produced as u64;
				}
				start += conversion.consumed;
				if conversion.status != ConversionStatus::OutputFull {
					break;
				}
			}

			carry = self.bridge.leftover();
			debug_assert_eq!(carry, filled - start);
			bytes.copy_within(start..filled, 0);
			blocks += 1;
			debug!("block {blocks}: {read} bytes read, {carry} carried, {total} codepoints so far");
		}

		self.bridge.finish()?;
		Ok(total)
	}

	/// One `read` call, retried only when interrupted by a signal.
	fn read_block(&mut self, buffer: &mut [u8]) -> Result<usize> {
		loop {
			match self.inner.read(buffer) {
				Ok(read) => return Ok(read),
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => {
					return Err(match &self.path {
						Some(path) => Error::file(path, e),
						None => Error::Io(e),
					});
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::{Charset, Encoding, InternalWidth};
	use crate::error::CodecError;

	/// Hands out the given chunks one `read` call at a time.
	struct Chunked {
		chunks: Vec<Vec<u8>>,
	}

	impl Read for Chunked {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			if self.chunks.is_empty() {
				return Ok(0);
			}
			let chunk = self.chunks.remove(0);
			assert!(chunk.len() <= buf.len());
			buf[..chunk.len()].copy_from_slice(&chunk);
			Ok(chunk.len())
		}
	}

	fn reader<R: Read>(inner: R, encoding: Encoding) -> StreamingReader<R> {
		StreamingReader::new(inner, CodecBridge::new(Charset::new(encoding), InternalWidth::Wide32))
	}

	fn collect<R: Read>(reader: StreamingReader<R>) -> Result<String> {
		let mut text = String::new();
		reader.read_into(|block| text.extend(block))?;
		Ok(text)
	}

	#[test]
	fn split_sequence_across_reads() {
		// "€" (E2 82 AC) split 1/2 across two reads
		let inner = Chunked { chunks: vec![vec![b'x', 0xE2], vec![0x82, 0xAC, b'y']] };
		assert_eq!(collect(reader(inner, Encoding::Utf8)).unwrap(), "x€y");
	}

	#[test]
	fn tiny_blocks_lose_nothing() {
		let text = "Žluťoučký kůň úpěl ďábelské ódy 😀";
		for block_size in [1, 2, 3, 5, 7] {
			let reader = reader(text.as_bytes(), Encoding::Utf8).with_block_size(block_size);
			assert_eq!(collect(reader).unwrap(), text, "block size {block_size}");
		}
	}

	#[test]
	fn utf16_with_bom_in_small_blocks() {
		let mut bytes = vec![0xFF, 0xFE];
		for unit in "hé😀".encode_utf16() {
			bytes.extend(unit.to_le_bytes());
		}
		let reader = reader(&bytes[..], Encoding::Utf16).with_block_size(1);
		assert_eq!(collect(reader).unwrap(), "hé😀");
	}

	#[test]
	fn tally_counts_codepoints() {
		let mut table = OccurrenceTable::new();
		let read = reader("abracadabra".as_bytes(), Encoding::Ascii).with_block_size(4).tally(&mut table).unwrap();
		assert_eq!(read, 11);
		assert_eq!(table.count('a'), 5);
		assert_eq!(table.count('r'), 2);
		assert_eq!(table.total(), 11);
	}

	#[test]
	fn truncated_trailing_sequence_fails() {
		let err = collect(reader(&[b'a', 0xE2, 0x82][..], Encoding::Utf8)).unwrap_err();
		assert!(matches!(err, Error::Codec(CodecError::TruncatedInput { leftover: 2 })));
	}

	#[test]
	fn malformed_input_aborts() {
		let err = collect(reader(&[b'a', 0xFF, b'b'][..], Encoding::Utf8)).unwrap_err();
		assert!(matches!(err, Error::Codec(CodecError::InvalidSequence { offset: 1, .. })));
	}

	#[test]
	fn empty_input_reads_nothing() {
		assert_eq!(collect(reader(&b""[..], Encoding::Utf8)).unwrap(), "");
	}
}

//! Conversion between encoded bytes and the fixed-width internal representation.
//!
//! The internal representation is a buffer of `char`s whose admissible range
//! is restricted by an `InternalWidth` (ASCII, UCS-2LE or UCS-4LE). A
//! `CodecBridge` converts one external encoding to and from it, in bounded
//! buffers, without ever growing them.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::error::{CodecError, ConfigError};

/// Single-character decode/encode steps for every supported encoding.
mod encoding;

pub use encoding::{ByteOrder, Encoding};
use encoding::{DecodeStep, EncodeStep};

/// Replacement emitted for unmappable characters in transliteration mode.
const SUBSTITUTE: char = '?';

/// Width of one code unit of the internal representation.
///
/// # Invariants
/// - The internal representation never carries a byte-order mark
/// - Widths above one byte are little endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalWidth {
	/// 1 byte, `ASCII`
	Narrow,
	/// 2 bytes, `UCS-2LE`
	Wide16,
	/// 4 bytes, `UCS-4LE`
	Wide32,
}

impl InternalWidth {
	/// Width derived from the platform's wide character size.
	pub fn platform() -> Self {
		match size_of::<char>() {
			1 => InternalWidth::Narrow,
			2 => InternalWidth::Wide16,
			_ => InternalWidth::Wide32,
		}
	}

	/// Number of bytes of one code unit.
	pub fn bytes(self) -> usize {
		match self {
			InternalWidth::Narrow => 1,
			InternalWidth::Wide16 => 2,
			InternalWidth::Wide32 => 4,
		}
	}

	/// Encoding the internal buffers correspond to.
	pub fn encoding(self) -> Encoding {
		match self {
			InternalWidth::Narrow => Encoding::Ascii,
			InternalWidth::Wide16 => Encoding::Ucs2Le,
			InternalWidth::Wide32 => Encoding::Utf32Le,
		}
	}

	/// Highest codepoint one code unit can hold.
	pub fn max_codepoint(self) -> u32 {
		match self {
			InternalWidth::Narrow => 0x7F,
			InternalWidth::Wide16 => 0xFFFF,
			InternalWidth::Wide32 => char::MAX as u32,
		}
	}

	/// Whether `c` fits in one code unit.
	pub fn contains(self, c: char) -> bool {
		c as u32 <= self.max_codepoint()
	}
}

impl FromStr for InternalWidth {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.parse::<Encoding>() {
			Ok(Encoding::Ascii) => Ok(InternalWidth::Narrow),
			Ok(Encoding::Ucs2Le) => Ok(InternalWidth::Wide16),
			Ok(Encoding::Utf32Le) => Ok(InternalWidth::Wide32),
			_ => Err(ConfigError::InternalEncoding(s.to_owned())),
		}
	}
}

impl fmt::Display for InternalWidth {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.encoding().name())
	}
}

/// An external encoding together with its unmappable-character policy.
///
/// Parsed from iconv-style names; a `//TRANSLIT` suffix replaces characters
/// the other side cannot represent by `?` instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
	pub encoding: Encoding,
	pub translit: bool,
}

impl Charset {
	pub fn new(encoding: Encoding) -> Self {
		Self { encoding, translit: false }
	}
}

impl Default for Charset {
	fn default() -> Self {
		Self::new(Encoding::Utf8)
	}
}

impl FromStr for Charset {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (name, translit) = match s.split_once("//") {
			Some((name, suffix)) if suffix.eq_ignore_ascii_case("TRANSLIT") => (name, true),
			Some(_) => return Err(CodecError::UnknownEncoding(s.to_owned())),
			None => (s, false),
		};
		Ok(Self { encoding: name.parse()?, translit })
	}
}

impl fmt::Display for Charset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.translit {
			write!(f, "{}//TRANSLIT", self.encoding)
		} else {
			write!(f, "{}", self.encoding)
		}
	}
}

/// How a conversion call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
	/// The whole input was converted
	Complete,
	/// The input ends with an unfinished sequence that was not consumed
	Incomplete,
	/// The output buffer is full; resume from `consumed`
	OutputFull,
}

/// Result of one `decode` or `encode` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
	/// Input units (bytes or codepoints) consumed
	pub consumed: usize,
	/// Output units (codepoints or bytes) produced
	pub produced: usize,
	pub status: ConversionStatus,
	/// Characters replaced in a non-reversible way
	pub lossy: usize,
}

/// Stateful converter between one external encoding and the internal representation.
///
/// # Responsibilities
/// - Decode raw bytes into internal codepoints, leaving an unfinished
///   trailing sequence unconsumed
/// - Encode internal codepoints into raw bytes
/// - Track the byte-order mark of `UTF-16` / `UTF-32` streams
///
/// # Invariants
/// - `leftover` is the number of bytes the last `decode` call left unconsumed
///   because they formed an incomplete sequence
/// - Neither direction grows the buffers it is given
#[derive(Debug)]
pub struct CodecBridge {
	charset: Charset,
	internal: InternalWidth,
	/// Byte order of the decoded stream, once known
	decode_order: Option<ByteOrder>,
	bom_written: bool,
	leftover: usize,
	/// Bytes decoded so far, for error offsets
	offset: usize,
	lossy: usize,
}

impl CodecBridge {
	pub fn new(charset: Charset, internal: InternalWidth) -> Self {
		let decode_order = if charset.encoding.has_bom() {
			None
		} else {
			Some(charset.encoding.default_order())
		};
		Self {
			charset,
			internal,
			decode_order,
			bom_written: false,
			leftover: 0,
			offset: 0,
			lossy: 0,
		}
	}

	pub fn charset(&self) -> Charset {
		self.charset
	}

	pub fn internal(&self) -> InternalWidth {
		self.internal
	}

	/// Bytes left unconsumed by the last `decode` call.
	pub fn leftover(&self) -> usize {
		self.leftover
	}

	/// Total number of non-reversible substitutions so far.
	pub fn lossy(&self) -> usize {
		self.lossy
	}

	/// Worst-case output size when encoding `codepoints` characters.
	pub fn encoded_capacity(&self, codepoints: usize) -> usize {
		codepoints * self.charset.encoding.max_char_len() + self.charset.encoding.max_prefix_len()
	}

	/// Decodes as many whole characters of `src` as fit in `dst`.
	///
	/// An unfinished sequence at the end of `src` is left unconsumed
	/// (`ConversionStatus::Incomplete`) and must be prepended to the next
	/// chunk. When `dst` fills up first, `ConversionStatus::OutputFull` is
	/// returned and the caller resumes at `consumed`.
	///
	/// # Errors
	/// - `CodecError::InvalidSequence` on malformed input
	/// - `CodecError::Unrepresentable` when a character does not fit the
	///   internal width and transliteration is off
	pub fn decode(&mut self, src: &[u8], dst: &mut [char]) -> Result<Conversion, CodecError> {
		let encoding = self.charset.encoding;
		let mut read = 0;
		let mut written = 0;
		let mut lossy = 0;
		let mut status = ConversionStatus::Complete;

		let order = match self.decode_order {
			Some(order) => order,
			None => {
				let prefix = encoding.max_prefix_len();
				if src.len() < prefix {
					// Not enough bytes yet to tell whether a BOM is present
					self.leftover = src.len();
					let status = if src.is_empty() { ConversionStatus::Complete } else { ConversionStatus::Incomplete };
					return Ok(Conversion { consumed: 0, produced: 0, status, lossy: 0 });
				}
				let order = if src.starts_with(encoding.bom(ByteOrder::Little)) {
					read = prefix;
					ByteOrder::Little
				} else if src.starts_with(encoding.bom(ByteOrder::Big)) {
					read = prefix;
					ByteOrder::Big
				} else {
					ByteOrder::Big
				};
				self.decode_order = Some(order);
				order
			}
		};

		while read < src.len() {
			if written == dst.len() {
				status = ConversionStatus::OutputFull;
				break;
			}
			match encoding.decode_step(order, &src[read..]) {
				DecodeStep::Char(c, len) => {
					let c = if self.internal.contains(c) {
						c
					} else if self.charset.translit {
						lossy += 1;
						SUBSTITUTE
					} else {
						return Err(CodecError::Unrepresentable {
							codepoint: c as u32,
							encoding: self.internal.encoding().name(),
						});
					};
					dst[written] = c;
					written += 1;
					read += len;
				}
				DecodeStep::Incomplete => {
					status = ConversionStatus::Incomplete;
					break;
				}
				DecodeStep::Invalid => {
					return Err(CodecError::InvalidSequence {
						encoding: encoding.name(),
						offset: self.offset + read,
					});
				}
			}
		}

		self.leftover = if status == ConversionStatus::Incomplete { src.len() - read } else { 0 };
		self.offset += read;
		self.note_lossy(lossy, "decode");
		Ok(Conversion { consumed: read, produced: written, status, lossy })
	}

	/// Encodes as many characters of `src` as fit in `dst`.
	///
	/// The byte-order mark of `UTF-16` / `UTF-32` is written before the first
	/// character of the stream.
	///
	/// # Errors
	/// Returns `CodecError::Unrepresentable` when a character does not exist in
	/// the target encoding and transliteration is off.
	pub fn encode(&mut self, src: &[char], dst: &mut [u8]) -> Result<Conversion, CodecError> {
		let encoding = self.charset.encoding;
		let order = encoding.default_order();
		let mut written = 0;
		let mut lossy = 0;

		if !self.bom_written {
			let bom = encoding.bom(order);
			if dst.len() < bom.len() {
				return Ok(Conversion { consumed: 0, produced: 0, status: ConversionStatus::OutputFull, lossy: 0 });
			}
			dst[..bom.len()].copy_from_slice(bom);
			written = bom.len();
			self.bom_written = true;
		}

		for (i, &c) in src.iter().enumerate() {
			let step = match encoding.encode_step(order, c, &mut dst[written..]) {
				EncodeStep::Unmappable if self.charset.translit => {
					let step = encoding.encode_step(order, SUBSTITUTE, &mut dst[written..]);
					if let EncodeStep::Written(_) = step {
						lossy += 1;
					}
					step
				}
				step => step,
			};
			match step {
				EncodeStep::Written(len) => written += len,
				EncodeStep::NoRoom => {
					self.note_lossy(lossy, "encode");
					return Ok(Conversion { consumed: i, produced: written, status: ConversionStatus::OutputFull, lossy });
				}
				EncodeStep::Unmappable => {
					return Err(CodecError::Unrepresentable { codepoint: c as u32, encoding: encoding.name() });
				}
			}
		}

		self.note_lossy(lossy, "encode");
		Ok(Conversion { consumed: src.len(), produced: written, status: ConversionStatus::Complete, lossy })
	}

	/// Checks that the decoded stream did not end inside a sequence.
	///
	/// # Errors
	/// Returns `CodecError::TruncatedInput` if leftover bytes remain.
	pub fn finish(&self) -> Result<(), CodecError> {
		if self.leftover > 0 {
			return Err(CodecError::TruncatedInput { leftover: self.leftover });
		}
		Ok(())
	}

	fn note_lossy(&mut self, lossy: usize, direction: &str) {
		if lossy > 0 {
			warn!("{direction} ({}): {lossy} characters converted in a non-reversible way", self.charset);
			self.lossy += lossy;
		}
	}
}

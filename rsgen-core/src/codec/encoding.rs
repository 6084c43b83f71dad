use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// Byte order of multi-byte code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
	Little,
	Big,
}

/// External text encodings understood by the codec bridge.
///
/// Names are accepted case-insensitively, with the usual iconv aliases
/// (`UTF8`, `LATIN1`, `UCS-4LE`, ...).
///
/// `Utf16` and `Utf32` carry a byte-order mark: it is detected when decoding
/// (big endian when absent) and written once when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
	Ascii,
	Latin1,
	Utf8,
	Utf16,
	Utf16Le,
	Utf16Be,
	Ucs2Le,
	Ucs2Be,
	Utf32,
	Utf32Le,
	Utf32Be,
}

/// Outcome of decoding a single character.
#[derive(Debug, PartialEq)]
pub(crate) enum DecodeStep {
	/// A complete character and the number of bytes it used
	Char(char, usize),
	/// The bytes are a valid but unfinished prefix
	Incomplete,
	/// The bytes can never form a character
	Invalid,
}

/// Outcome of encoding a single character.
#[derive(Debug, PartialEq)]
pub(crate) enum EncodeStep {
	Written(usize),
	NoRoom,
	Unmappable,
}

impl Encoding {
	/// Canonical name, as printed in logs and errors.
	pub fn name(self) -> &'static str {
		match self {
			Encoding::Ascii => "ASCII",
			Encoding::Latin1 => "ISO-8859-1",
			Encoding::Utf8 => "UTF-8",
			Encoding::Utf16 => "UTF-16",
			Encoding::Utf16Le => "UTF-16LE",
			Encoding::Utf16Be => "UTF-16BE",
			Encoding::Ucs2Le => "UCS-2LE",
			Encoding::Ucs2Be => "UCS-2BE",
			Encoding::Utf32 => "UTF-32",
			Encoding::Utf32Le => "UCS-4LE",
			Encoding::Utf32Be => "UCS-4BE",
		}
	}

	/// Worst-case number of bytes a single character expands to.
	pub fn max_char_len(self) -> usize {
		match self {
			Encoding::Ascii | Encoding::Latin1 => 1,
			Encoding::Ucs2Le | Encoding::Ucs2Be => 2,
			Encoding::Utf8
			| Encoding::Utf16
			| Encoding::Utf16Le
			| Encoding::Utf16Be
			| Encoding::Utf32
			| Encoding::Utf32Le
			| Encoding::Utf32Be => 4,
		}
	}

	/// Number of bytes written once before the first character (the BOM).
	pub fn max_prefix_len(self) -> usize {
		match self {
			Encoding::Utf16 => 2,
			Encoding::Utf32 => 4,
			_ => 0,
		}
	}

	pub(crate) fn has_bom(self) -> bool {
		self.max_prefix_len() > 0
	}

	/// Byte order used when nothing else (a BOM) decides it.
	pub(crate) fn default_order(self) -> ByteOrder {
		match self {
			Encoding::Utf16Le | Encoding::Ucs2Le | Encoding::Utf32Le => ByteOrder::Little,
			_ => ByteOrder::Big,
		}
	}

	/// The byte-order mark for `order`, empty for encodings without one.
	pub(crate) fn bom(self, order: ByteOrder) -> &'static [u8] {
		match (self, order) {
			(Encoding::Utf16, ByteOrder::Big) => &[0xFE, 0xFF],
			(Encoding::Utf16, ByteOrder::Little) => &[0xFF, 0xFE],
			(Encoding::Utf32, ByteOrder::Big) => &[0x00, 0x00, 0xFE, 0xFF],
			(Encoding::Utf32, ByteOrder::Little) => &[0xFF, 0xFE, 0x00, 0x00],
			_ => &[],
		}
	}

	/// Decodes the character at the start of `bytes` (never empty).
	pub(crate) fn decode_step(self, order: ByteOrder, bytes: &[u8]) -> DecodeStep {
		match self {
			Encoding::Ascii => match bytes[0] {
				b @ 0x00..=0x7F => DecodeStep::Char(b as char, 1),
				_ => DecodeStep::Invalid,
			},
			Encoding::Latin1 => DecodeStep::Char(bytes[0] as char, 1),
			Encoding::Utf8 => decode_utf8(bytes),
			Encoding::Utf16 | Encoding::Utf16Le | Encoding::Utf16Be => decode_utf16(order, bytes),
			Encoding::Ucs2Le | Encoding::Ucs2Be => {
				let Some(unit) = read_u16(order, bytes) else {
					return DecodeStep::Incomplete;
				};
				match char::from_u32(unit as u32) {
					Some(c) => DecodeStep::Char(c, 2),
					None => DecodeStep::Invalid,
				}
			}
			Encoding::Utf32 | Encoding::Utf32Le | Encoding::Utf32Be => {
				if bytes.len() < 4 {
					return DecodeStep::Incomplete;
				}
				let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
				let value = match order {
					ByteOrder::Little => u32::from_le_bytes(raw),
					ByteOrder::Big => u32::from_be_bytes(raw),
				};
				match char::from_u32(value) {
					Some(c) => DecodeStep::Char(c, 4),
					None => DecodeStep::Invalid,
				}
			}
		}
	}

	/// Encodes `c` at the start of `dst`.
	pub(crate) fn encode_step(self, order: ByteOrder, c: char, dst: &mut [u8]) -> EncodeStep {
		let value = c as u32;
		match self {
			Encoding::Ascii | Encoding::Latin1 => {
				let limit = if self == Encoding::Ascii { 0x80 } else { 0x100 };
				if value >= limit {
					return EncodeStep::Unmappable;
				}
				match dst.first_mut() {
					Some(slot) => {
						*slot = value as u8;
						EncodeStep::Written(1)
					}
					None => EncodeStep::NoRoom,
				}
			}
			Encoding::Utf8 => {
				let len = c.len_utf8();
				if dst.len() < len {
					return EncodeStep::NoRoom;
				}
				c.encode_utf8(&mut dst[..len]);
				EncodeStep::Written(len)
			}
			Encoding::Utf16 | Encoding::Utf16Le | Encoding::Utf16Be => {
				let mut buffer = [0u16; 2];
				let units = c.encode_utf16(&mut buffer);
				if dst.len() < units.len() * 2 {
					return EncodeStep::NoRoom;
				}
				for (i, unit) in units.iter().enumerate() {
					dst[i * 2..i * 2 + 2].copy_from_slice(&u16_bytes(order, *unit));
				}
				EncodeStep::Written(units.len() * 2)
			}
			Encoding::Ucs2Le | Encoding::Ucs2Be => {
				if value > 0xFFFF {
					return EncodeStep::Unmappable;
				}
				if dst.len() < 2 {
					return EncodeStep::NoRoom;
				}
				dst[..2].copy_from_slice(&u16_bytes(order, value as u16));
				EncodeStep::Written(2)
			}
			Encoding::Utf32 | Encoding::Utf32Le | Encoding::Utf32Be => {
				if dst.len() < 4 {
					return EncodeStep::NoRoom;
				}
				let raw = match order {
					ByteOrder::Little => value.to_le_bytes(),
					ByteOrder::Big => value.to_be_bytes(),
				};
				dst[..4].copy_from_slice(&raw);
				EncodeStep::Written(4)
			}
		}
	}
}

impl FromStr for Encoding {
	type Err = CodecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let encoding = match s.to_ascii_uppercase().as_str() {
			"ASCII" | "US-ASCII" | "ANSI_X3.4-1968" => Encoding::Ascii,
			"ISO-8859-1" | "ISO8859-1" | "LATIN1" | "L1" => Encoding::Latin1,
			"UTF-8" | "UTF8" => Encoding::Utf8,
			"UTF-16" | "UTF16" => Encoding::Utf16,
			"UTF-16LE" | "UTF16LE" => Encoding::Utf16Le,
			"UTF-16BE" | "UTF16BE" => Encoding::Utf16Be,
			"UCS-2LE" | "UCS2LE" => Encoding::Ucs2Le,
			"UCS-2BE" | "UCS2BE" | "UCS-2" | "UCS2" => Encoding::Ucs2Be,
			"UTF-32" | "UTF32" => Encoding::Utf32,
			"UTF-32LE" | "UTF32LE" | "UCS-4LE" | "UCS4LE" => Encoding::Utf32Le,
			"UTF-32BE" | "UTF32BE" | "UCS-4BE" | "UCS4BE" | "UCS-4" | "UCS4" => Encoding::Utf32Be,
			_ => return Err(CodecError::UnknownEncoding(s.to_owned())),
		};
		Ok(encoding)
	}
}

impl fmt::Display for Encoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

fn read_u16(order: ByteOrder, bytes: &[u8]) -> Option<u16> {
	if bytes.len() < 2 {
		return None;
	}
	let raw = [bytes[0], bytes[1]];
	Some(match order {
		ByteOrder::Little => u16::from_le_bytes(raw),
		ByteOrder::Big => u16::from_be_bytes(raw),
	})
}

fn u16_bytes(order: ByteOrder, unit: u16) -> [u8; 2] {
	match order {
		ByteOrder::Little => unit.to_le_bytes(),
		ByteOrder::Big => unit.to_be_bytes(),
	}
}

/// Strict UTF-8: no overlong forms, no surrogates, nothing above U+10FFFF.
fn decode_utf8(bytes: &[u8]) -> DecodeStep {
	let lead = bytes[0];
	let (len, second) = match lead {
		0x00..=0x7F => return DecodeStep::Char(lead as char, 1),
		0xC2..=0xDF => (2, 0x80..=0xBF),
		0xE0 => (3, 0xA0..=0xBF),
		0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80..=0xBF),
		0xED => (3, 0x80..=0x9F),
		0xF0 => (4, 0x90..=0xBF),
		0xF1..=0xF3 => (4, 0x80..=0xBF),
		0xF4 => (4, 0x80..=0x8F),
		_ => return DecodeStep::Invalid,
	};

	for i in 1..len {
		let Some(&b) = bytes.get(i) else {
			return DecodeStep::Incomplete;
		};
		let valid = if i == 1 { second.contains(&b) } else { (0x80..=0xBF).contains(&b) };
		if !valid {
			return DecodeStep::Invalid;
		}
	}

	let mut value = (lead & (0x7F >> len)) as u32;
	for &b in &bytes[1..len] {
		value = (value << 6) | (b & 0x3F) as u32;
	}
	match char::from_u32(value) {
		Some(c) => DecodeStep::Char(c, len),
		None => DecodeStep::Invalid,
	}
}

fn decode_utf16(order: ByteOrder, bytes: &[u8]) -> DecodeStep {
	let Some(high) = read_u16(order, bytes) else {
		return DecodeStep::Incomplete;
	};
	match high {
		0xD800..=0xDBFF => {
			let Some(low) = read_u16(order, &bytes[2..]) else {
				return DecodeStep::Incomplete;
			};
			if !(0xDC00..=0xDFFF).contains(&low) {
				return DecodeStep::Invalid;
			}
			let value = 0x10000 + (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
			match char::from_u32(value) {
				Some(c) => DecodeStep::Char(c, 4),
				None => DecodeStep::Invalid,
			}
		}
		0xDC00..=0xDFFF => DecodeStep::Invalid,
		_ => match char::from_u32(high as u32) {
			Some(c) => DecodeStep::Char(c, 2),
			None => DecodeStep::Invalid,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_iconv_aliases() {
		assert_eq!("utf8".parse::<Encoding>(), Ok(Encoding::Utf8));
		assert_eq!("LATIN1".parse::<Encoding>(), Ok(Encoding::Latin1));
		assert_eq!("ucs-4le".parse::<Encoding>(), Ok(Encoding::Utf32Le));
		assert_eq!("ANSI_X3.4-1968".parse::<Encoding>(), Ok(Encoding::Ascii));
		assert_eq!(
			"EBCDIC".parse::<Encoding>(),
			Err(CodecError::UnknownEncoding("EBCDIC".to_owned()))
		);
	}

	#[test]
	fn utf8_reports_unfinished_prefixes() {
		// U+20AC EURO SIGN is E2 82 AC
		assert_eq!(decode_utf8(&[0xE2]), DecodeStep::Incomplete);
		assert_eq!(decode_utf8(&[0xE2, 0x82]), DecodeStep::Incomplete);
		assert_eq!(decode_utf8(&[0xE2, 0x82, 0xAC]), DecodeStep::Char('€', 3));
	}

	#[test]
	fn utf8_rejects_overlong_and_surrogates() {
		assert_eq!(decode_utf8(&[0xC0, 0x80]), DecodeStep::Invalid);
		assert_eq!(decode_utf8(&[0xE0, 0x80, 0x80]), DecodeStep::Invalid);
		assert_eq!(decode_utf8(&[0xED, 0xA0, 0x80]), DecodeStep::Invalid);
		assert_eq!(decode_utf8(&[0xF4, 0x90, 0x80, 0x80]), DecodeStep::Invalid);
		assert_eq!(decode_utf8(&[0x80]), DecodeStep::Invalid);
	}

	#[test]
	fn utf16_joins_surrogate_pairs() {
		// U+1F600 is D83D DE00
		let bytes = [0x3D, 0xD8, 0x00, 0xDE];
		assert_eq!(decode_utf16(ByteOrder::Little, &bytes), DecodeStep::Char('\u{1F600}', 4));
		assert_eq!(decode_utf16(ByteOrder::Little, &bytes[..3]), DecodeStep::Incomplete);
		assert_eq!(decode_utf16(ByteOrder::Little, &[0x00, 0xDE]), DecodeStep::Invalid);
	}

	#[test]
	fn ucs2_refuses_astral_characters() {
		let mut dst = [0u8; 4];
		assert_eq!(
			Encoding::Ucs2Le.encode_step(ByteOrder::Little, '\u{1F600}', &mut dst),
			EncodeStep::Unmappable
		);
		assert_eq!(
			Encoding::Ucs2Le.encode_step(ByteOrder::Little, 'é', &mut dst),
			EncodeStep::Written(2)
		);
		assert_eq!(&dst[..2], &[0xE9, 0x00]);
	}

	#[test]
	fn encode_reports_missing_room() {
		let mut dst = [0u8; 2];
		assert_eq!(Encoding::Utf8.encode_step(ByteOrder::Big, '€', &mut dst), EncodeStep::NoRoom);
		assert_eq!(Encoding::Utf32Be.encode_step(ByteOrder::Big, 'a', &mut dst), EncodeStep::NoRoom);
		assert_eq!(Encoding::Ascii.encode_step(ByteOrder::Big, 'a', &mut []), EncodeStep::NoRoom);
	}
}

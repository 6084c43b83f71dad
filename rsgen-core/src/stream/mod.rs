//! Block-wise streaming between byte streams and the internal representation.
//!
//! - `reader`: bytes -> codepoints, feeding the frequency accumulator
//! - `writer`: sampled codepoints -> bytes, feeding the output file

/// Decoding side: read, decode and tally block by block.
pub mod reader;

/// Encoding side: sample, encode and write block by block.
pub mod writer;

/// Number of codepoints (or bytes, when reading) handled per block: 8 Mi.
pub const BLOCK_SIZE: usize = 8 * 1024 * 1024;

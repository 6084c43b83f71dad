use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::InternalWidth;
use crate::error::{ConfigError, Error, Result};

/// Number of times each codepoint was observed.
///
/// An `OccurrenceTable` is the frequency accumulator of the pipeline: the
/// streaming reader feeds it decoded blocks, and the cumulative distribution
/// is then built from it.
///
/// ## Responsibilities:
/// - Accumulate codepoint occurrences block by block
/// - Degenerate to a uniform table for alphabet and range modes
/// - Persist to / restore from a compact binary file
///
/// ## Invariants
/// - Keys are unique and iterate in codepoint order
/// - Every stored count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OccurrenceTable {
	/// Example: { 'a' => 42, 'e' => 3 }
	counts: BTreeMap<char, u64>,
}

impl OccurrenceTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the uniform table of a synthetic range.
	///
	/// The range holds `size` consecutive Unicode scalar values starting at
	/// `start`; the surrogate block is skipped since it holds no scalar value.
	///
	/// # Errors
	/// - `ConfigError::EmptyRange` if `size` is zero
	/// - `ConfigError::InvalidRangeStart` if `start` is not a scalar value
	/// - `ConfigError::RangeTooLarge` if the range leaves the internal width
	pub fn from_range(start: u32, size: u32, width: InternalWidth) -> std::result::Result<Self, ConfigError> {
		if size == 0 {
			return Err(ConfigError::EmptyRange);
		}
		let first = char::from_u32(start).ok_or(ConfigError::InvalidRangeStart(start))?;
		let too_large = ConfigError::RangeTooLarge { start, size, width: width.encoding().name() };

		let mut table = Self::new();
		let mut next = Some(first);
		for _ in 0..size {
			let c = match next {
				Some(c) if width.contains(c) => c,
				_ => return Err(too_large),
			};
			table.counts.insert(c, 1);
			// `char` ranges step over the surrogate block
			next = (c..=char::MAX).nth(1);
		}
		Ok(table)
	}

	/// Records one occurrence of every codepoint in `block`.
	pub fn accumulate(&mut self, block: &[char]) {
		for &c in block {
			*self.counts.entry(c).or_insert(0) += 1;
		}
	}

	/// Clamps every count to one, turning the table into a uniform
	/// distribution over the distinct codepoints seen.
	pub fn uniform(mut self) -> Self {
		for count in self.counts.values_mut() {
			*count = 1;
		}
		self
	}

	/// Occurrence count of `c`.
	pub fn count(&self, c: char) -> u64 {
		self.counts.get(&c).copied().unwrap_or(0)
	}

	/// Number of distinct codepoints.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Sum of all occurrence counts.
	pub fn total(&self) -> u64 {
		self.counts.values().sum()
	}

	/// Iterates `(codepoint, count)` in codepoint order.
	pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
		self.counts.iter().map(|(c, count)| (*c, *count))
	}

	/// Loads a table saved with `save`.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or is not a valid table.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let bytes = std::fs::read(path).map_err(|e| Error::file(path, e))?;
		let table: Self = postcard::from_bytes(&bytes)?;
		Ok(table)
	}

	/// Saves the table in postcard's compact binary format.
	///
	/// # Errors
	/// Returns an error if serialization or the write fails.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes).map_err(|e| Error::file(path, e))?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accumulate_counts_every_occurrence() {
		let mut table = OccurrenceTable::new();
		table.accumulate(&['b', 'a', 'b']);
		table.accumulate(&['b']);
		assert_eq!(table.count('a'), 1);
		assert_eq!(table.count('b'), 3);
		assert_eq!(table.count('c'), 0);
		assert_eq!(table.total(), 4);
		assert_eq!(table.iter().collect::<Vec<_>>(), vec![('a', 1), ('b', 3)]);
	}

	#[test]
	fn uniform_counts_duplicates_once() {
		let mut table = OccurrenceTable::new();
		table.accumulate(&"abca".chars().collect::<Vec<_>>());
		let table = table.uniform();
		assert_eq!(table.len(), 3);
		assert_eq!(table.total(), 3);
	}

	#[test]
	fn range_has_one_of_each() {
		let table = OccurrenceTable::from_range(0, 5, InternalWidth::Wide32).unwrap();
		assert_eq!(table.len(), 5);
		assert!(table.iter().all(|(_, count)| count == 1));
		assert_eq!(table.iter().map(|(c, _)| c).collect::<String>(), "\0\u{1}\u{2}\u{3}\u{4}");
	}

	#[test]
	fn range_skips_surrogates() {
		let table = OccurrenceTable::from_range(0xD7FF, 2, InternalWidth::Wide32).unwrap();
		assert_eq!(table.iter().map(|(c, _)| c as u32).collect::<Vec<_>>(), vec![0xD7FF, 0xE000]);
	}

	#[test]
	fn range_must_fit_internal_width() {
		assert!(OccurrenceTable::from_range(0, 128, InternalWidth::Narrow).is_ok());
		assert_eq!(
			OccurrenceTable::from_range(0, 129, InternalWidth::Narrow),
			Err(ConfigError::RangeTooLarge { start: 0, size: 129, width: "ASCII" })
		);
		assert_eq!(OccurrenceTable::from_range(0, 0, InternalWidth::Narrow), Err(ConfigError::EmptyRange));
		assert_eq!(
			OccurrenceTable::from_range(0xD800, 1, InternalWidth::Wide32),
			Err(ConfigError::InvalidRangeStart(0xD800))
		);
	}

	#[test]
	fn save_and_load_preserve_counts() {
		let path = std::env::temp_dir().join(format!("rsgen_table_{}.bin", std::process::id()));
		let mut table = OccurrenceTable::new();
		table.accumulate(&['x', 'y', 'y', 'ž']);
		table.save(&path).unwrap();
		let loaded = OccurrenceTable::load(&path).unwrap();
		std::fs::remove_file(&path).ok();
		assert_eq!(loaded, table);
	}
}

use super::occurrences::OccurrenceTable;
use crate::error::SamplerError;

/// Cumulative distribution over codepoints, used as an inverse-CDF index.
///
/// Each entry maps a running sum of occurrence counts (taken in codepoint
/// order) to the codepoint whose count brought the sum there. Looking up the
/// first key `>= value` for `value` in `1..=total` selects a codepoint with
/// probability proportional to its count.
///
/// # Invariants
/// - Keys are strictly increasing and positive
/// - The last key equals `total`, the number of codepoints counted
#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeDistribution {
	entries: Vec<(u64, char)>,
}

impl CumulativeDistribution {
	/// Builds the distribution from an occurrence table.
	///
	/// Entries with a zero count (only possible in a hand-crafted saved
	/// table) are skipped so that keys stay strictly increasing.
	///
	/// # Errors
	/// - `SamplerError::EmptyDistribution` if the table holds no occurrence
	/// - `SamplerError::WeightOverflow` if the counts do not sum in a `u64`
	pub fn build(table: &OccurrenceTable) -> Result<Self, SamplerError> {
		let mut entries = Vec::with_capacity(table.len());
		let mut running = 0u64;
		for (c, count) in table.iter().filter(|(_, count)| *count > 0) {
			running = running.checked_add(count).ok_or(SamplerError::WeightOverflow)?;
			entries.push((running, c));
		}

		if entries.is_empty() {
			return Err(SamplerError::EmptyDistribution);
		}
		Ok(Self { entries })
	}

	/// Total weight, i.e. the largest key.
	pub fn total(&self) -> u64 {
		// Never empty, see `build`
		self.entries.last().map_or(0, |(key, _)| *key)
	}

	/// Number of distinct codepoints.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Cumulative keys, in increasing order.
	pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
		self.entries.iter().map(|(key, _)| *key)
	}

	/// Codepoint of the first entry whose key is `>= value`.
	///
	/// Returns `None` when `value` is above `total`.
	pub fn lower_bound(&self, value: u64) -> Option<char> {
		let index = self.entries.partition_point(|(key, _)| *key < value);
		self.entries.get(index).map(|(_, c)| *c)
	}
}

use super::distribution::CumulativeDistribution;
use crate::draw::DrawSource;
use crate::error::{Result, SamplerError};

/// Inverse-transform sampler over a cumulative distribution.
///
/// Each call draws one uniform `u32`, scales it onto `1..=total` and looks
/// up the first cumulative key at or above the scaled value. The lookup is
/// logarithmic in the number of distinct codepoints.
///
/// The scaling is `floor(r * (total - 1) / u32::MAX + 1.5)`: adding one keeps
/// index zero out of reach, and the extra half rounds instead of truncating.
/// With `total == 1` the factor is zero and every draw maps to key 1.
#[derive(Debug)]
pub struct Sampler {
	distribution: CumulativeDistribution,
	source: DrawSource,
	scale_factor: f64,
}

impl Sampler {
	/// Takes ownership of the distribution and of the draw source.
	pub fn new(distribution: CumulativeDistribution, source: DrawSource) -> Self {
		let scale_factor = (distribution.total() - 1) as f64 / u32::MAX as f64;
		Self { distribution, source, scale_factor }
	}

	pub fn distribution(&self) -> &CumulativeDistribution {
		&self.distribution
	}

	/// Maps a raw draw onto `1..=total`.
	pub fn scale(&self, draw: u32) -> u64 {
		(draw as f64 * self.scale_factor + 1.5) as u64
	}

	/// Draws one codepoint.
	///
	/// # Errors
	/// - Any error of the draw source
	/// - `SamplerError::PastEnd` if the scaled value exceeds the last key,
	///   which means the scaling invariant is broken
	pub fn sample(&mut self) -> Result<char> {
		let draw = self.source.next_u32()?;
		let scaled = self.scale(draw);
		let c = self.distribution.lower_bound(scaled).ok_or(SamplerError::PastEnd {
			scaled,
			total: self.distribution.total(),
		})?;
		Ok(c)
	}

	/// Fills `block` with freshly sampled codepoints.
	pub fn fill(&mut self, block: &mut [char]) -> Result<()> {
		for slot in block.iter_mut() {
			*slot = self.sample()?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::occurrences::OccurrenceTable;

	fn sampler(text: &str, seed: u64) -> Sampler {
		let mut table = OccurrenceTable::new();
		table.accumulate(&text.chars().collect::<Vec<_>>());
		let distribution = CumulativeDistribution::build(&table).unwrap();
		Sampler::new(distribution, DrawSource::seeded(seed))
	}

	#[test]
	fn scale_stays_within_keys() {
		let sampler = sampler("abbb", 1);
		assert_eq!(sampler.scale(0), 1);
		assert_eq!(sampler.scale(u32::MAX), 4);
		assert_eq!(sampler.scale(u32::MAX / 2), 2);
		assert_eq!(sampler.scale(u32::MAX / 2 + 1), 3);
	}

	#[test]
	fn single_codepoint_always_wins() {
		let mut sampler = sampler("zzz", 3);
		assert_eq!(sampler.distribution().total(), 3);

		let mut single = sampler_with_total_one();
		assert_eq!(single.scale(u32::MAX), 1);
		for _ in 0..1000 {
			assert_eq!(single.sample().unwrap(), 'q');
			assert_eq!(sampler.sample().unwrap(), 'z');
		}
	}

	fn sampler_with_total_one() -> Sampler {
		sampler("q", 11)
	}

	fn count_a(sampler: &mut Sampler, draws: u32) -> u32 {
		(0..draws).filter(|_| sampler.sample().unwrap() == 'a').count() as u32
	}

	#[test]
	fn frequencies_follow_the_table() {
		// a:1000, b:3000
		let text = format!("{}{}", "a".repeat(1000), "b".repeat(3000));
		let mut sampler = sampler(&text, 42);
		let draws = 100_000;
		let a = count_a(&mut sampler, draws);
		let ratio = (draws - a) as f64 / a as f64;
		assert!((2.85..=3.15).contains(&ratio), "b/a ratio {ratio}");
	}

	#[test]
	fn small_tables_keep_the_rounding_bias() {
		// a:1, b:3 has keys {1, 4}; `a` wins when the scaled draw is below 1.5,
		// a sixth of the draws
		let mut sampler = sampler("abbb", 42);
		let a = count_a(&mut sampler, 100_000);
		assert!((15_500..=17_800).contains(&a), "a drawn {a} times");
	}

	#[test]
	fn fill_samples_whole_block() {
		let mut sampler = sampler("xy", 5);
		let mut block = ['\0'; 64];
		sampler.fill(&mut block).unwrap();
		assert!(block.iter().all(|c| *c == 'x' || *c == 'y'));
	}
}

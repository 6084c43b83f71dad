use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::DrawSourceError;

/// Default OS entropy device.
pub const ENTROPY_DEVICE: &str = "/dev/urandom";

/// Pseudorandom backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
	/// Seeded deterministic engine
	#[default]
	Seeded,
	/// Process-wide general-purpose generator, seeded from the clock
	Global,
	/// OS entropy device
	Urandom,
}

impl FromStr for Backend {
	type Err = DrawSourceError;

	/// Accepts the numeric selectors `1`, `2`, `3` or a backend name.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"1" | "seeded" | "mt" => Ok(Backend::Seeded),
			"2" | "global" | "libc" => Ok(Backend::Global),
			"3" | "urandom" | "os" => Ok(Backend::Urandom),
			_ => Err(DrawSourceError::UnknownBackend(s.to_owned())),
		}
	}
}

impl fmt::Display for Backend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Backend::Seeded => "seeded",
			Backend::Global => "global",
			Backend::Urandom => "urandom",
		})
	}
}

enum Engine {
	Seeded(ChaCha8Rng),
	Global(StdRng),
	Device { file: File, path: PathBuf },
}

/// Source of uniformly distributed `u32` values.
///
/// One handle is built per run and handed to the sampler; it is neither
/// `Clone` nor `Copy`, so a run draws from exactly one stream.
///
/// The entropy device, when used, is closed when the handle is dropped.
/// `std::fs::File` discards the result of that close, so a failed release
/// cannot be reported; dropping only logs the release at debug level.
pub struct DrawSource {
	engine: Engine,
}

impl DrawSource {
	/// Builds the selected backend.
	///
	/// `seed` only applies to `Backend::Seeded`; when absent, the engine is
	/// seeded from wall-clock time. `Backend::Global` is always seeded from
	/// wall-clock time.
	///
	/// # Errors
	/// Returns `DrawSourceError::Open` if the entropy device cannot be opened.
	pub fn new(backend: Backend, seed: Option<u64>) -> Result<Self, DrawSourceError> {
		match backend {
			Backend::Seeded => Ok(Self::seeded(seed.unwrap_or_else(wall_clock_seed))),
			Backend::Global => Ok(Self::global(wall_clock_seed())),
			Backend::Urandom => Self::from_device(ENTROPY_DEVICE),
		}
	}

	/// Deterministic source, reproducible for a given seed.
	pub fn seeded(seed: u64) -> Self {
		debug!("seeding draw source with {seed}");
		Self { engine: Engine::Seeded(ChaCha8Rng::seed_from_u64(seed)) }
	}

	/// General-purpose engine, distinct from the seeded one.
	fn global(seed: u64) -> Self {
		debug!("seeding global generator with {seed}");
		Self { engine: Engine::Global(StdRng::seed_from_u64(seed)) }
	}

	/// Reads raw bytes from an entropy device (or any readable file).
	///
	/// # Errors
	/// Returns `DrawSourceError::Open` if the file cannot be opened.
	pub fn from_device<P: AsRef<Path>>(path: P) -> Result<Self, DrawSourceError> {
		let path = path.as_ref().to_path_buf();
		let file = File::open(&path).map_err(|source| DrawSourceError::Open { path: path.clone(), source })?;
		debug!("drawing from {}", path.display());
		Ok(Self { engine: Engine::Device { file, path } })
	}

	/// Which backend this source uses.
	pub fn backend(&self) -> Backend {
		match self.engine {
			Engine::Seeded(_) => Backend::Seeded,
			Engine::Global(_) => Backend::Global,
			Engine::Device { .. } => Backend::Urandom,
		}
	}

	/// Next uniformly distributed value in `0..=u32::MAX`.
	///
	/// # Errors
	/// Only the device backend fails: on a read error, on end of file, or on
	/// a short read. Short reads are never retried.
	pub fn next_u32(&mut self) -> Result<u32, DrawSourceError> {
		match &mut self.engine {
			Engine::Seeded(rng) => Ok(rng.random()),
			Engine::Global(rng) => Ok(rng.random()),
			Engine::Device { file, .. } => {
				let mut raw = [0u8; 4];
				let read = file.read(&mut raw).map_err(DrawSourceError::Read)?;
				match read {
					0 => Err(DrawSourceError::EndOfFile),
					4 => Ok(u32::from_ne_bytes(raw)),
					actual => Err(DrawSourceError::ShortRead { expected: 4, actual }),
				}
			}
		}
	}
}

impl fmt::Debug for DrawSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.engine {
			Engine::Device { path, .. } => write!(f, "DrawSource({})", path.display()),
			_ => write!(f, "DrawSource({})", self.backend()),
		}
	}
}

impl Drop for DrawSource {
	fn drop(&mut self) {
		if let Engine::Device { path, .. } = &self.engine {
			debug!("releasing {}", path.display());
		}
	}
}

/// Seconds since the Unix epoch.
fn wall_clock_seed() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn device_with(bytes: &[u8], label: &str) -> PathBuf {
		let path = std::env::temp_dir().join(format!("rsgen_device_{label}_{}", std::process::id()));
		std::fs::write(&path, bytes).unwrap();
		path
	}

	#[test]
	fn selectors() {
		assert_eq!("1".parse::<Backend>().unwrap(), Backend::Seeded);
		assert_eq!("libc".parse::<Backend>().unwrap(), Backend::Global);
		assert_eq!("3".parse::<Backend>().unwrap(), Backend::Urandom);
		assert!(matches!("4".parse::<Backend>(), Err(DrawSourceError::UnknownBackend(s)) if s == "4"));
	}

	#[test]
	fn same_seed_same_stream() {
		let mut a = DrawSource::seeded(7);
		let mut b = DrawSource::seeded(7);
		for _ in 0..100 {
			assert_eq!(a.next_u32().unwrap(), b.next_u32().unwrap());
		}
	}

	#[test]
	fn device_reads_native_words() {
		let path = device_with(&[1, 0, 0, 0, 2, 0, 0, 0], "words");
		let mut source = DrawSource::from_device(&path).unwrap();
		let first = source.next_u32().unwrap();
		let second = source.next_u32().unwrap();
		assert_eq!(first, u32::from_ne_bytes([1, 0, 0, 0]));
		assert_eq!(second, u32::from_ne_bytes([2, 0, 0, 0]));
		assert!(matches!(source.next_u32(), Err(DrawSourceError::EndOfFile)));
		drop(source);
		std::fs::remove_file(path).ok();
	}

	#[test]
	fn device_short_read_is_an_error() {
		let path = device_with(&[0xAA, 0xBB], "short");
		let mut source = DrawSource::from_device(&path).unwrap();
		assert!(matches!(
			source.next_u32(),
			Err(DrawSourceError::ShortRead { expected: 4, actual: 2 })
		));
		drop(source);
		std::fs::remove_file(path).ok();
	}

	#[test]
	fn missing_device_fails_to_open() {
		let result = DrawSource::from_device("/nonexistent/rsgen/entropy");
		assert!(matches!(result, Err(DrawSourceError::Open { .. })));
	}

	#[test]
	fn global_backend_draws() {
		let mut source = DrawSource::new(Backend::Global, None).unwrap();
		assert_eq!(source.backend(), Backend::Global);
		source.next_u32().unwrap();
	}

	#[test]
	fn global_backend_is_clock_seeded() {
		// Same second, same stream; the seeded engine gives another one
		let seed = wall_clock_seed();
		assert!(seed > 0);
		let mut a = DrawSource::global(seed);
		let mut b = DrawSource::global(seed);
		let mut seeded = DrawSource::seeded(seed);
		let first: Vec<u32> = (0..8).map(|_| a.next_u32().unwrap()).collect();
		let second: Vec<u32> = (0..8).map(|_| b.next_u32().unwrap()).collect();
		let other: Vec<u32> = (0..8).map(|_| seeded.next_u32().unwrap()).collect();
		assert_eq!(first, second);
		assert_ne!(first, other);
	}
}

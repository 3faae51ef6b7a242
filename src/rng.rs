//! Random streams
//!
//! Every source of randomness owns its generator: the peak table, the composition
//! of each spectrum and the noise of each spectrum are drawn from separate streams
//! derived from the dataset seed and the spectrum index.
//! Reseeding one stream never shifts the draws of another one and spectra can be
//! generated in any order, or concurrently, with the same result.

use rand::{rngs::StdRng, SeedableRng};

/// Logical random streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    PeakTable,
    Composition,
    Synthesis,
}
impl Stream {
    fn salt(&self) -> u64 {
        match self {
            Stream::PeakTable => 0,
            Stream::Composition => 0x9e37_79b9_7f4a_7c15,
            Stream::Synthesis => 0xbf58_476d_1ce4_e5b9,
        }
    }
}

/// Returns the generator of `stream` for spectrum `index`
///
/// The generator is seeded with `(seed + index) ^ salt`, the peak table stream salt
/// being 0 so it is seeded with `seed` itself.
/// Without a seed, the generator is seeded from the OS entropy.
pub fn stream(seed: Option<u64>, stream: Stream, index: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index) ^ stream.salt()),
        None => StdRng::from_entropy(),
    }
}

/// Returns a generator seeded with `seed`, or from the OS entropy
pub fn seeded(seed: Option<u64>) -> StdRng {
    stream(seed, Stream::PeakTable, 0)
}

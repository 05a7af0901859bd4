//! Random sources for the mechanisms.
//!
//! Mechanisms never touch a global generator: the caller owns a
//! `RandomSource` and passes it by `&mut` into every call. Use
//! `SeededGenerator` for reproducible runs and `GeneratorOpenSSL` when
//! draws should come straight from the OpenSSL CSPRNG.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::Result;

/// 2^-53, the spacing of the uniform grid produced by `RandomSource::uniform`.
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// A source of uniformly distributed bits.
pub trait RandomSource {
    /// Return 64 uniformly random bits.
    fn next_u64(&mut self) -> Result<u64>;

    /// Return a uniform sample from `[0, 1)` with 53 bits of precision.
    /// Same conversion as rand's `Standard` distribution for `f64`: the top
    /// 53 bits of one `u64`, scaled by 2^-53.
    fn uniform(&mut self) -> Result<f64> {
        Ok((self.next_u64()? >> 11) as f64 * UNIT_SCALE)
    }
}

/// Draws randomness from OpenSSL's `RAND_bytes`. Not seedable.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOpenSSL {}

impl RandomSource for GeneratorOpenSSL {
    fn next_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        openssl::rand::rand_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

/// A ChaCha20 generator with a recorded seed, for reproducible runs.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    seed: u64,
    rng: ChaCha20Rng,
}

impl SeededGenerator {
    /// Create a generator from a fixed seed. Two generators with the same
    /// seed produce identical streams.
    /// ## Example
    /// ```
    /// use dpmech::{RandomSource, SeededGenerator};
    /// let mut a = SeededGenerator::from_seed(7);
    /// let mut b = SeededGenerator::from_seed(7);
    /// assert_eq!(a.next_u64().unwrap(), b.next_u64().unwrap());
    /// ```
    pub fn from_seed(seed: u64) -> SeededGenerator {
        SeededGenerator {
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Create a generator seeded from OpenSSL. The seed is kept so the run
    /// can be replayed with `from_seed`.
    /// ## Errors
    /// Returns `RandomnessUnavailable` if OpenSSL cannot produce entropy.
    pub fn from_entropy() -> Result<SeededGenerator> {
        let seed = GeneratorOpenSSL {}.next_u64()?;
        tracing::debug!(seed, "seeded generator from OpenSSL entropy");
        Ok(SeededGenerator::from_seed(seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededGenerator {
    fn next_u64(&mut self) -> Result<u64> {
        Ok(self.rng.next_u64())
    }
}

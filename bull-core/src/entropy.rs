//! Entropy pool
//!
//! A SHA-256 state that is never finalized. Everything fed in (ADC noise,
//! device-unique stored bytes, timer jitter observed per frame) keeps
//! accumulating for the whole uptime. Randomness is taken by finalizing a
//! copy of the state; the resulting digest is then fed back so the next
//! read differs even if nothing new arrived in between.
//!
//! The pool must not be used from two contexts at once. Within a unit it
//! is owned by the engine and only touched from the frame loop.

use core::fmt;

use bull_hal::{ByteStore, NoiseSource};
use rand_core::{impls, RngCore};
use sha2::Digest as _;
use sha2::Sha256;

use crate::config::UnitConfig;

/// Length of one pool digest
pub const DIGEST_LEN: usize = 32;

/// One pool digest
pub type Digest = [u8; DIGEST_LEN];

/// Hash-based entropy accumulator
#[derive(Clone)]
pub struct EntropyPool {
    state: Sha256,
}

impl fmt::Debug for EntropyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropyPool").finish_non_exhaustive()
    }
}

impl Default for EntropyPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropyPool {
    /// Create an empty pool
    ///
    /// An empty pool is deterministic; real units seed it first.
    pub fn new() -> Self {
        Self {
            state: Sha256::new(),
        }
    }

    /// Create a pool seeded from analog noise and stored bytes
    ///
    /// Stored bytes include the unit address and name, so units running
    /// identical firmware still start from different states.
    pub fn seeded<N, S>(noise: &mut N, store: &mut S, config: &UnitConfig) -> Self
    where
        N: NoiseSource + ?Sized,
        S: ByteStore + ?Sized,
    {
        let mut pool = Self::new();
        pool.feed_noise(noise, config.noise_samples);

        for offset in 0..config.seed_bytes {
            match store.read_byte(offset) {
                Ok(byte) => pool.feed(&[byte]),
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Seed read stopped at offset {}: {:?}", offset, _e);
                    break;
                }
            }
        }

        pool
    }

    /// Fold bytes into the pool
    pub fn feed(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    /// Fold `count` ADC samples into the pool
    ///
    /// Only the low bit of each sample is really noise; the rest is fed
    /// along anyway.
    pub fn feed_noise<N: NoiseSource + ?Sized>(&mut self, noise: &mut N, count: u8) {
        for _ in 0..count {
            self.feed(&noise.sample().to_le_bytes());
        }
    }

    /// Produce a fresh digest
    ///
    /// Finalizes a copy of the running state, then feeds the digest back
    /// into the live state.
    pub fn read_digest(&mut self) -> Digest {
        let digest: Digest = self.state.clone().finalize().into();
        self.feed(&digest);
        digest
    }

    /// Uniform integer in `[0, max]`
    ///
    /// Masks digest bytes down to the smallest power-of-two range covering
    /// `max` and rejects values above it, drawing new digests as needed.
    /// At least half of all candidates are accepted.
    pub fn bounded_integer(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }

        let mask = u8::MAX >> max.leading_zeros();
        loop {
            let digest = self.read_digest();
            if let Some(value) = digest.iter().map(|&b| b & mask).find(|&v| v <= max) {
                return value;
            }
        }
    }
}

impl RngCore for EntropyPool {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(DIGEST_LEN) {
            let digest = self.read_digest();
            chunk.copy_from_slice(&digest[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNoise, MockStore};

    fn pool_with(seed: &[u8]) -> EntropyPool {
        let mut pool = EntropyPool::new();
        pool.feed(seed);
        pool
    }

    #[test]
    fn test_digests_never_repeat() {
        let mut pool = pool_with(b"unit");
        let first = pool.read_digest();
        let second = pool.read_digest();
        assert_ne!(first, second);
    }

    #[test]
    fn test_read_is_deterministic_for_same_history() {
        let mut a = pool_with(b"same");
        let mut b = pool_with(b"same");
        assert_eq!(a.read_digest(), b.read_digest());

        a.feed(&[0x01]);
        assert_ne!(a.read_digest(), b.read_digest());
    }

    #[test]
    fn test_read_digest_feeds_back() {
        let mut pool = pool_with(b"x");
        let digest = pool.read_digest();

        let mut expected = pool_with(b"x");
        expected.feed(&digest);
        assert_eq!(pool.read_digest(), expected.read_digest());
    }

    #[test]
    fn test_seeded_pools_differ_per_device() {
        let config = UnitConfig::default();
        let mut store_a = MockStore::new();
        let mut store_b = MockStore::new();
        store_b.cells[1] = b'B';

        let mut a = EntropyPool::seeded(&mut MockNoise::new(7), &mut store_a, &config);
        let mut b = EntropyPool::seeded(&mut MockNoise::new(7), &mut store_b, &config);
        assert_ne!(a.read_digest(), b.read_digest());
    }

    #[test]
    fn test_seeding_consumes_noise_samples() {
        let config = UnitConfig::default();
        let mut noise = MockNoise::new(0);
        EntropyPool::seeded(&mut noise, &mut MockStore::new(), &config);
        assert_eq!(noise.samples_taken, config.noise_samples as usize);
    }

    #[test]
    fn test_bounded_zero_short_circuits() {
        let mut pool = pool_with(b"zero");
        let before = pool.clone().read_digest();
        assert_eq!(pool.bounded_integer(0), 0);
        // No digest was consumed
        assert_eq!(pool.read_digest(), before);
    }

    #[test]
    fn test_bounded_uniformity() {
        const SAMPLES: usize = 100_000;
        let mut pool = pool_with(b"uniformity");

        for max in [0u8, 1, 7, 255] {
            let mut counts = [0usize; 256];
            for _ in 0..SAMPLES {
                let v = pool.bounded_integer(max);
                assert!(v <= max);
                counts[v as usize] += 1;
            }

            let buckets = max as usize + 1;
            let expected = SAMPLES as f64 / buckets as f64;
            for &count in &counts[..buckets] {
                let deviation = (count as f64 - expected).abs() / expected;
                assert!(deviation < 0.25, "max={} count={} expected={}", max, count, expected);
            }
        }
    }

    #[test]
    fn test_rng_core_fills_across_digests() {
        let mut pool = pool_with(b"rng");
        let mut bytes = [0u8; 80];
        pool.fill_bytes(&mut bytes);
        assert!(bytes[..32] != bytes[32..64]);
        assert_ne!(pool.next_u64(), pool.next_u64());
    }
}

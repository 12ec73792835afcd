//! Session-scoped seed state
//!
//! The seed is hashed with SHA-256 and the digest seeds a ChaCha20 generator
//! owned by one construction call. Nothing is process-global, so concurrent
//! constructions never observe each other's draws.

use hyperchaos_dynamics::State;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Deterministic random state derived from a seed.
pub struct SeedState {
    digest: [u8; 32],
    rng: ChaCha20Rng,
}

impl SeedState {
    /// Hashes `seed` and seeds the generator with the digest.
    pub fn new(seed: &[u8]) -> Self {
        let Ok(digest) = <[u8; 32]>::try_from(Sha256::digest(seed).as_slice()) else {
            unreachable!("SHA-256 output is 32 bytes");
        };
        Self { digest, rng: ChaCha20Rng::from_seed(digest) }
    }

    /// SHA-256 of the seed.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Draws one offset per state component, each in `[-magnitude, magnitude]`.
    ///
    /// `magnitude` must be finite and non-negative.
    pub fn perturbation(&mut self, magnitude: f64) -> State {
        std::array::from_fn(|_| self.rng.gen_range(-magnitude..=magnitude))
    }
}

impl std::fmt::Debug for SeedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedState").field("digest", &hex::encode(&self.digest[..4])).finish()
    }
}

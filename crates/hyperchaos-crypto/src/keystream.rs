//! Hash-chaining keystream expansion
//!
//! The stream starts as the key itself. Each block appends
//! `SHA-256(key || tail || counter)`, where `tail` is the last (up to) 32
//! bytes produced so far and `counter` is the block index as a big-endian
//! `u64`. Blocks chain through `tail`, so the output never degenerates into a
//! tiling of the key.
//!
//! # Properties
//!
//! - Determinism: same `(key, n)` always gives the same bytes
//! - Prefix law: `expand(key, n)` is a prefix of `expand(key, m)` for `m >= n`

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Bytes of the stream fed back into each block.
const CHAIN_TAIL: usize = 32;

/// Incremental keystream generator.
///
/// Growing the stream never changes bytes already produced, so one expander
/// can serve several lengths.
pub struct KeystreamExpander<'k> {
    key: &'k [u8],
    stream: Vec<u8>,
    counter: u64,
}

impl<'k> KeystreamExpander<'k> {
    /// Starts a stream whose first bytes are `key`.
    pub fn new(key: &'k [u8]) -> Self {
        Self { key, stream: key.to_vec(), counter: 0 }
    }

    /// Number of hash blocks appended so far.
    pub fn blocks(&self) -> u64 {
        self.counter
    }

    /// Bytes generated so far (at least the key length).
    pub fn generated(&self) -> &[u8] {
        &self.stream
    }

    /// Appends blocks until at least `n` bytes exist.
    pub fn extend_to(&mut self, n: usize) {
        while self.stream.len() < n {
            let tail_start = self.stream.len().saturating_sub(CHAIN_TAIL);
            let block = Sha256::new()
                .chain_update(self.key)
                .chain_update(&self.stream[tail_start..])
                .chain_update(self.counter.to_be_bytes())
                .finalize();
            self.stream.extend_from_slice(&block);
            self.counter = self.counter.wrapping_add(1);
        }
    }

    /// First `n` bytes of the stream.
    pub fn take(&mut self, n: usize) -> Vec<u8> {
        self.extend_to(n);
        self.stream[..n].to_vec()
    }
}

impl Drop for KeystreamExpander<'_> {
    fn drop(&mut self) {
        self.stream.zeroize();
    }
}

/// Expands `key` to exactly `n` bytes.
pub fn expand(key: &[u8], n: usize) -> Vec<u8> {
    KeystreamExpander::new(key).take(n)
}

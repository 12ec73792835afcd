//! Trajectory to bitstream extraction
//!
//! Each state dimension is min-max normalised to `[0, 1]` and quantised to
//! [`QUANTIZATION_LEVELS`] levels; the parity of the level is the bit for that
//! sample and dimension. The four per-dimension sequences are XORed into one
//! stream of the same length as the trajectory.
//!
//! Parity follows the fine structure of the orbit, so even a slowly turning
//! attractor yields bits that change from one sample to the next. No balance
//! or entropy threshold is enforced here; callers get [`BitstreamStats`] to
//! judge that themselves.

use hyperchaos_dynamics::{DIM, Trajectory};

/// Guards the normalisation denominator against a constant dimension.
const NORMALIZE_EPSILON: f64 = 1e-12;

/// Number of levels a normalised value is quantised to before taking parity.
pub const QUANTIZATION_LEVELS: f64 = 65_536.0;

/// Binary stream extracted from a trajectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {
    bits: Vec<bool>,
}

/// Balance statistics of a bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitstreamStats {
    /// Total bits
    pub len: usize,
    /// Number of set bits
    pub ones: usize,
}

impl BitstreamStats {
    /// Number of clear bits.
    pub fn zeros(&self) -> usize {
        self.len - self.ones
    }

    /// Fraction of set bits, 0 for an empty stream.
    pub fn ones_ratio(&self) -> f64 {
        if self.len == 0 { 0.0 } else { self.ones as f64 / self.len as f64 }
    }
}

impl Bitstream {
    /// Extracts one bit per trajectory sample.
    pub fn extract(trajectory: &Trajectory) -> Self {
        let mut bits = vec![false; trajectory.len()];

        for dim in 0..DIM {
            let column: Vec<f64> = trajectory.component(dim).collect();
            let (lo, hi) = column
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
            let span = hi - lo + NORMALIZE_EPSILON;

            for (bit, value) in bits.iter_mut().zip(&column) {
                *bit ^= level_parity((value - lo) / span);
            }
        }

        let stream = Self { bits };
        let stats = stream.stats();
        tracing::debug!(
            len = stats.len,
            ones = stats.ones,
            ratio = stats.ones_ratio(),
            "bitstream extracted"
        );
        stream
    }

    /// Wraps raw bits.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Unpacks bytes MSB-first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bits =
            bytes.iter().flat_map(|b| (0..8).rev().map(move |i| (b >> i) & 1 == 1)).collect();
        Self { bits }
    }

    /// The bits in order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if the stream holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Balance statistics.
    pub fn stats(&self) -> BitstreamStats {
        BitstreamStats { len: self.bits.len(), ones: self.bits.iter().filter(|b| **b).count() }
    }

    /// Packs whole bytes MSB-first. Trailing bits that do not fill a byte
    /// are dropped.
    pub fn pack_bytes(&self) -> Vec<u8> {
        self.bits.chunks_exact(8).map(pack_byte).collect()
    }

    /// Reads 8 bits starting at `start` as an MSB-first byte.
    ///
    /// Caller guarantees `start + 8 <= len`.
    pub(crate) fn byte_at(&self, start: usize) -> u8 {
        pack_byte(&self.bits[start..start + 8])
    }
}

fn pack_byte(bits: &[bool]) -> u8 {
    bits.iter().fold(0u8, |acc, bit| (acc << 1) | u8::from(*bit))
}

/// Parity of the quantisation level of a value in `[0, 1]`.
fn level_parity(normalized: f64) -> bool {
    ((normalized * QUANTIZATION_LEVELS).floor() as u64) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(points: Vec<[f64; DIM]>) -> Trajectory {
        Trajectory::new(points, 1.0, 0.0)
    }

    #[test]
    fn extract_preserves_length() {
        let points = (0..37).map(|i| [i as f64, (i * 7 % 5) as f64, -(i as f64), 0.5]).collect();
        let stream = Bitstream::extract(&trajectory(points));
        assert_eq!(stream.len(), 37);
    }

    #[test]
    fn single_varying_dimension_gives_level_parity() {
        // x spans exactly one unit per level; y, z, w are constant and
        // contribute no set bits.
        let points = [0.0, 1.0, 2.0, 3.0, 7.0, QUANTIZATION_LEVELS]
            .into_iter()
            .map(|x| [x, 1.0, 1.0, 1.0])
            .collect();
        let stream = Bitstream::extract(&trajectory(points));
        assert_eq!(stream.bits(), &[false, true, false, true, true, false]);
    }

    #[test]
    fn neighbouring_levels_flip_the_bit() {
        let step = 1.0 / QUANTIZATION_LEVELS;
        assert!(!level_parity(0.0));
        assert!(level_parity(step * 1.5));
        assert!(!level_parity(step * 2.5));
        assert!(level_parity(step * 3.5));
    }

    #[test]
    fn dimensions_are_xored() {
        // x and y identical, so their decisions cancel.
        let points = vec![
            [0.0, 0.0, 5.0, 5.0],
            [1.0, 1.0, 5.0, 5.0],
            [2.0, 2.0, 5.0, 5.0],
        ];
        let stream = Bitstream::extract(&trajectory(points));
        assert_eq!(stream.stats().ones, 0);
    }

    #[test]
    fn constant_trajectory_is_all_zero() {
        let stream = Bitstream::extract(&trajectory(vec![[2.0; DIM]; 16]));
        assert_eq!(stream.stats(), BitstreamStats { len: 16, ones: 0 });
    }

    #[test]
    fn empty_trajectory_gives_empty_stream() {
        let stream = Bitstream::extract(&trajectory(Vec::new()));
        assert!(stream.is_empty());
        assert_eq!(stream.stats().ones_ratio(), 0.0);
    }

    #[test]
    fn pack_is_msb_first_and_truncates() {
        let stream = Bitstream::from_bits(vec![
            true, false, false, false, false, false, false, true, // 0x81
            true, true, // dropped
        ]);
        assert_eq!(stream.pack_bytes(), vec![0x81]);
    }

    #[test]
    fn from_bytes_round_trips_pack() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        assert_eq!(Bitstream::from_bytes(&bytes).pack_bytes(), bytes);
    }

    #[test]
    fn stats_count_zeros() {
        let stats = Bitstream::from_bits(vec![true, false, false, true, true]).stats();
        assert_eq!(stats.zeros(), 2);
        assert!((stats.ones_ratio() - 0.6).abs() < 1e-12);
    }
}

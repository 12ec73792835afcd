//! Errors for material derivation and the round cipher.

use thiserror::Error;

/// Errors from key/S-box derivation and the cipher engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Not enough bits to fill a single byte
    #[error("bitstream too short: {bits} bits, need at least {required}")]
    BitstreamTooShort {
        /// Bits available
        bits: usize,
        /// Minimum required
        required: usize,
    },

    /// Substitution table is not a permutation of 0..=255
    #[error("substitution table is not a permutation: value {value:#04x} appears {count} times")]
    NotAPermutation {
        /// First offending value
        value: u8,
        /// How often it occurs (0 or more than 1)
        count: usize,
    },

    /// Rounds were requested but no round material exists
    #[error("{rounds} rounds requested with no round keys")]
    NoRoundKeys {
        /// Requested rounds
        rounds: u32,
    },
}

impl CryptoError {
    /// Returns true if the error stems from bad derivation input rather than
    /// from how the cipher was invoked.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::BitstreamTooShort { .. } | Self::NotAPermutation { .. })
    }
}

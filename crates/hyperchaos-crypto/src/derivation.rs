//! Key material derivation
//!
//! The bitstream is truncated to whole bytes, packed MSB-first and hashed
//! with SHA-256. Hashing removes residual bias in the trajectory bits and
//! fixes the key length independently of the trajectory length.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::{bitstream::Bitstream, error::CryptoError};

/// Size of derived key material in bytes.
pub const KEY_SIZE: usize = 32;

/// Fewest bits a bitstream must hold before anything is derived from it.
pub const MIN_BITSTREAM_BITS: usize = 8;

/// 32 bytes of key material for one system.
///
/// Zeroized on drop. `Debug` prints only a short fingerprint.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    bytes: [u8; KEY_SIZE],
}

impl KeyMaterial {
    /// Wraps raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// First 4 bytes of `SHA-256(key)`, for logs and diagnostics.
    pub fn fingerprint(&self) -> [u8; 4] {
        let digest = Sha256::digest(self.bytes);
        let Ok(fingerprint) = <[u8; 4]>::try_from(&digest[..4]) else {
            unreachable!("SHA-256 digest is longer than 4 bytes");
        };
        fingerprint
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fp = self.fingerprint();
        write!(f, "KeyMaterial({:02x}{:02x}{:02x}{:02x}..)", fp[0], fp[1], fp[2], fp[3])
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Derives key material from a bitstream.
///
/// Fails if fewer than [`MIN_BITSTREAM_BITS`] bits are available.
pub fn derive_key(bitstream: &Bitstream) -> Result<KeyMaterial, CryptoError> {
    ensure_min_bits(bitstream)?;

    let mut packed = bitstream.pack_bytes();
    let digest = Sha256::digest(&packed);
    packed.zeroize();

    let Ok(bytes) = <[u8; KEY_SIZE]>::try_from(digest.as_slice()) else {
        unreachable!("SHA-256 output is 32 bytes");
    };
    Ok(KeyMaterial { bytes })
}

pub(crate) fn ensure_min_bits(bitstream: &Bitstream) -> Result<(), CryptoError> {
    if bitstream.len() < MIN_BITSTREAM_BITS {
        return Err(CryptoError::BitstreamTooShort {
            bits: bitstream.len(),
            required: MIN_BITSTREAM_BITS,
        });
    }
    Ok(())
}

//! Round cipher over byte buffers
//!
//! Stateless: both directions are pure functions of the round material, the
//! input buffer and the round count. Round `r` uses `round_keys[r % K]`.
//!
//! The XOR step needs a keystream as long as the buffer. Each system's
//! keystream is expanded at most once per call and reused by every round that
//! selects that system. The cache lives only for the call.

use crate::{
    bitstream::Bitstream,
    derivation::{KeyMaterial, derive_key},
    error::CryptoError,
    keystream::expand,
    sbox::{InverseSBox, SBox},
};

/// Key material and substitution tables of one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundKey {
    key: KeyMaterial,
    sbox: SBox,
    inverse: InverseSBox,
}

impl RoundKey {
    /// Pairs key material with an S-box; the inverse is computed here.
    pub fn new(key: KeyMaterial, sbox: SBox) -> Self {
        let inverse = sbox.inverse();
        Self { key, sbox, inverse }
    }

    /// Derives key and S-box from the same bitstream.
    pub fn derive(bitstream: &Bitstream) -> Result<Self, CryptoError> {
        let key = derive_key(bitstream)?;
        let sbox = SBox::derive(bitstream)?;
        Ok(Self::new(key, sbox))
    }

    /// Key material.
    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Forward substitution table.
    pub fn sbox(&self) -> &SBox {
        &self.sbox
    }

    /// Inverse substitution table.
    pub fn inverse_sbox(&self) -> &InverseSBox {
        &self.inverse
    }
}

/// Per-call keystream cache, one slot per system.
struct Keystreams<'a> {
    round_keys: &'a [RoundKey],
    len: usize,
    slots: Vec<Option<Vec<u8>>>,
}

impl<'a> Keystreams<'a> {
    fn new(round_keys: &'a [RoundKey], len: usize) -> Self {
        Self { round_keys, len, slots: vec![None; round_keys.len()] }
    }

    fn get(&mut self, system: usize) -> &[u8] {
        let round_keys = self.round_keys;
        let key = &round_keys[system].key;
        let len = self.len;
        self.slots[system].get_or_insert_with(|| expand(key.as_bytes(), len))
    }
}

/// Encrypts `buffer` with `rounds` rounds of XOR then substitution.
///
/// Output has the input's length. Zero rounds is the identity.
pub fn encrypt(
    round_keys: &[RoundKey],
    buffer: &[u8],
    rounds: u32,
) -> Result<Vec<u8>, CryptoError> {
    check_round_keys(round_keys, rounds)?;

    let mut out = buffer.to_vec();
    let mut keystreams = Keystreams::new(round_keys, out.len());
    for round in 0..rounds as usize {
        let system = round % round_keys.len();
        xor_in_place(&mut out, keystreams.get(system));
        round_keys[system].sbox.apply(&mut out);
    }

    tracing::trace!(len = out.len(), rounds, "encrypted buffer");
    Ok(out)
}

/// Inverts [`encrypt`] for the same round material and round count.
pub fn decrypt(
    round_keys: &[RoundKey],
    buffer: &[u8],
    rounds: u32,
) -> Result<Vec<u8>, CryptoError> {
    check_round_keys(round_keys, rounds)?;

    let mut out = buffer.to_vec();
    let mut keystreams = Keystreams::new(round_keys, out.len());
    for round in (0..rounds as usize).rev() {
        let system = round % round_keys.len();
        round_keys[system].inverse.apply(&mut out);
        xor_in_place(&mut out, keystreams.get(system));
    }

    tracing::trace!(len = out.len(), rounds, "decrypted buffer");
    Ok(out)
}

fn check_round_keys(round_keys: &[RoundKey], rounds: u32) -> Result<(), CryptoError> {
    if rounds > 0 && round_keys.is_empty() {
        return Err(CryptoError::NoRoundKeys { rounds });
    }
    Ok(())
}

fn xor_in_place(buffer: &mut [u8], keystream: &[u8]) {
    for (b, k) in buffer.iter_mut().zip(keystream) {
        *b ^= k;
    }
}

//! Bitstream-driven substitution boxes
//!
//! Starting from the identity permutation, positions `i = 255..=1` are each
//! swapped with `j = v mod (i + 1)`, where `v` is the next 8 bits of the
//! bitstream read MSB-first. When fewer than 8 unread bits remain the cursor
//! wraps to the start of the stream. The bitstream is the only source of
//! randomness.
//!
//! Swapping entries of a permutation yields a permutation, so every derived
//! table is a bijection. [`SBox::is_bijective`] checks it anyway and
//! [`SBox::from_table`] refuses anything else.

use crate::{bitstream::Bitstream, derivation::ensure_min_bits, error::CryptoError};

const SIZE: usize = 256;

/// Byte substitution table, always a permutation of 0..=255.
#[derive(Clone, PartialEq, Eq)]
pub struct SBox {
    table: [u8; SIZE],
}

/// Inverse of an [`SBox`]: `inverse[sbox[v]] == v`.
#[derive(Clone, PartialEq, Eq)]
pub struct InverseSBox {
    table: [u8; SIZE],
}

/// Reads consecutive bytes from a bitstream, wrapping at the end.
struct BitCursor<'a> {
    stream: &'a Bitstream,
    position: usize,
}

impl<'a> BitCursor<'a> {
    fn new(stream: &'a Bitstream) -> Self {
        Self { stream, position: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        if self.position + 8 > self.stream.len() {
            self.position = 0;
        }
        let byte = self.stream.byte_at(self.position);
        self.position += 8;
        byte
    }
}

impl SBox {
    /// The identity permutation.
    pub fn identity() -> Self {
        Self { table: identity_table() }
    }

    /// Derives a permutation from `bitstream`.
    ///
    /// Fails if the stream holds fewer than 8 bits.
    pub fn derive(bitstream: &Bitstream) -> Result<Self, CryptoError> {
        ensure_min_bits(bitstream)?;

        let mut table = identity_table();
        let mut cursor = BitCursor::new(bitstream);
        for i in (1..SIZE).rev() {
            let j = usize::from(cursor.next_byte()) % (i + 1);
            table.swap(i, j);
        }

        Ok(Self { table })
    }

    /// Validates an explicit table.
    pub fn from_table(table: [u8; SIZE]) -> Result<Self, CryptoError> {
        let mut counts = [0usize; SIZE];
        for v in table {
            counts[usize::from(v)] += 1;
        }
        if let Some((value, count)) = counts.iter().enumerate().find(|(_, c)| **c != 1) {
            return Err(CryptoError::NotAPermutation { value: value as u8, count: *count });
        }
        Ok(Self { table })
    }

    /// Substitutes one byte.
    pub fn substitute(&self, byte: u8) -> u8 {
        self.table[usize::from(byte)]
    }

    /// Substitutes every byte in place.
    pub fn apply(&self, buffer: &mut [u8]) {
        for b in buffer {
            *b = self.substitute(*b);
        }
    }

    /// The raw table.
    pub fn table(&self) -> &[u8; SIZE] {
        &self.table
    }

    /// Sorting the entries gives exactly 0..=255.
    pub fn is_bijective(&self) -> bool {
        let mut sorted = self.table;
        sorted.sort_unstable();
        sorted == identity_table()
    }

    /// Number of positions `v` with `sbox[v] == v`.
    pub fn fixed_points(&self) -> usize {
        self.table.iter().enumerate().filter(|(i, v)| *i == usize::from(**v)).count()
    }

    /// Position-of-value inverse.
    pub fn inverse(&self) -> InverseSBox {
        let mut table = [0u8; SIZE];
        for (position, value) in self.table.iter().enumerate() {
            table[usize::from(*value)] = position as u8;
        }
        InverseSBox { table }
    }
}

impl InverseSBox {
    /// Inverts one byte.
    pub fn substitute(&self, byte: u8) -> u8 {
        self.table[usize::from(byte)]
    }

    /// Inverts every byte in place.
    pub fn apply(&self, buffer: &mut [u8]) {
        for b in buffer {
            *b = self.substitute(*b);
        }
    }

    /// The raw table.
    pub fn table(&self) -> &[u8; SIZE] {
        &self.table
    }
}

impl std::fmt::Debug for SBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SBox").field("head", &&self.table[..8]).finish_non_exhaustive()
    }
}

impl std::fmt::Debug for InverseSBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InverseSBox").field("head", &&self.table[..8]).finish_non_exhaustive()
    }
}

fn identity_table() -> [u8; SIZE] {
    std::array::from_fn(|i| i as u8)
}

//! Hyperchaos Cryptographic Primitives
//!
//! Turns sampled hyperchaotic trajectories into cipher material and runs the
//! round cipher. Every function is pure: outputs depend only on inputs.
//!
//! # Material Derivation
//!
//! ```text
//! Trajectory
//!        │
//!        ▼ per-dimension level parity, XOR across dimensions
//! Bitstream
//!        │
//!        ├──► pack MSB-first → SHA-256 → KeyMaterial
//!        │
//!        └──► bit-driven Fisher-Yates over 0..=255 → SBox
//! ```
//!
//! # Round Cipher
//!
//! Round `r` uses the material of system `r mod K`:
//!
//! ```text
//! encrypt:  buf ^= expand(key[r], len);  buf = SBox[r](buf)         r = 0..R
//! decrypt:  buf = InverseSBox[r](buf);   buf ^= expand(key[r], len) r = R-1..0
//! ```
//!
//! # Security
//!
//! This is a research construction for studying chaos-based encryption, not
//! a vetted cipher. It is neither constant-time nor authenticated. The S-box
//! is deliberately derived from raw trajectory bits rather than a CSPRNG,
//! because that derivation is the object under study.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bitstream;
pub mod cipher;
pub mod derivation;
pub mod error;
pub mod keystream;
pub mod sbox;

pub use bitstream::{Bitstream, BitstreamStats, QUANTIZATION_LEVELS};
pub use cipher::{RoundKey, decrypt, encrypt};
pub use derivation::{KEY_SIZE, KeyMaterial, MIN_BITSTREAM_BITS, derive_key};
pub use error::CryptoError;
pub use keystream::{KeystreamExpander, expand};
pub use sbox::{InverseSBox, SBox};

//! Hyperchaos Cipher Sessions
//!
//! A [`CipherSession`] is built once from a seed and a set of system
//! configurations, then used for any number of encrypt/decrypt calls.
//! Construction is the expensive part: every system is integrated, turned
//! into a bitstream and reduced to one [`RoundKey`]. The systems are
//! independent, so they are processed in parallel.
//!
//! ```text
//! seed ─► SeedState ─► (optional) initial-condition offsets
//!                                   │
//!           ┌───────────────────────┼───────────────────────┐
//!           ▼                       ▼                       ▼
//!   integrate(system 0)     integrate(system 1)     integrate(system 2)
//!           │                       │                       │
//!   bitstream → RoundKey    bitstream → RoundKey    bitstream → RoundKey
//!           └───────────────────────┼───────────────────────┘
//!                                   ▼
//!                            CipherSession
//! ```
//!
//! A session is immutable after construction, so it can be shared across
//! threads without locking. Construction either succeeds for every system or
//! fails as a whole.
//!
//! [`RoundKey`]: hyperchaos_crypto::RoundKey

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod info;
pub mod seed;
pub mod session;
pub mod shape;

pub use config::{
    DEFAULT_PERTURBATION, DEFAULT_WARMUP, InitialConditions, SeedMode, SessionConfig,
};
pub use error::SessionError;
pub use info::{NamedParameter, SystemInfo};
pub use seed::SeedState;
pub use session::{BITSTREAM_PREVIEW_BITS, CipherSession};
pub use shape::{BufferShape, ShapeParseError};

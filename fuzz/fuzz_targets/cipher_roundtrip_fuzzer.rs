//! Fuzz target for the round cipher
//!
//! Builds round keys from arbitrary bit material and runs arbitrary buffers
//! through encrypt and decrypt.
//!
//! # Invariants
//!
//! - decrypt(encrypt(x, R), R) == x
//! - Output length equals input length
//! - Zero rounds is the identity
//! - Short bit material is rejected, never panics

#![no_main]

use arbitrary::Arbitrary;
use hyperchaos_crypto::{Bitstream, RoundKey, decrypt, encrypt};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct CipherScenario {
    /// Raw material for each system's bitstream (1 to 4 systems)
    materials: Vec<Vec<u8>>,
    /// Buffer to encrypt
    buffer: Vec<u8>,
    /// Round count, kept small
    rounds: u8,
}

fuzz_target!(|scenario: CipherScenario| {
    let mut round_keys = Vec::new();
    for material in scenario.materials.iter().take(4) {
        match RoundKey::derive(&Bitstream::from_bytes(material)) {
            Ok(round_key) => round_keys.push(round_key),
            Err(err) => {
                assert!(err.is_configuration());
                return;
            },
        }
    }

    let rounds = u32::from(scenario.rounds % 16);
    let Ok(ciphertext) = encrypt(&round_keys, &scenario.buffer, rounds) else {
        assert!(round_keys.is_empty() && rounds > 0);
        return;
    };
    assert_eq!(ciphertext.len(), scenario.buffer.len());
    if rounds == 0 {
        assert_eq!(ciphertext, scenario.buffer);
    }

    let Ok(plaintext) = decrypt(&round_keys, &ciphertext, rounds) else {
        panic!("decrypt failed where encrypt succeeded");
    };
    assert_eq!(plaintext, scenario.buffer);
});

//! Fuzz target for S-box derivation
//!
//! Any bit material long enough to derive from must yield a permutation of
//! 0..=255 whose inverse undoes it.

#![no_main]

use hyperchaos_crypto::{Bitstream, SBox};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let bitstream = Bitstream::from_bytes(data);
    let Ok(sbox) = SBox::derive(&bitstream) else {
        return;
    };

    assert!(sbox.is_bijective());
    let inverse = sbox.inverse();
    for byte in 0..=255u8 {
        assert_eq!(inverse.substitute(sbox.substitute(byte)), byte);
    }

    // Derivation is deterministic
    let Ok(again) = SBox::derive(&bitstream) else {
        panic!("second derivation failed");
    };
    assert_eq!(again.table(), sbox.table());
});

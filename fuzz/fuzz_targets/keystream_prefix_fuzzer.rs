//! Fuzz target for keystream expansion
//!
//! # Invariants
//!
//! - expand(k, n) has exactly n bytes
//! - expand(k, n) is a prefix of expand(k, m) for n <= m
//! - Incremental extension matches one-shot expansion

#![no_main]

use arbitrary::Arbitrary;
use hyperchaos_crypto::{KeystreamExpander, expand};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct KeystreamScenario {
    key: Vec<u8>,
    /// Successive lengths requested from one expander
    lengths: Vec<u16>,
}

fuzz_target!(|scenario: KeystreamScenario| {
    let mut expander = KeystreamExpander::new(&scenario.key);
    for &len in scenario.lengths.iter().take(8) {
        let n = usize::from(len);
        let one_shot = expand(&scenario.key, n);
        assert_eq!(one_shot.len(), n);
        assert_eq!(expander.take(n), one_shot);
        assert_eq!(&expander.generated()[..n], &one_shot[..]);
    }
});

//! Property-based tests for material derivation and the round cipher
//!
//! 1. **Round-trip**: decrypt(encrypt(x, R), R) == x for all buffers and R
//! 2. **Bijectivity**: every derived S-box is a permutation of 0..=255
//! 3. **Prefix law**: expand(key, n) is a prefix of expand(key, m), m >= n
//! 4. **Non-repetition**: expansion never equals tiling the key
//! 5. **Short input**: fewer than 8 bits is rejected

use hyperchaos_crypto::{
    Bitstream, CryptoError, KEY_SIZE, RoundKey, SBox, decrypt, derive_key, encrypt, expand,
};
use proptest::prelude::*;

fn round_keys(seeds: &[Vec<u8>]) -> Vec<RoundKey> {
    seeds.iter().map(|seed| RoundKey::derive(&Bitstream::from_bytes(seed)).unwrap()).collect()
}

fn seeds() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_encrypt_decrypt_roundtrip(
        seeds in seeds(),
        buffer in prop::collection::vec(any::<u8>(), 0..512),
        rounds in 0u32..=10,
    ) {
        let keys = round_keys(&seeds);
        let ciphertext = encrypt(&keys, &buffer, rounds).unwrap();
        prop_assert_eq!(ciphertext.len(), buffer.len());
        prop_assert_eq!(decrypt(&keys, &ciphertext, rounds).unwrap(), buffer);
    }

    #[test]
    fn prop_zero_rounds_identity(
        seeds in seeds(),
        buffer in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let keys = round_keys(&seeds);
        prop_assert_eq!(encrypt(&keys, &buffer, 0).unwrap(), buffer);
    }

    #[test]
    fn prop_encrypt_deterministic(
        seeds in seeds(),
        buffer in prop::collection::vec(any::<u8>(), 0..256),
        rounds in 0u32..=10,
    ) {
        let keys = round_keys(&seeds);
        prop_assert_eq!(
            encrypt(&keys, &buffer, rounds).unwrap(),
            encrypt(&keys, &buffer, rounds).unwrap()
        );
    }

    #[test]
    fn prop_sbox_bijective(bits in prop::collection::vec(any::<bool>(), 8..2048)) {
        let sbox = SBox::derive(&Bitstream::from_bits(bits)).unwrap();
        prop_assert!(sbox.is_bijective());

        let mut entries = sbox.table().to_vec();
        entries.sort_unstable();
        prop_assert_eq!(entries, (0..=255u8).collect::<Vec<_>>());
    }

    #[test]
    fn prop_keystream_prefix(
        key in prop::array::uniform32(any::<u8>()),
        n in 0usize..600,
        extra in 0usize..600,
    ) {
        let short = expand(&key, n);
        let long = expand(&key, n + extra);
        prop_assert_eq!(short.len(), n);
        prop_assert_eq!(&long[..n], &short[..]);
    }

    #[test]
    fn prop_keystream_not_tiled(
        key in prop::array::uniform32(any::<u8>()),
        n in (KEY_SIZE + 1)..600,
    ) {
        let tiled: Vec<u8> = key.iter().copied().cycle().take(n).collect();
        prop_assert_ne!(expand(&key, n), tiled);
    }

    #[test]
    fn prop_short_bitstream_rejected(bits in prop::collection::vec(any::<bool>(), 0..8)) {
        let stream = Bitstream::from_bits(bits);
        let is_short = |err: &CryptoError| matches!(err, CryptoError::BitstreamTooShort { .. });
        prop_assert!(derive_key(&stream).as_ref().is_err_and(is_short));
        prop_assert!(SBox::derive(&stream).as_ref().is_err_and(is_short));
    }
}

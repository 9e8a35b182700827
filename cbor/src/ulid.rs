// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

//! ULID generation: 48-bit Unix-millis prefix + 80-bit randomness, Crockford
//! Base32 encoded to 26 ASCII characters (spec §4.1 "ULID generation").

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

const CROCKFORD: [u8; 32] = *b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Generate a ULID using the current wall-clock time and an OS-seeded RNG.
pub fn generate() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the Unix epoch")
        .as_millis() as u64
        & 0xFFFF_FFFF_FFFF;
    let mut randomness = [0u8; 10];
    rand::thread_rng().fill_bytes(&mut randomness);
    encode(millis, randomness)
}

/// Encode an explicit (millis, randomness) pair — the deterministic half of
/// [`generate`], split out so callers (and tests) can avoid the clock/RNG.
pub fn encode(millis_48: u64, randomness_80: [u8; 10]) -> String {
    let mut value: u128 = (millis_48 as u128) << 80;
    for byte in randomness_80 {
        value = (value << 8) | byte as u128;
    }
    let mut buf = [0u8; 26];
    let mut v = value;
    for slot in buf.iter_mut().rev() {
        *slot = CROCKFORD[(v & 0x1F) as usize];
        v >>= 5;
    }
    String::from_utf8(buf.to_vec()).expect("Crockford alphabet is pure ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ulid_has_spec_length_and_alphabet() {
        let ulid = generate();
        assert_eq!(ulid.len(), 26);
        assert!(ulid
            .bytes()
            .all(|b| CROCKFORD.contains(&b)));
    }

    #[test]
    fn later_millis_sort_lexicographically_after_earlier_millis() {
        let earlier = encode(1_000, [0; 10]);
        let later = encode(2_000, [0; 10]);
        assert!(earlier < later);
    }

    #[test]
    fn encode_is_deterministic() {
        let a = encode(123_456_789, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let b = encode(123_456_789, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(a, b);
    }
}
